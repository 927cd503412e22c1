use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Sign-up returns a session when email confirmation is disabled, the bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(User),
}

impl SignUpResponse {
    pub fn user(&self) -> &User {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::User(user) => user,
        }
    }
}

/// Error body shapes returned by the row API and the auth API
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or_else(|| match self.error {
                Some(serde_json::Value::String(error)) => Some(error),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_up_response_shapes() {
        let with_session: SignUpResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "u1", "email": "a@example.com" }
        }))
        .unwrap();
        assert!(matches!(with_session, SignUpResponse::Session(_)));
        assert_eq!(with_session.user().display_name(), "a@example.com");

        let user_only: SignUpResponse =
            serde_json::from_value(json!({ "id": "u2", "email": null })).unwrap();
        assert!(matches!(user_only, SignUpResponse::User(_)));
        assert_eq!(user_only.user().display_name(), "u2");
    }

    #[test]
    fn test_error_body_message_precedence() {
        let rest: ErrorBody = serde_json::from_value(json!({
            "code": "42P01",
            "message": "relation \"public.User\" does not exist",
            "details": null,
            "hint": null
        }))
        .unwrap();
        assert_eq!(
            rest.into_message().as_deref(),
            Some("relation \"public.User\" does not exist")
        );

        let auth: ErrorBody = serde_json::from_value(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        }))
        .unwrap();
        assert_eq!(auth.into_message().as_deref(), Some("Invalid login credentials"));

        let bare: ErrorBody = serde_json::from_value(json!({ "error": "invalid_request" })).unwrap();
        assert_eq!(bare.into_message().as_deref(), Some("invalid_request"));

        assert_eq!(ErrorBody::default().into_message(), None);
    }
}

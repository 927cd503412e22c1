pub mod middleware;
pub mod session;

pub use middleware::{auth_middleware, optional_user};
pub use session::{clear_session_cookies, set_session_cookies};

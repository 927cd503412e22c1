pub mod class_names;

pub use class_names::{ClassFragment, cn};

/// Upper-case the first character and lower-case the rest.
///
/// Empty input is returned unchanged.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_lowercases_rest() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize("WORLD"), "World");
        assert_eq!(capitalize("hELLo WoRLd"), "Hello world");
    }

    #[test]
    fn test_capitalize_empty() {
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_capitalize_non_ascii() {
        assert_eq!(capitalize("émile"), "Émile");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(" leading space"), " leading space");
    }
}

use std::fmt;

pub const DEFAULT_DOMAIN: &str = "www.amazon.com";

/// A validated Amazon Standard Identification Number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asin(String);

impl Asin {
    pub fn parse(s: &str) -> Result<Self, AsinError> {
        if is_valid_asin(s) { Ok(Asin(s.to_string())) } else { Err(AsinError::Invalid(s.to_string())) }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// `https://{domain}/dp/{asin}`
    pub fn product_url(&self, domain: &str) -> String {
        format!("https://{}/dp/{}", domain.trim_end_matches('/'), self.as_str())
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// exactly ten characters from [A-Z0-9]
pub fn is_valid_asin(s: &str) -> bool {
    s.len() == 10 && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsinError {
    Invalid(String),
}

impl fmt::Display for AsinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsinError::Invalid(s) => write!(f, "invalid ASIN {s:?}: expected 10 characters of A-Z or 0-9"),
        }
    }
}

impl std::error::Error for AsinError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ten_upper_alnum() {
        assert!(is_valid_asin("B08N5WRWNW"));
        assert!(is_valid_asin("0123456789"));
    }

    #[test]
    fn rejects_lowercase_length_and_punctuation() {
        assert!(!is_valid_asin("b08n5wrwnw"));
        assert!(!is_valid_asin("B08N5WRWNW1"));
        assert!(!is_valid_asin("B08N5WRWN"));
        assert!(!is_valid_asin("B08N5-RWNW"));
        assert!(!is_valid_asin(""));
        // multi-byte chars must not sneak past the length check
        assert!(!is_valid_asin("B08N5WRWNÉ"));
    }

    #[test]
    fn builds_canonical_product_url() {
        let asin = Asin::parse("B08N5WRWNW").unwrap();
        assert_eq!(asin.product_url("www.amazon.de"), "https://www.amazon.de/dp/B08N5WRWNW");
        assert_eq!(asin.product_url("www.amazon.com/"), "https://www.amazon.com/dp/B08N5WRWNW");
    }

    #[test]
    fn invalid_asin_is_a_distinct_error() {
        let err = Asin::parse("b08n5wrwnw").unwrap_err();
        assert_eq!(err, AsinError::Invalid("b08n5wrwnw".into()));
        assert!(format!("{err}").contains("invalid ASIN"));
    }
}

use crate::error::InlineFieldParseError;

/// Parse a `key=value` form field. Only the first `=` splits, so values
/// may contain more of them (URLs with queries, messages).
pub fn parse_field(s: &str) -> Result<(String, String), InlineFieldParseError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(InlineFieldParseError::InvalidKeyValPair(s.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        assert_eq!(
            parse_field("website_url=https://a.io/?x=1").unwrap(),
            ("website_url".to_owned(), "https://a.io/?x=1".to_owned())
        );
    }

    #[test]
    fn rejects_missing_key() {
        assert!(parse_field("=value").is_err());
        assert!(parse_field("no-separator").is_err());
    }
}

//! Environment lookup shared by the configuration constructors.
//!
//! Every constructor takes a [`Lookup`] instead of reading the process
//! environment directly, so configuration can be built from a map in tests.
//! Blank values count as unset.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Variable source: returns the raw value for a name, if any.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the process environment.
pub fn process(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Look up `name`, treating empty and whitespace-only values as unset.
pub fn var(lookup: Lookup<'_>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Parse `name` when set, else return `default`.
///
/// A value that does not parse is a `Validation` error naming the variable;
/// it never silently falls back to the default.
pub fn parse_or<T: FromStr>(lookup: Lookup<'_>, name: &str, default: T) -> Result<T> {
    match var(lookup, name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Validation(format!("{} must be a number, got {:?}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> Option<String> {
        match name {
            "COUNT" => Some(" 12 ".to_string()),
            "BLANK" => Some("   ".to_string()),
            "WORDS" => Some("lots".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_blank_is_unset() {
        assert_eq!(var(&source, "BLANK"), None);
        assert_eq!(var(&source, "MISSING"), None);
        assert_eq!(var(&source, "WORDS").as_deref(), Some("lots"));
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(&source, "COUNT", 3u32).unwrap(), 12);
        assert_eq!(parse_or(&source, "MISSING", 3u32).unwrap(), 3);
        assert_eq!(parse_or(&source, "BLANK", 3u32).unwrap(), 3);
    }

    #[test]
    fn test_unparseable_is_validation_error() {
        let err = parse_or(&source, "WORDS", 3u32).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("WORDS")));
    }
}

//! Slash-delimited pointers into a document tree.
//!
//! `/addresses/0/city` walks field `addresses`, list element 0, field `city`.
//! `~1` stands for `/` and `~0` for `~` inside a segment. A final `-` segment
//! addresses the position just past the end of a list.

use std::fmt;

use crate::error::PointerError;

/// Segment that targets the end of a list.
pub const APPEND: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    raw: String,
    tokens: Vec<String>,
}

impl Pointer {
    /// Parse a pointer. The empty string is the document root.
    pub fn parse(raw: &str) -> Result<Self, PointerError> {
        if raw.is_empty() {
            return Ok(Self::root());
        }
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| PointerError::MissingLeadingSlash(raw.to_string()))?;
        let tokens = rest
            .split('/')
            .map(unescape)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    pub fn root() -> Self {
        Self {
            raw: String::new(),
            tokens: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Decoded segments.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parent segments and the final segment, or None for the root.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.tokens
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }

    /// True if `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &Pointer) -> bool {
        self.tokens.len() > ancestor.tokens.len() && self.tokens.starts_with(&ancestor.tokens)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn unescape(token: &str) -> Result<String, PointerError> {
    if !token.contains('~') {
        return Ok(token.to_string());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::InvalidEscape(token.to_string())),
        }
    }
    Ok(out)
}

/// Parse a list index segment: `0` or a decimal without leading zeros.
pub(crate) fn parse_index(token: &str) -> Option<usize> {
    let digits_only = !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_segments() {
        let ptr = Pointer::parse("/addresses/0/city").unwrap();
        assert_eq!(ptr.tokens(), ["addresses", "0", "city"]);
        assert_eq!(ptr.to_string(), "/addresses/0/city");
        assert!(!ptr.is_root());
    }

    #[test]
    fn empty_string_is_root() {
        let ptr = Pointer::parse("").unwrap();
        assert!(ptr.is_root());
        assert!(ptr.split_last().is_none());
    }

    #[test]
    fn slash_alone_is_the_empty_key() {
        let ptr = Pointer::parse("/").unwrap();
        assert_eq!(ptr.tokens(), [""]);
    }

    #[test]
    fn escapes_are_decoded() {
        let ptr = Pointer::parse("/a~1b/m~0n/~01").unwrap();
        assert_eq!(ptr.tokens(), ["a/b", "m~n", "~1"]);
    }

    #[test]
    fn bad_escape_rejected() {
        assert_eq!(
            Pointer::parse("/a~2").unwrap_err(),
            PointerError::InvalidEscape("a~2".into())
        );
        assert!(Pointer::parse("/trailing~").is_err());
    }

    #[test]
    fn missing_leading_slash_rejected() {
        assert_eq!(
            Pointer::parse("name").unwrap_err(),
            PointerError::MissingLeadingSlash("name".into())
        );
    }

    #[test]
    fn descendant_check_is_segment_based() {
        let from = Pointer::parse("/addresses/1").unwrap();
        assert!(Pointer::parse("/addresses/1/city").unwrap().is_descendant_of(&from));
        assert!(!Pointer::parse("/addresses/1").unwrap().is_descendant_of(&from));
        // Shares a string prefix, not a segment prefix.
        assert!(!Pointer::parse("/addresses/10").unwrap().is_descendant_of(&from));
    }

    #[test]
    fn list_index_rules() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("99999999999999999999999"), None);
    }
}

//! Tag-begin nodes: the parsed unit for one opening tag.
//!
//! A parser layer turns a tag-begin token into a [`TagBegin`] node that
//! owns its raw opening text (e.g. `<ui.card`). The node exposes the
//! syntactic pieces the resolver works from: the written tag name, its
//! local part, and the explicit qualifier when the name is dotted.

use smol_str::SmolStr;

use super::token::{Token, TokenKind};
use crate::base::TextRange;

/// The parsed structural unit representing `<name ...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBegin {
    /// Raw opening-tag text, including the leading `<`.
    raw: SmolStr,
    /// Where the opening text sits in its file.
    range: TextRange,
}

impl TagBegin {
    /// Create a node from raw opening-tag text.
    pub fn new(raw: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            raw: raw.into(),
            range,
        }
    }

    /// Build a node from a tag-begin token (regular or conditional).
    ///
    /// Returns `None` for tokens of any other kind.
    pub fn from_token(source: &str, token: &Token) -> Option<Self> {
        if !token.kind.is_tag_begin() {
            return None;
        }
        Some(Self::new(token.text(source), token.range))
    }

    /// The raw opening-tag text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The node's range in its file.
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// The tag name as written: the raw text minus the leading `<`,
    /// trimmed of trailing whitespace.
    pub fn tag_name(&self) -> &str {
        self.raw.strip_prefix('<').unwrap_or(&self.raw).trim_end()
    }

    /// The local part of the tag name: everything after the last `.`
    /// for a qualified name, else the whole name.
    pub fn local_name(&self) -> &str {
        let name = self.tag_name();
        match name.rfind('.') {
            Some(dot) => &name[dot + 1..],
            None => name,
        }
    }

    /// The namespace portion written before the last `.`, when present.
    pub fn explicit_qualifier(&self) -> Option<&str> {
        let name = self.tag_name();
        name.rfind('.').map(|dot| &name[..dot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::syntax::scan;

    fn tag(raw: &str) -> TagBegin {
        TagBegin::new(raw, TextRange::new(TextSize::from(0), TextSize::from(raw.len() as u32)))
    }

    #[test]
    fn test_tag_name_strips_angle() {
        assert_eq!(tag("<div").tag_name(), "div");
        assert_eq!(tag("div").tag_name(), "div");
    }

    #[test]
    fn test_local_name_unqualified() {
        let t = tag("<div");
        assert_eq!(t.local_name(), "div");
        assert_eq!(t.explicit_qualifier(), None);
    }

    #[test]
    fn test_local_name_qualified() {
        let t = tag("<ui.card");
        assert_eq!(t.local_name(), "card");
        assert_eq!(t.explicit_qualifier(), Some("ui"));
    }

    #[test]
    fn test_deeply_qualified_splits_at_last_dot() {
        let t = tag("<ui.widgets.card");
        assert_eq!(t.local_name(), "card");
        assert_eq!(t.explicit_qualifier(), Some("ui.widgets"));
    }

    #[test]
    fn test_from_token() {
        let source = "<div class=\"x\">";
        let tokens = scan(source);
        let node = TagBegin::from_token(source, &tokens[0]).unwrap();

        assert_eq!(node.raw(), "<div");
        assert_eq!(node.tag_name(), "div");

        // the `>` token is not a tag begin
        assert!(TagBegin::from_token(source, tokens.last().unwrap()).is_none());
    }

    #[test]
    fn test_from_conditional_token() {
        let source = "<if cond=\"{x}\">";
        let tokens = scan(source);
        let node = TagBegin::from_token(source, &tokens[0]).unwrap();

        assert_eq!(node.tag_name(), "if");
    }
}

//! Token taxonomy for embedded tag markup.
//!
//! The kinds below are the wire contract with the host parser layer.
//! Every byte of scanned input is covered by exactly one token span;
//! spans are contiguous and non-overlapping, and anything the scanner
//! does not recognize is covered by [`TokenKind::BadChar`] rather than
//! aborting the scan.

use crate::base::TextRange;

/// The kind of a tag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unrecognized input span. Also covers embedded host-code runs
    /// between [`TokenKind::EmbedStart`] and [`TokenKind::EmbedEnd`]
    /// when the host framework does not re-lex them itself.
    BadChar,
    /// Attribute key, including the `=` when one directly follows.
    AttrName,
    /// Attribute value chunk. Quoted values keep their quotes: the
    /// opening quote is part of the first chunk and the closing quote
    /// part of the last.
    AttrValue,
    /// Opening tag start, e.g. `<div` or `<module.widget`.
    TagBegin,
    /// The `>` terminating an opening tag.
    TagEnd,
    /// A closing tag, e.g. `</div>`.
    TagClose,
    /// The self-closing terminator `/>`.
    TagEndAndClose,
    /// Conditional-tag open, `<if`.
    IfTagBegin,
    /// Conditional alternate-branch open, `<else`.
    ElseTagBegin,
    /// Conditional-tag close, `</if>`.
    IfTagClose,
    /// Conditional alternate-branch close, `</else>`.
    ElseTagClose,
    /// The `{` opening an embedded host expression.
    EmbedStart,
    /// The `}` closing an embedded host expression.
    EmbedEnd,
    /// A string span: literal text in a tag body, or a string literal
    /// inside an embedded host expression.
    String,
    /// Whitespace between tag-structural tokens. The host framework's
    /// shared whitespace token, materialized locally so full coverage
    /// holds in standalone scans.
    Whitespace,
}

impl TokenKind {
    /// Wire name of this kind, as the host framework registers it.
    pub fn label(self) -> &'static str {
        match self {
            TokenKind::BadChar => "BADCHAR",
            TokenKind::AttrName => "ATTRNAME",
            TokenKind::AttrValue => "ATTRVALUE",
            TokenKind::TagBegin => "TAG_BEGIN",
            TokenKind::TagEnd => "TAG_END",
            TokenKind::TagClose => "TAG_CLOSE",
            TokenKind::TagEndAndClose => "TAG_END_AND_CLOSE",
            TokenKind::IfTagBegin => "IF_TAG_BEGIN",
            TokenKind::ElseTagBegin => "ELSE_TAG_BEGIN",
            TokenKind::IfTagClose => "IF_TAG_CLOSE",
            TokenKind::ElseTagClose => "ELSE_TAG_CLOSE",
            TokenKind::EmbedStart => "EMBED_START",
            TokenKind::EmbedEnd => "EMBED_END",
            TokenKind::String => "STRING",
            TokenKind::Whitespace => "WHITESPACE",
        }
    }

    /// Check if this kind opens a tag (regular or conditional).
    ///
    /// Tokens of these kinds are the ones a parser turns into
    /// [`TagBegin`](crate::syntax::TagBegin) nodes.
    pub fn is_tag_begin(self) -> bool {
        matches!(
            self,
            TokenKind::TagBegin | TokenKind::IfTagBegin | TokenKind::ElseTagBegin
        )
    }

    /// Check if this kind closes a tag (regular or conditional).
    pub fn is_tag_close(self) -> bool {
        matches!(
            self,
            TokenKind::TagClose | TokenKind::IfTagClose | TokenKind::ElseTagClose
        )
    }

    /// Check if this kind belongs to the conditional-tag family.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            TokenKind::IfTagBegin
                | TokenKind::ElseTagBegin
                | TokenKind::IfTagClose
                | TokenKind::ElseTagClose
        )
    }
}

/// A single token: a kind plus the byte range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// What the span is.
    pub kind: TokenKind,
    /// The byte range in the scanned text.
    pub range: TextRange,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    /// The token's text, sliced out of the source it was scanned from.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range]
    }

    /// Length of the covered span in bytes.
    pub fn len(&self) -> u32 {
        self.range.len().into()
    }

    /// Check if the span is empty. The scanner never emits these.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    #[test]
    fn test_kind_families() {
        assert!(TokenKind::TagBegin.is_tag_begin());
        assert!(TokenKind::IfTagBegin.is_tag_begin());
        assert!(!TokenKind::TagClose.is_tag_begin());

        assert!(TokenKind::ElseTagClose.is_tag_close());
        assert!(!TokenKind::TagEnd.is_tag_close());

        assert!(TokenKind::IfTagClose.is_conditional());
        assert!(!TokenKind::TagBegin.is_conditional());
    }

    #[test]
    fn test_token_text() {
        let source = "<div>";
        let token = Token::new(
            TokenKind::TagBegin,
            TextRange::new(TextSize::from(0), TextSize::from(4)),
        );

        assert_eq!(token.text(source), "<div");
        assert_eq!(token.len(), 4);
    }

    #[test]
    fn test_labels_are_distinct() {
        use std::collections::HashSet;

        let kinds = [
            TokenKind::BadChar,
            TokenKind::AttrName,
            TokenKind::AttrValue,
            TokenKind::TagBegin,
            TokenKind::TagEnd,
            TokenKind::TagClose,
            TokenKind::TagEndAndClose,
            TokenKind::IfTagBegin,
            TokenKind::ElseTagBegin,
            TokenKind::IfTagClose,
            TokenKind::ElseTagClose,
            TokenKind::EmbedStart,
            TokenKind::EmbedEnd,
            TokenKind::String,
            TokenKind::Whitespace,
        ];

        let labels: HashSet<_> = kinds.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), kinds.len());
    }
}

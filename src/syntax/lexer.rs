//! Resumable scanner for embedded tag markup.
//!
//! The scanner walks raw source text and emits a flat sequence of
//! [`Token`]s whose spans cover every input byte, with no gaps and no
//! overlaps. Malformed input never aborts a scan: whatever matches no
//! rule is covered by [`TokenKind::BadChar`], and partially matched
//! constructs degrade to the most specific kind that did match.
//!
//! Scanning is a pure function of `(text, checkpoint)`. The host
//! framework records a [`Checkpoint`] at any token boundary and later
//! restarts from it, which is how incremental re-lexing and the
//! hand-off around embedded host expressions work: after `EmbedStart`
//! the host lexer may consume the expression itself and resume this
//! scanner at the closing brace.

use thiserror::Error;
use tracing::trace;
use unicode_ident::{is_xid_continue, is_xid_start};

use super::token::{Token, TokenKind};
use crate::base::{TextRange, TextSize};

/// Scan the whole text from the beginning. Eager convenience wrapper
/// around [`Lexer`].
pub fn scan(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

// ============================================================================
// MODES & CHECKPOINTS
// ============================================================================

/// One frame of scanner state. The stack nests: tags inside embedded
/// expressions inside attribute values all push on top of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Tag bodies and the top level: text runs, tag opens/closes,
    /// embed openers.
    Content,
    /// Between a tag name and its `>`: attributes and terminators.
    /// `value_pending` is set after an attribute key that took an `=`,
    /// so the following run lexes as an unquoted value.
    InTag { value_pending: bool },
    /// Inside a quoted attribute value, after an embedded expression
    /// interrupted the first chunk.
    AttrValue { quote: char },
    /// Inside `{...}`. `depth` tracks host-code braces so dict and set
    /// literals do not end the embed early.
    Embed { depth: u32 },
}

/// An explicit scan state: byte offset plus mode stack.
///
/// Only obtainable from [`Lexer::checkpoint`], so a checkpoint is
/// always internally consistent; [`Lexer::resume`] revalidates the
/// offset against the text it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    offset: TextSize,
    modes: Vec<Mode>,
}

impl Checkpoint {
    /// The byte offset scanning will continue from.
    pub fn offset(&self) -> TextSize {
        self.offset
    }
}

/// Error resuming from a checkpoint that does not fit the given text.
///
/// These are the only errors in the crate: they signal caller misuse
/// (a checkpoint recorded against different text), not bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResumeError {
    #[error("checkpoint offset {offset} is past the end of the text ({len} bytes)")]
    OffsetOutOfBounds { offset: u32, len: u32 },
    #[error("checkpoint offset {offset} is not a character boundary")]
    NotCharBoundary { offset: u32 },
}

// ============================================================================
// LEXER
// ============================================================================

/// The tag scanner. Iterate it to drain tokens; call
/// [`checkpoint`](Lexer::checkpoint) at any boundary to record a
/// restartable state.
#[derive(Debug)]
pub struct Lexer<'s> {
    text: &'s str,
    pos: usize,
    modes: Vec<Mode>,
}

impl<'s> Lexer<'s> {
    /// Scan `text` from offset 0.
    pub fn new(text: &'s str) -> Self {
        trace!(len = text.len(), "tag scan start");
        Self {
            text,
            pos: 0,
            modes: vec![Mode::Content],
        }
    }

    /// Restart scanning from a previously recorded checkpoint.
    pub fn resume(text: &'s str, checkpoint: Checkpoint) -> Result<Self, ResumeError> {
        let offset = u32::from(checkpoint.offset) as usize;
        if offset > text.len() {
            return Err(ResumeError::OffsetOutOfBounds {
                offset: offset as u32,
                len: text.len() as u32,
            });
        }
        if !text.is_char_boundary(offset) {
            return Err(ResumeError::NotCharBoundary {
                offset: offset as u32,
            });
        }
        trace!(offset, "tag scan resume");
        let mut modes = checkpoint.modes;
        if modes.is_empty() {
            modes.push(Mode::Content);
        }
        Ok(Self {
            text,
            pos: offset,
            modes,
        })
    }

    /// Record the current scan state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: TextSize::from(self.pos as u32),
            modes: self.modes.clone(),
        }
    }

    /// The byte offset of the next unscanned character.
    pub fn offset(&self) -> TextSize {
        TextSize::from(self.pos as u32)
    }

    fn top(&self) -> Mode {
        *self.modes.last().expect("mode stack is never empty")
    }

    fn set_value_pending(&mut self, pending: bool) {
        if let Some(Mode::InTag { value_pending }) = self.modes.last_mut() {
            *value_pending = pending;
        }
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text[pos..].chars().next()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            TextRange::new(TextSize::from(start as u32), TextSize::from(self.pos as u32)),
        )
    }

    // ------------------------------------------------------------------
    // Content: tag bodies and the top level
    // ------------------------------------------------------------------

    fn next_in_content(&mut self, start: usize) -> Token {
        let rest = &self.text[start..];
        match rest.as_bytes()[0] {
            b'<' => self.scan_angle(start),
            b'{' => {
                self.pos = start + 1;
                self.modes.push(Mode::Embed { depth: 1 });
                self.token(TokenKind::EmbedStart, start)
            }
            _ => {
                // literal text run up to the next tag or embed opener
                let end = rest
                    .bytes()
                    .position(|b| b == b'<' || b == b'{')
                    .unwrap_or(rest.len());
                self.pos = start + end;
                self.token(TokenKind::String, start)
            }
        }
    }

    /// Scan at a `<`: an opening tag, a closing tag, or a stray angle
    /// bracket. Shared by content and embed modes.
    fn scan_angle(&mut self, start: usize) -> Token {
        let rest = &self.text[start..];
        let bytes = rest.as_bytes();

        if bytes.get(1) == Some(&b'/') {
            let name_len = ident_len(&rest[2..], '.');
            if name_len == 0 {
                // `</` with nothing tag-like after it
                self.pos = start + 2;
                return self.token(TokenKind::BadChar, start);
            }
            let name = &rest[2..2 + name_len];
            let mut end = 2 + name_len;
            if bytes.get(end) == Some(&b'>') {
                end += 1;
            }
            self.pos = start + end;
            // a close ends the body frame pushed at the matching open
            if self.modes.len() > 1 && self.top() == Mode::Content {
                self.modes.pop();
            }
            let kind = match name {
                "if" => TokenKind::IfTagClose,
                "else" => TokenKind::ElseTagClose,
                _ => TokenKind::TagClose,
            };
            return self.token(kind, start);
        }

        let name_len = ident_len(&rest[1..], '.');
        if name_len == 0 {
            // stray `<`
            self.pos = start + 1;
            return self.token(TokenKind::BadChar, start);
        }
        let name = &rest[1..1 + name_len];
        self.pos = start + 1 + name_len;
        self.modes.push(Mode::InTag {
            value_pending: false,
        });
        let kind = match name {
            "if" => TokenKind::IfTagBegin,
            "else" => TokenKind::ElseTagBegin,
            _ => TokenKind::TagBegin,
        };
        self.token(kind, start)
    }

    // ------------------------------------------------------------------
    // InTag: attributes and tag terminators
    // ------------------------------------------------------------------

    fn next_in_tag(&mut self, start: usize, value_pending: bool) -> Token {
        let rest = &self.text[start..];
        let bytes = rest.as_bytes();
        let c = self.char_at(start).expect("not at end of input");

        if c.is_whitespace() {
            let end = rest
                .char_indices()
                .find(|&(_, ch)| !ch.is_whitespace())
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            self.pos = start + end;
            return self.token(TokenKind::Whitespace, start);
        }

        match bytes[0] {
            b'>' => {
                self.pos = start + 1;
                self.modes.pop();
                self.modes.push(Mode::Content);
                self.token(TokenKind::TagEnd, start)
            }
            b'/' => {
                if bytes.get(1) == Some(&b'>') {
                    self.pos = start + 2;
                    self.modes.pop();
                    self.token(TokenKind::TagEndAndClose, start)
                } else {
                    self.pos = start + 1;
                    self.set_value_pending(false);
                    self.token(TokenKind::BadChar, start)
                }
            }
            b'{' => {
                self.pos = start + 1;
                self.set_value_pending(false);
                self.modes.push(Mode::Embed { depth: 1 });
                self.token(TokenKind::EmbedStart, start)
            }
            b'"' | b'\'' => self.scan_quoted_value_open(start, bytes[0] as char),
            b'=' => {
                // key and `=` separated by whitespace; still expect a value
                self.pos = start + 1;
                self.set_value_pending(true);
                self.token(TokenKind::BadChar, start)
            }
            _ if value_pending && !is_value_stop(c) => {
                // unquoted attribute value
                let end = rest
                    .char_indices()
                    .find(|&(_, ch)| is_value_stop(ch))
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                self.pos = start + end;
                self.set_value_pending(false);
                self.token(TokenKind::AttrValue, start)
            }
            _ if is_xid_start(c) => {
                let len = ident_len(rest, '-');
                let has_eq = bytes.get(len) == Some(&b'=');
                self.pos = start + len + usize::from(has_eq);
                self.set_value_pending(has_eq);
                self.token(TokenKind::AttrName, start)
            }
            _ => {
                self.pos = start + c.len_utf8();
                self.set_value_pending(false);
                self.token(TokenKind::BadChar, start)
            }
        }
    }

    /// First chunk of a quoted attribute value, starting at the opening
    /// quote. Only pushes [`Mode::AttrValue`] when an embedded
    /// expression interrupts the value; a value without embeds is a
    /// single token.
    fn scan_quoted_value_open(&mut self, start: usize, quote: char) -> Token {
        let rest = &self.text[start..];
        let mut chars = rest.char_indices();
        chars.next(); // opening quote
        for (i, ch) in chars {
            if ch == quote {
                self.pos = start + i + 1;
                self.set_value_pending(false);
                return self.token(TokenKind::AttrValue, start);
            }
            if ch == '{' {
                self.pos = start + i;
                self.set_value_pending(false);
                self.modes.push(Mode::AttrValue { quote });
                return self.token(TokenKind::AttrValue, start);
            }
        }
        // unterminated value: cover what is there
        self.pos = self.text.len();
        self.set_value_pending(false);
        self.token(TokenKind::AttrValue, start)
    }

    // ------------------------------------------------------------------
    // AttrValue: value chunks after an embed interrupted the quotes
    // ------------------------------------------------------------------

    fn next_in_value(&mut self, start: usize, quote: char) -> Token {
        let rest = &self.text[start..];
        if rest.as_bytes()[0] == b'{' {
            self.pos = start + 1;
            self.modes.push(Mode::Embed { depth: 1 });
            return self.token(TokenKind::EmbedStart, start);
        }
        for (i, ch) in rest.char_indices() {
            if ch == quote {
                // closing quote is part of the last chunk
                self.pos = start + i + 1;
                self.modes.pop();
                return self.token(TokenKind::AttrValue, start);
            }
            if ch == '{' {
                self.pos = start + i;
                return self.token(TokenKind::AttrValue, start);
            }
        }
        self.pos = self.text.len();
        self.modes.pop();
        self.token(TokenKind::AttrValue, start)
    }

    // ------------------------------------------------------------------
    // Embed: host expression between braces
    // ------------------------------------------------------------------

    fn next_in_embed(&mut self, start: usize, depth: u32) -> Token {
        let rest = &self.text[start..];
        let bytes = rest.as_bytes();

        match bytes[0] {
            b'}' if depth == 1 => {
                self.pos = start + 1;
                self.modes.pop();
                return self.token(TokenKind::EmbedEnd, start);
            }
            b'"' | b'\'' => return self.scan_host_string(start, bytes[0] as char),
            b'<' if looks_like_tag(rest) => return self.scan_angle(start),
            _ => {}
        }

        // host-code run: the host parser owns these spans, so a
        // standalone scan degrades them to the catch-all kind. Braces
        // are tracked so nested literals do not end the embed.
        let mut d = depth;
        let mut end = rest.len();
        for (i, ch) in rest.char_indices() {
            match ch {
                '{' => d += 1,
                '}' => {
                    if d == 1 {
                        end = i;
                        break;
                    }
                    d -= 1;
                }
                '"' | '\'' => {
                    if i > 0 {
                        end = i;
                        break;
                    }
                }
                '<' => {
                    if i > 0 && looks_like_tag(&rest[i..]) {
                        end = i;
                        break;
                    }
                }
                _ => {}
            }
        }
        self.pos = start + end;
        if let Some(Mode::Embed { depth }) = self.modes.last_mut() {
            *depth = d;
        }
        self.token(TokenKind::BadChar, start)
    }

    /// A host string literal inside an embed. Recognized so quotes and
    /// braces inside it cannot derail the embed's nesting.
    fn scan_host_string(&mut self, start: usize, quote: char) -> Token {
        let rest = &self.text[start..];
        let mut chars = rest.char_indices();
        chars.next(); // opening quote
        let mut escaped = false;
        for (i, ch) in chars {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if ch == quote {
                self.pos = start + i + 1;
                return self.token(TokenKind::String, start);
            }
        }
        // unterminated string literal: cover the rest
        self.pos = self.text.len();
        self.token(TokenKind::String, start)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.text.len() {
            return None;
        }
        let start = self.pos;
        let token = match self.top() {
            Mode::Content => self.next_in_content(start),
            Mode::InTag { value_pending } => self.next_in_tag(start, value_pending),
            Mode::AttrValue { quote } => self.next_in_value(start, quote),
            Mode::Embed { depth } => self.next_in_embed(start, depth),
        };
        debug_assert!(self.pos > start, "scanner must always make progress");
        Some(token)
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// Byte length of an identifier at the start of `text`, where `extra`
/// is also allowed after the first character. 0 when no identifier
/// starts there.
fn ident_len(text: &str, extra: char) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if is_xid_start(c) => {}
        _ => return 0,
    }
    for (i, c) in chars {
        if !is_xid_continue(c) && c != extra {
            return i;
        }
    }
    text.len()
}

/// Does `s` (starting at `<`) open or close a tag?
fn looks_like_tag(s: &str) -> bool {
    let mut chars = s.chars();
    if chars.next() != Some('<') {
        return false;
    }
    match chars.next() {
        Some('/') => matches!(chars.next(), Some(c) if is_xid_start(c)),
        Some(c) => is_xid_start(c),
        None => false,
    }
}

/// Characters that end an unquoted attribute value.
fn is_value_stop(c: char) -> bool {
    c.is_whitespace() || matches!(c, '>' | '/' | '"' | '\'' | '{' | '}' | '<' | '=')
}

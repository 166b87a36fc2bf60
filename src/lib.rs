//! # pyxl-base
//!
//! Core library for Pyxl tag lexing and tag-to-symbol resolution.
//!
//! Pyxl embeds an HTML-like tag syntax inside Python source files. This
//! crate provides the analysis core an editor or indexer builds on: a
//! lexer that turns tag markup into a flat, fully-covering token stream,
//! and a resolver that maps a parsed tag name to the `x_`-prefixed class
//! it references, including the implicit-namespace rule driven by
//! `from ... pyxl import html` statements.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! sem     → Tag-to-symbol resolution over import facts
//!   ↓
//! syntax  → Tag lexer, token taxonomy, tag-begin nodes
//!   ↓
//! base    → Primitives (FileId, spans, line index)
//! ```
//!
//! The host language's own parser, the project index, and all UI
//! surfaces live outside this crate. They feed it source text and
//! per-file import facts, and consume tokens and resolutions.

/// Foundation types: FileId, spans, line/column conversion
pub mod base;

/// Tag-to-symbol resolution: import facts, module index, references
pub mod sem;

/// Tag lexer: token taxonomy, resumable scanner, tag-begin nodes
pub mod syntax;

// Re-export the foundation types and the two component surfaces
pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use sem::{
    FileFacts, ImportRef, ModuleIndex, Qualifier, Reference, Resolution, TagReference, resolve,
};
pub use syntax::{Checkpoint, Lexer, TagBegin, Token, TokenKind, scan};

//! Host-source import scanner.
//!
//! Derives [`FileFacts`] and [`ModuleFacts`] from Python-like source
//! text when the host framework does not supply them from its own
//! index. Only the import-relevant subset of the language is
//! tokenized: top-level `from X import ...` statements and top-level
//! `class` headers. Everything else, including malformed statements,
//! is skipped without error.

use logos::Logos;
use smol_str::SmolStr;
use tracing::debug;

use super::facts::{FileFacts, FromImport, ImportElement, ModuleFacts};
use crate::base::FileId;

/// Build one file's import view from its source text.
pub fn scan_file_facts(file: FileId, text: &str) -> FileFacts {
    let (imports, _) = scan_top_level(text);
    debug!(%file, imports = imports.len(), "scanned file facts");
    FileFacts::with_imports(file, imports)
}

/// Build a module's facts (top-level classes and first-level imports)
/// from its source text, for insertion into a
/// [`ModuleIndex`](crate::sem::ModuleIndex).
pub fn scan_module_facts(text: &str) -> ModuleFacts {
    let (imports, classes) = scan_top_level(text);
    debug!(
        classes = classes.len(),
        imports = imports.len(),
        "scanned module facts"
    );
    let mut facts = ModuleFacts::new();
    for class in classes {
        facts.add_class(class);
    }
    for import in imports {
        facts.add_import(import);
    }
    facts
}

// ============================================================================
// TOKENS
// ============================================================================

/// The import-relevant token subset of the host language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"\\\r?\n")]
enum PyToken {
    #[token("from")]
    From,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("as")]
    As,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("*")]
    Star,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("\n")]
    Newline,
    /// String literals are recognized only so their contents cannot
    /// fake statements; triple-quoted bodies are consumed wholesale.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    #[token("\"\"\"", skip_triple_double)]
    #[token("'''", skip_triple_single)]
    Str,
}

fn skip_triple_double(lex: &mut logos::Lexer<'_, PyToken>) {
    skip_until(lex, "\"\"\"");
}

fn skip_triple_single(lex: &mut logos::Lexer<'_, PyToken>) {
    skip_until(lex, "'''");
}

fn skip_until(lex: &mut logos::Lexer<'_, PyToken>, delim: &str) {
    match lex.remainder().find(delim) {
        Some(end) => lex.bump(end + delim.len()),
        None => lex.bump(lex.remainder().len()),
    }
}

/// A materialized token. `kind` is `None` for input the subset lexer
/// does not recognize (operators, numbers, ...); those still take part
/// in statement-boundary bookkeeping.
struct Tok<'s> {
    kind: Option<PyToken>,
    start: usize,
    text: &'s str,
}

fn tokenize(text: &str) -> Vec<Tok<'_>> {
    let mut lexer = PyToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        tokens.push(Tok {
            kind: result.ok(),
            start: lexer.span().start,
            text: lexer.slice(),
        });
    }
    tokens
}

// ============================================================================
// STATEMENT SCANNING
// ============================================================================

/// Collect top-level from-imports and top-level class names.
fn scan_top_level(text: &str) -> (Vec<FromImport>, Vec<SmolStr>) {
    let tokens = tokenize(text);
    let mut imports = Vec::new();
    let mut classes = Vec::new();

    let mut i = 0;
    let mut line_start = true;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.kind == Some(PyToken::Newline) {
            line_start = true;
            i += 1;
            continue;
        }
        // top-level means first on its line AND at column 0: indented
        // statements belong to nested scopes and are ignored
        let top_level = line_start && at_column_zero(text, tok.start);
        line_start = false;

        match tok.kind {
            Some(PyToken::From) if top_level => {
                if let Some((import, next)) = parse_from_import(&tokens, i) {
                    imports.push(import);
                    i = next;
                    continue;
                }
            }
            Some(PyToken::Class) if top_level => {
                if let Some(name) = tokens.get(i + 1) {
                    if name.kind == Some(PyToken::Ident) {
                        classes.push(SmolStr::new(name.text));
                        i += 2;
                        continue;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    (imports, classes)
}

fn at_column_zero(text: &str, offset: usize) -> bool {
    offset == 0 || text.as_bytes()[offset - 1] == b'\n'
}

/// Parse one `from X import ...` statement starting at the `from`
/// token. Returns the statement and the index to continue scanning
/// from, or `None` when the statement is malformed (the caller skips
/// it and keeps scanning).
fn parse_from_import(tokens: &[Tok<'_>], from_idx: usize) -> Option<(FromImport, usize)> {
    let mut i = from_idx + 1;

    // dotted source path; leading dots cover relative imports
    let mut source = String::new();
    let mut last_was_ident = false;
    loop {
        let tok = tokens.get(i)?;
        match tok.kind {
            Some(PyToken::Dot) => {
                source.push('.');
                last_was_ident = false;
            }
            Some(PyToken::Ident) => {
                if last_was_ident {
                    return None;
                }
                source.push_str(tok.text);
                last_was_ident = true;
            }
            Some(PyToken::Import) => {
                i += 1;
                break;
            }
            _ => return None,
        }
        i += 1;
    }
    if source.is_empty() {
        return None;
    }

    // imported elements, optionally parenthesized
    let mut elements = Vec::new();
    let parens = tokens.get(i)?.kind == Some(PyToken::LParen);
    if parens {
        i += 1;
    }
    loop {
        while parens && tokens.get(i).map(|t| t.kind) == Some(Some(PyToken::Newline)) {
            i += 1;
        }
        let Some(tok) = tokens.get(i) else { break };
        match tok.kind {
            Some(PyToken::Ident) => {
                let name = tok.text;
                i += 1;
                let mut alias = None;
                if tokens.get(i).map(|t| t.kind) == Some(Some(PyToken::As)) {
                    let alias_tok = tokens.get(i + 1)?;
                    if alias_tok.kind != Some(PyToken::Ident) {
                        return None;
                    }
                    alias = Some(alias_tok.text);
                    i += 2;
                }
                elements.push(match alias {
                    Some(alias) => ImportElement::aliased(name, alias),
                    None => ImportElement::new(name),
                });

                while parens && tokens.get(i).map(|t| t.kind) == Some(Some(PyToken::Newline)) {
                    i += 1;
                }
                match tokens.get(i).map(|t| t.kind) {
                    Some(Some(PyToken::Comma)) => i += 1,
                    Some(Some(PyToken::RParen)) if parens => {
                        i += 1;
                        break;
                    }
                    _ if parens => return None,
                    _ => break,
                }
            }
            // star imports carry no named elements but the statement
            // itself is still recorded
            Some(PyToken::Star) => {
                i += 1;
                break;
            }
            // trailing comma before the closing paren
            Some(PyToken::RParen) if parens => {
                i += 1;
                break;
            }
            Some(PyToken::Newline) if !parens => break,
            _ if parens => return None,
            _ => break,
        }
    }

    Some((FromImport::new(source, elements), i))
}

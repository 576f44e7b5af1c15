//! Path Pattern Matching
//!
//! Small glob compiler used to decide whether a relative path is trackable.
//! A path is trackable iff it matches no exclude pattern and at least one
//! include pattern; excludes are checked first and short-circuit.
//!
//! Supported glob dialect:
//!
//! - `*`      any run of characters excluding `/`
//! - `**`     any run of characters including `/`
//! - `**/`    as above, also matching the zero-directories case
//! - `{a,b}`  alternation over literal alternatives
//! - `.`      and every other character: literal
//!
//! Compilation runs in two explicit stages to keep escaping and
//! meta-character expansion apart: `tokenize` splits the pattern into
//! literal runs, wildcards, and alternations; `emit` maps tokens to a
//! regular expression, escaping literal text last. Matching is
//! case-sensitive over forward-slash-normalized paths.

use regex::Regex;

use crate::types::{DriftError, Result};

// =============================================================================
// Compiler
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Verbatim text; regex-escaped at emit time
    Literal(String),
    /// `*` - any run excluding the separator
    Star,
    /// `**` - any run including separators
    GlobStar,
    /// `**/` - any run of whole directories, including none
    GlobStarSlash,
    /// `{a,b,c}` - one of the literal alternatives
    Alternation(Vec<String>),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        tokens.push(Token::GlobStarSlash);
                    } else {
                        tokens.push(Token::GlobStar);
                    }
                } else {
                    tokens.push(Token::Star);
                }
            }
            '{' => {
                // Collect up to the closing brace; an unterminated brace is
                // treated as literal text.
                let mut body = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    body.push(inner);
                }
                if closed {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Alternation(
                        body.split(',').map(str::to_string).collect(),
                    ));
                } else {
                    literal.push('{');
                    literal.push_str(&body);
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}

fn emit(tokens: &[Token]) -> String {
    let mut out = String::from("^");
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(&regex::escape(text)),
            Token::Star => out.push_str("[^/]*"),
            Token::GlobStar => out.push_str(".*"),
            Token::GlobStarSlash => out.push_str("(?:.*/)?"),
            Token::Alternation(alts) => {
                let escaped: Vec<String> = alts.iter().map(|a| regex::escape(a)).collect();
                out.push_str("(?:");
                out.push_str(&escaped.join("|"));
                out.push(')');
            }
        }
    }
    out.push('$');
    out
}

// =============================================================================
// Glob Pattern
// =============================================================================

/// One compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern into a matcher
    pub fn compile(pattern: &str) -> Result<Self> {
        let translated = emit(&tokenize(pattern));
        let regex = Regex::new(&translated).map_err(|e| DriftError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Test a forward-slash relative path against this pattern
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Original glob text
    pub fn source(&self) -> &str {
        &self.source
    }
}

// =============================================================================
// Pattern Set
// =============================================================================

/// Ordered include/exclude pattern lists compiled once per invocation
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl PatternSet {
    /// Compile include and exclude lists; fails on the first bad pattern
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: include
                .iter()
                .map(|p| GlobPattern::compile(p))
                .collect::<Result<_>>()?,
            exclude: exclude
                .iter()
                .map(|p| GlobPattern::compile(p))
                .collect::<Result<_>>()?,
        })
    }

    /// A path is trackable iff no exclude matches and some include matches
    pub fn is_trackable(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");

        for pattern in &self.exclude {
            if pattern.matches(&normalized) {
                return false;
            }
        }

        self.include.iter().any(|p| p.matches(&normalized))
    }
}

/// One-shot convenience over uncompiled pattern lists
pub fn matches(path: &str, include: &[String], exclude: &[String]) -> Result<bool> {
    Ok(PatternSet::new(include, exclude)?.is_trackable(path))
}

// =============================================================================
// Tests
// =============================================================================

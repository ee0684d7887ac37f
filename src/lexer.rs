//! # Line Classifier
//!
//! Turns one line of ChordPro source into exactly one [`Token`]. Classification
//! is stateless; all structure is recovered later by the parser.
//!
//! ## Rules
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. `{key: value}` - header if `key` is a metadata field, otherwise a labelled directive
//! 2. `{status_of_kind}` - environment marker (`{start_of_verse}`, `{end_of_bridge}`)
//! 3. `{soc}` / `{eoc}` - chorus shortcut
//! 4. `{sot}` / `{eot}` - tablature shortcut
//! 5. `{name}` - bare directive
//! 6. empty line - verse divider
//! 7. anything else - lyrics
//!
//! Key/value is checked before the bare-name rule so that `{comment: text}`
//! keeps its label. Only the start of a line is matched; text after the
//! closing brace is ignored.
//!
//! ## Example
//! ```rust
//! use chordpro::lexer::{classify, Token};
//!
//! assert_eq!(
//!     classify("{title: Amazing Grace}"),
//!     Token::Header { key: "title".into(), value: "Amazing Grace".into() },
//! );
//! assert_eq!(classify("Amazing [G]grace"), Token::Lyrics("Amazing [G]grace".into()));
//! ```

use crate::ast::{is_metadata_key, CHORUS, TABULATURE, VERSE};

/// What an environment marker does to the current block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentStatus {
    Start,
    End,
    /// Blank line: separates (or opens) verse blocks.
    Divider,
    /// A `{xxx_of_kind}` marker whose status word is not `start` or `end`.
    Other(String),
}

impl EnvironmentStatus {
    fn from_word(word: &str) -> Self {
        match word {
            "start" => EnvironmentStatus::Start,
            "end" => EnvironmentStatus::End,
            "divider" => EnvironmentStatus::Divider,
            other => EnvironmentStatus::Other(other.to_string()),
        }
    }
}

/// Classification of a single source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Header {
        key: String,
        value: String,
    },
    Directive {
        name: String,
        label: Option<String>,
    },
    Environment {
        status: EnvironmentStatus,
        kind: String,
    },
    Lyrics(String),
}

impl Token {
    fn environment(status: EnvironmentStatus, kind: &str) -> Self {
        Token::Environment {
            status,
            kind: kind.to_string(),
        }
    }
}

/// A token with the 1-based line it came from
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
}

type Rule = fn(&str) -> Option<Token>;

/// Classification rules in priority order. `Lyrics` is the fallback.
const RULES: [Rule; 6] = [
    key_value,
    status_of_kind,
    chorus_shortcut,
    tab_shortcut,
    bare_directive,
    divider,
];

/// Classify one line. The line is expected to be stripped already.
pub fn classify(line: &str) -> Token {
    RULES
        .iter()
        .find_map(|rule| rule(line))
        .unwrap_or_else(|| Token::Lyrics(line.to_string()))
}

/// Classify a sequence of lines, keeping line numbers for diagnostics.
pub fn classify_lines<I, S>(lines: I) -> Vec<LocatedToken>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let token = classify(line.as_ref());
            log::trace!("line {}: {:?}", i + 1, token);
            LocatedToken { token, line: i + 1 }
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `s` into its leading run of word characters and the rest.
fn take_word(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_word_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// The word inside `{word}` at the start of the line.
fn braced_word(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('{')?;
    let (word, rest) = take_word(rest);
    if word.is_empty() || !rest.starts_with('}') {
        return None;
    }
    Some(word)
}

/// `{key: value}`. The value runs up to the last closing brace on the line.
fn key_value(line: &str) -> Option<Token> {
    let rest = line.strip_prefix('{')?;
    let (key, rest) = take_word(rest);
    if key.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix(':')?;
    let close = rest.rfind('}')?;
    let raw = &rest[..close];
    if raw.is_empty() {
        return None;
    }
    let value = raw.trim_start();

    if is_metadata_key(key) {
        // A whitespace-only value is kept as written
        let value = if value.is_empty() { raw } else { value };
        Some(Token::Header {
            key: key.to_string(),
            value: value.to_string(),
        })
    } else if value.is_empty() {
        None
    } else {
        Some(Token::Directive {
            name: key.to_string(),
            label: Some(value.to_string()),
        })
    }
}

/// `{start_of_chorus}`, `{end_of_verse}`, ...
fn status_of_kind(line: &str) -> Option<Token> {
    const SEPARATOR: &str = "_of_";

    let word = braced_word(line)?;
    // Prefer the last separator that leaves both sides non-empty
    let (at, _) = word
        .rmatch_indices(SEPARATOR)
        .find(|&(at, _)| at > 0 && at + SEPARATOR.len() < word.len())?;
    let status = &word[..at];
    let kind = &word[at + SEPARATOR.len()..];
    Some(Token::environment(EnvironmentStatus::from_word(status), kind))
}

fn chorus_shortcut(line: &str) -> Option<Token> {
    match braced_word(line)? {
        "soc" => Some(Token::environment(EnvironmentStatus::Start, CHORUS)),
        "eoc" => Some(Token::environment(EnvironmentStatus::End, CHORUS)),
        _ => None,
    }
}

fn tab_shortcut(line: &str) -> Option<Token> {
    match braced_word(line)? {
        "sot" => Some(Token::environment(EnvironmentStatus::Start, TABULATURE)),
        "eot" => Some(Token::environment(EnvironmentStatus::End, TABULATURE)),
        _ => None,
    }
}

/// `{name}`, or `{name:}` with a blank label. A metadata key never takes the
/// colon form here.
fn bare_directive(line: &str) -> Option<Token> {
    let rest = line.strip_prefix('{')?;
    let (name, rest) = take_word(rest);
    if name.is_empty() {
        return None;
    }

    let label = if rest.starts_with('}') {
        None
    } else if is_metadata_key(name) {
        return None;
    } else {
        let rest = rest.strip_prefix(':')?;
        let close = rest.rfind('}')?;
        Some(rest[..close].trim()).filter(|label| !label.is_empty())
    };

    Some(Token::Directive {
        name: name.to_string(),
        label: label.map(str::to_string),
    })
}

fn divider(line: &str) -> Option<Token> {
    if line.is_empty() {
        Some(Token::environment(EnvironmentStatus::Divider, VERSE))
    } else {
        None
    }
}

//! Lyric line tokenizing
//!
//! Splits a lyric line into word units and pulls inline chord annotations
//! (`[C]`, `[Am7]`) out of each word. A chord name is one or more word
//! characters; brackets around anything else are left in the text.

use crate::ast::{LyricLine, WordUnit};

/// A `[chord]` annotation found inside a word.
struct ChordMark<'a> {
    /// Byte offset of the opening bracket
    open: usize,
    name: &'a str,
    /// Byte offset just past the closing bracket
    end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Find the first chord annotation in `part` at or after `from`.
fn find_chord(part: &str, from: usize) -> Option<ChordMark<'_>> {
    let mut search = from;
    while let Some(offset) = part[search..].find('[') {
        let open = search + offset;
        let inner = &part[open + 1..];
        let name_len = inner.find(|c: char| !is_word_char(c)).unwrap_or(inner.len());
        if name_len > 0 && inner[name_len..].starts_with(']') {
            return Some(ChordMark {
                open,
                name: &inner[..name_len],
                end: open + 1 + name_len + 1,
            });
        }
        search = open + 1;
    }
    None
}

/// Tokenize one whitespace-free part of a lyric line.
///
/// Text before the first chord becomes that unit's prefix; text after each
/// chord, up to the next one, becomes its root. A part without chords is a
/// single plain unit.
///
/// # Example
/// ```rust
/// use chordpro::ast::WordUnit;
/// use chordpro::lyrics::tokenize_part;
///
/// assert_eq!(
///     tokenize_part("Hel[C]lo[G]o"),
///     vec![WordUnit::chorded("Hel", "C", "lo"), WordUnit::chorded("", "G", "o")],
/// );
/// assert_eq!(tokenize_part("world"), vec![WordUnit::plain("world")]);
/// ```
pub fn tokenize_part(part: &str) -> Vec<WordUnit> {
    let Some(first) = find_chord(part, 0) else {
        return vec![WordUnit::plain(part)];
    };

    let mut units = Vec::new();
    let mut prefix = &part[..first.open];
    let mut chord = first.name;
    let mut pos = first.end;

    loop {
        match find_chord(part, pos) {
            Some(next) => {
                units.push(WordUnit::chorded(prefix, chord, &part[pos..next.open]));
                prefix = "";
                chord = next.name;
                pos = next.end;
            }
            None => {
                units.push(WordUnit::chorded(prefix, chord, &part[pos..]));
                return units;
            }
        }
    }
}

/// Tokenize a lyric line into word units, in order.
pub fn tokenize_line(text: &str) -> LyricLine {
    text.split_whitespace().flat_map(tokenize_part).collect()
}

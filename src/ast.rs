//! # Document Model
//!
//! This module defines the structured form of a ChordPro song, as produced by
//! the parser in a single forward pass over the source lines.
//!
//! ## Type Hierarchy
//! ```text
//! Song
//!   ├── header: BTreeMap<key, value>   (title, artist, capo, ...)
//!   ├── structure: Vec<StructureTag>    (reading order: header, directive, verse, chorus, ...)
//!   ├── environments: Vec<EnvironmentBlock>
//!   │     ├── kind: String               ("verse", "chorus", "tabulature", ...)
//!   │     └── lines: Vec<LyricLine>
//!   │           └── Vec<WordUnit> (Plain | Chorded)
//!   ├── chord_vocabulary: ChordVocabulary (first-seen order, no duplicates)
//!   └── directives: Vec<Directive>
//! ```
//!
//! ## Serialized Shape
//! The serde representation of these types is the wire format consumed by
//! renderers, so several types serialize by hand:
//! - `StructureTag` is a bare string
//! - `EnvironmentBlock` is a single-entry mapping `{kind: lines}`
//! - `Directive` is a single-entry mapping `{name: label}`, where a missing
//!   label becomes `"not_specified"`
//!
//! ## Related Modules
//! - `parser` - Builds a `Song` from classified lines
//! - `lyrics` - Produces the `WordUnit`s of each lyric line
//! - `report` - Serializes a `Song` with its derived views

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Environment kind used for blank-line separated blocks and `{start_of_verse}`.
pub const VERSE: &str = "verse";
/// Environment kind for `{soc}` / `{start_of_chorus}`.
pub const CHORUS: &str = "chorus";
/// Environment kind for `{sot}`. The spelling matches what existing song files use.
pub const TABULATURE: &str = "tabulature";

/// Label written for a directive that was given without one.
pub const NOT_SPECIFIED: &str = "not_specified";

/// Metadata keys that turn a `{key: value}` line into a header entry.
/// Any other key makes the line a directive.
pub const METADATA_KEYS: [&str; 14] = [
    "title",
    "subtitle",
    "artist",
    "composer",
    "lyricist",
    "copyright",
    "album",
    "year",
    "key",
    "time",
    "tempo",
    "duration",
    "capo",
    "meta",
];

/// Returns true if `key` is one of the recognized metadata fields.
pub fn is_metadata_key(key: &str) -> bool {
    METADATA_KEYS.contains(&key)
}

/// One whitespace-separated unit of a lyric line.
///
/// A chorded unit carries the chord that sounds at that position together with
/// the text around it: `Hel[C]lo` becomes `prefix: "Hel", chord: "C", root: "lo"`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum WordUnit {
    Plain {
        root: String,
    },
    Chorded {
        prefix: String,
        chord: String,
        root: String,
    },
}

impl WordUnit {
    pub fn plain(root: impl Into<String>) -> Self {
        WordUnit::Plain { root: root.into() }
    }

    pub fn chorded(
        prefix: impl Into<String>,
        chord: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        WordUnit::Chorded {
            prefix: prefix.into(),
            chord: chord.into(),
            root: root.into(),
        }
    }

    /// The chord annotation on this unit, if any.
    pub fn chord(&self) -> Option<&str> {
        match self {
            WordUnit::Plain { .. } => None,
            WordUnit::Chorded { chord, .. } => Some(chord),
        }
    }

    /// Rebuild the source text this unit was taken from.
    ///
    /// Concatenating the source text of all units produced from one
    /// whitespace-delimited part gives back that part exactly.
    pub fn source_text(&self) -> String {
        match self {
            WordUnit::Plain { root } => root.clone(),
            WordUnit::Chorded {
                prefix,
                chord,
                root,
            } => format!("{}[{}]{}", prefix, chord, root),
        }
    }
}

/// A lyric line, in word order.
pub type LyricLine = Vec<WordUnit>;

/// A closed environment: its kind and the lyric lines collected inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentBlock {
    pub kind: String,
    pub lines: Vec<LyricLine>,
}

impl EnvironmentBlock {
    pub fn new(kind: impl Into<String>, lines: Vec<LyricLine>) -> Self {
        Self {
            kind: kind.into(),
            lines,
        }
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl Serialize for EnvironmentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.kind, &self.lines)?;
        map.end()
    }
}

/// A directive line such as `{comment: Slowly}` or `{new_page}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub label: Option<String>,
}

impl Directive {
    pub fn new(name: impl Into<String>, label: Option<String>) -> Self {
        Self {
            name: name.into(),
            label,
        }
    }

    /// The label, or `"not_specified"` when the directive had none.
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(NOT_SPECIFIED)
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, self.label_or_default())?;
        map.end()
    }
}

/// One entry of the song's reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureTag {
    Header,
    Directive,
    Environment(String),
}

impl StructureTag {
    pub fn as_str(&self) -> &str {
        match self {
            StructureTag::Header => "header",
            StructureTag::Directive => "directive",
            StructureTag::Environment(kind) => kind,
        }
    }
}

impl Serialize for StructureTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Distinct chord names in the order they first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ChordVocabulary(Vec<String>);

impl ChordVocabulary {
    /// Add a chord name. Returns false if it was already known.
    pub fn insert(&mut self, chord: &str) -> bool {
        if self.contains(chord) {
            return false;
        }
        self.0.push(chord.to_string());
        true
    }

    pub fn contains(&self, chord: &str) -> bool {
        self.0.iter().any(|c| c == chord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A parsed song.
///
/// Built once by the parser and not modified afterwards. `stanzas()`,
/// `choruses()` and `blocks_of()` are views over `environments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    pub header: BTreeMap<String, String>,
    pub structure: Vec<StructureTag>,
    pub environments: Vec<EnvironmentBlock>,
    pub chord_vocabulary: ChordVocabulary,
    pub directives: Vec<Directive>,
}

impl Song {
    /// Closed environments of the given kind, in song order.
    pub fn blocks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EnvironmentBlock> {
        self.environments.iter().filter(move |env| env.is_kind(kind))
    }

    /// Verse blocks.
    pub fn stanzas(&self) -> Vec<&EnvironmentBlock> {
        self.blocks_of(VERSE).collect()
    }

    /// Chorus blocks.
    pub fn choruses(&self) -> Vec<&EnvironmentBlock> {
        self.blocks_of(CHORUS).collect()
    }

    pub fn title(&self) -> Option<&str> {
        self.header.get("title").map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
            && self.structure.is_empty()
            && self.environments.is_empty()
            && self.chord_vocabulary.is_empty()
            && self.directives.is_empty()
    }
}

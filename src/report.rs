//! # Song Report
//!
//! Serializes a parsed [`Song`] into the structure renderers consume:
//!
//! ```text
//! header          { key: value }
//! structure       [ "header", "verse", "directive", "chorus", ... ]
//! stanzas         [ { verse: [ [word, ...], ... ] }, ... ]
//! choruses        [ { chorus: [ ... ] }, ... ]
//! environments    every closed block, in order
//! chordVocabulary [ "G", "C", ... ]
//! directives      [ { name: label }, ... ]
//! ```
//!
//! `stanzas` and `choruses` are filtered from `environments` at
//! serialization time; the song stores each block once.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::ast::{Directive, EnvironmentBlock, Song, StructureTag};
use crate::error::ChordProError;

/// Borrowed, serializable view of a song with its derived block lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongReport<'a> {
    pub header: &'a BTreeMap<String, String>,
    pub structure: &'a [StructureTag],
    pub stanzas: Vec<&'a EnvironmentBlock>,
    pub choruses: Vec<&'a EnvironmentBlock>,
    pub environments: &'a [EnvironmentBlock],
    pub chord_vocabulary: &'a [String],
    pub directives: &'a [Directive],
}

impl<'a> SongReport<'a> {
    pub fn new(song: &'a Song) -> Self {
        Self {
            header: &song.header,
            structure: &song.structure,
            stanzas: song.stanzas(),
            choruses: song.choruses(),
            environments: &song.environments,
            chord_vocabulary: song.chord_vocabulary.as_slice(),
            directives: &song.directives,
        }
    }
}

/// Report serialization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Render the report as YAML.
pub fn to_yaml(song: &Song) -> Result<String, ChordProError> {
    Ok(serde_yaml::to_string(&SongReport::new(song))?)
}

/// Render the report as compact JSON.
pub fn to_json(song: &Song) -> Result<String, ChordProError> {
    Ok(serde_json::to_string(&SongReport::new(song))?)
}

/// Render the report as indented JSON.
pub fn to_json_pretty(song: &Song) -> Result<String, ChordProError> {
    Ok(serde_json::to_string_pretty(&SongReport::new(song))?)
}

/// Render the report in the given format.
pub fn render(song: &Song, format: OutputFormat) -> Result<String, ChordProError> {
    match format {
        OutputFormat::Yaml => to_yaml(song),
        OutputFormat::Json => to_json_pretty(song),
    }
}

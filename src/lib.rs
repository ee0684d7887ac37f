pub mod ast;
pub mod error;
pub mod lexer;
pub mod lyrics;
pub mod parser;
pub mod report;

pub use ast::*;
pub use error::*;
pub use parser::{
    parse, parse_lines, parse_lines_with_options, parse_with_options, ParseOptions,
    UnterminatedPolicy,
};
pub use report::{render, to_json, to_json_pretty, to_yaml, OutputFormat, SongReport};

use std::fs;
use std::path::Path;

/// Read a song file as a list of lines, each stripped of surrounding whitespace.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, ChordProError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ChordProError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(source.lines().map(|line| line.trim().to_string()).collect())
}

/// Read and parse a song file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Song, ChordProError> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Read and parse a song file with custom options.
pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: ParseOptions,
) -> Result<Song, ChordProError> {
    let lines = read_lines(path)?;
    Ok(parse_lines_with_options(lines, options))
}

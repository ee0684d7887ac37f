//! # Error Types
//!
//! Parsing itself never fails: any line that is not a recognized construct is
//! kept as lyrics. Errors only come from the edges of the library, reading a
//! song file and serializing the report.
//!
//! ## Usage
//! ```rust,no_run
//! use chordpro::{parse_file, ChordProError};
//!
//! match parse_file("song.cho") {
//!     Ok(song) => println!("{} environments", song.environments.len()),
//!     Err(ChordProError::Io { path, source }) => {
//!         eprintln!("Cannot read {}: {}", path.display(), source);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChordProError {
    /// The song file could not be read.
    #[error("Error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be rendered as YAML.
    #[error("YAML output error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The report could not be rendered as JSON.
    ///
    /// # Example
    /// ```
    /// # use chordpro::ChordProError;
    /// let inner = serde_json::from_str::<u8>("x").unwrap_err();
    /// let err = ChordProError::from(inner);
    /// assert!(err.to_string().starts_with("JSON output error: "));
    /// ```
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

//! # Parser Module
//!
//! This module folds classified lines into a [`Song`].
//!
//! ## Purpose
//! The lexer decides what each line is on its own. The parser is the stateful
//! half: it tracks which environment is open, collects lyric lines into it, and
//! emits the finished block when the environment closes.
//!
//! ## Fold State
//! [`FoldState`] holds everything that survives from one line to the next:
//! - `open` - whether an environment is currently open
//! - `kind` - the kind of the open environment
//! - `buffer` - lyric lines collected since the environment opened
//!
//! [`FoldState::step`] consumes the state and one token and returns the next
//! state plus at most one [`Emission`]. [`Assembler`] applies emissions to the
//! song being built, so the transition table can be tested without it.
//!
//! ## Transitions
//! | Token | Effect |
//! |---|---|
//! | header | set header entry, record `header` in the structure once |
//! | start | open `kind`, discard the buffer |
//! | divider, nothing open | open `kind` (always `verse`), discard the buffer |
//! | divider, open with lines | close the current block, stay open for the next one of the same kind |
//! | divider, open and empty | nothing |
//! | end | close, emitting the buffer under the end marker's kind |
//! | directive | record it |
//! | lyrics | tokenize and append to the buffer, whether or not anything is open |
//!
//! An environment still open at end of input is dropped unless
//! [`UnterminatedPolicy::Close`] is selected.
//!
//! ## Example
//! ```rust
//! use chordpro::parse;
//!
//! let song = parse("{title: Test}\n{soc}\nHello [C]world\n{eoc}\n");
//!
//! assert_eq!(song.title(), Some("Test"));
//! assert_eq!(song.choruses().len(), 1);
//! assert_eq!(song.chord_vocabulary.as_slice(), ["C".to_string()]);
//! ```
//!
//! ## Related Modules
//! - `lexer` - Provides the tokens to fold
//! - `lyrics` - Tokenizes lyric lines
//! - `ast` - Defines the `Song` being built

use crate::ast::{Directive, EnvironmentBlock, LyricLine, Song, StructureTag};
use crate::lexer::{classify_lines, EnvironmentStatus, Token};
use crate::lyrics::tokenize_line;

/// What to do with an environment that is still open when the input ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnterminatedPolicy {
    /// Discard its lines.
    #[default]
    Drop,
    /// Close it and keep it as the last block, if it has any lines.
    Close,
}

/// Parser configuration
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub unterminated: UnterminatedPolicy,
}

/// State carried between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    pub open: bool,
    pub kind: Option<String>,
    pub buffer: Vec<LyricLine>,
}

/// Output produced by a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Header { key: String, value: String },
    Block(EnvironmentBlock),
    Directive(Directive),
    /// Chord names used on a lyric line, in order (may repeat).
    Chords(Vec<String>),
}

impl FoldState {
    /// Apply one token.
    pub fn step(mut self, token: Token) -> (Self, Option<Emission>) {
        let emission = match token {
            Token::Header { key, value } => Some(Emission::Header { key, value }),
            Token::Directive { name, label } => {
                Some(Emission::Directive(Directive::new(name, label)))
            }
            Token::Environment { status, kind } => self.environment(status, kind),
            Token::Lyrics(text) => {
                let line = tokenize_line(&text);
                let chords: Vec<String> = line
                    .iter()
                    .filter_map(|unit| unit.chord())
                    .map(str::to_string)
                    .collect();
                self.buffer.push(line);
                (!chords.is_empty()).then_some(Emission::Chords(chords))
            }
        };
        (self, emission)
    }

    fn environment(&mut self, status: EnvironmentStatus, kind: String) -> Option<Emission> {
        match status {
            EnvironmentStatus::Start => {
                if !self.buffer.is_empty() {
                    log::debug!(
                        "Discarding {} unterminated line(s) before {}",
                        self.buffer.len(),
                        kind
                    );
                }
                log::debug!("Opening {}", kind);
                self.open(kind);
                None
            }
            EnvironmentStatus::Divider if !self.open => {
                log::debug!("Opening {}", kind);
                self.open(kind);
                None
            }
            EnvironmentStatus::Divider if self.buffer.is_empty() => None,
            EnvironmentStatus::Divider => {
                let current = self.kind.clone().unwrap_or(kind);
                log::debug!("Continuing into another {}", current);
                Some(Emission::Block(self.take_block(current)))
            }
            EnvironmentStatus::End => {
                log::debug!("Closing {}", kind);
                self.open = false;
                Some(Emission::Block(self.take_block(kind)))
            }
            EnvironmentStatus::Other(status) => {
                log::debug!("Ignoring unknown environment status '{}' for {}", status, kind);
                None
            }
        }
    }

    fn open(&mut self, kind: String) {
        self.open = true;
        self.kind = Some(kind);
        self.buffer.clear();
    }

    fn take_block(&mut self, kind: String) -> EnvironmentBlock {
        EnvironmentBlock::new(kind, std::mem::take(&mut self.buffer))
    }

    /// Handle end of input. Returns the block to keep, if any.
    pub fn finish(mut self, policy: UnterminatedPolicy) -> Option<EnvironmentBlock> {
        if self.buffer.is_empty() {
            return None;
        }
        let kind = match (self.open, self.kind.take()) {
            (true, Some(kind)) => kind,
            _ => {
                log::debug!(
                    "Dropping {} lyric line(s) outside any environment",
                    self.buffer.len()
                );
                return None;
            }
        };

        match policy {
            UnterminatedPolicy::Drop => {
                log::warn!(
                    "Unterminated {} with {} line(s) dropped at end of input",
                    kind,
                    self.buffer.len()
                );
                None
            }
            UnterminatedPolicy::Close => {
                log::debug!("Closing unterminated {} at end of input", kind);
                Some(self.take_block(kind))
            }
        }
    }
}

/// Builds a [`Song`] from a token sequence.
#[derive(Debug, Default)]
pub struct Assembler {
    state: FoldState,
    song: Song,
    options: ParseOptions,
}

impl Assembler {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The state between lines, for inspection.
    pub fn state(&self) -> &FoldState {
        &self.state
    }

    pub fn feed(&mut self, token: Token) {
        let (state, emission) = std::mem::take(&mut self.state).step(token);
        self.state = state;
        if let Some(emission) = emission {
            self.apply(emission);
        }
    }

    fn apply(&mut self, emission: Emission) {
        let song = &mut self.song;
        match emission {
            Emission::Header { key, value } => {
                song.header.insert(key, value);
                if !song.structure.contains(&StructureTag::Header) {
                    song.structure.push(StructureTag::Header);
                }
            }
            Emission::Block(block) => {
                song.structure
                    .push(StructureTag::Environment(block.kind.clone()));
                song.environments.push(block);
            }
            Emission::Directive(directive) => {
                song.directives.push(directive);
                song.structure.push(StructureTag::Directive);
            }
            Emission::Chords(chords) => {
                for chord in &chords {
                    song.chord_vocabulary.insert(chord);
                }
            }
        }
    }

    /// End the pass and return the finished song.
    pub fn finish(mut self) -> Song {
        let state = std::mem::take(&mut self.state);
        if let Some(block) = state.finish(self.options.unterminated) {
            self.apply(Emission::Block(block));
        }
        self.song
    }
}

/// Parse already-stripped lines with the given options.
pub fn parse_lines_with_options<I, S>(lines: I, options: ParseOptions) -> Song
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assembler = Assembler::new(options);
    for located in classify_lines(lines) {
        assembler.feed(located.token);
    }
    assembler.finish()
}

/// Parse already-stripped lines.
pub fn parse_lines<I, S>(lines: I) -> Song
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_lines_with_options(lines, ParseOptions::default())
}

/// Parse ChordPro source text with the given options.
/// Each line is stripped of surrounding whitespace first.
pub fn parse_with_options(source: &str, options: ParseOptions) -> Song {
    parse_lines_with_options(source.lines().map(str::trim), options)
}

/// Parse ChordPro source text.
pub fn parse(source: &str) -> Song {
    parse_with_options(source, ParseOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{WordUnit, CHORUS, TABULATURE, VERSE};

    fn env(status: EnvironmentStatus, kind: &str) -> Token {
        Token::Environment {
            status,
            kind: kind.to_string(),
        }
    }

    fn lyrics(text: &str) -> Token {
        Token::Lyrics(text.to_string())
    }

    fn tags(song: &Song) -> Vec<&str> {
        song.structure.iter().map(StructureTag::as_str).collect()
    }

    #[test]
    fn test_step_start_opens_and_clears() {
        let state = FoldState {
            buffer: vec![vec![WordUnit::plain("stray")]],
            ..FoldState::default()
        };
        let (state, emission) = state.step(env(EnvironmentStatus::Start, CHORUS));
        assert!(emission.is_none());
        assert!(state.open);
        assert_eq!(state.kind.as_deref(), Some(CHORUS));
        assert!(state.buffer.is_empty());
    }

    #[test]
    fn test_step_divider_when_closed_opens_verse() {
        let (state, emission) = FoldState::default().step(env(EnvironmentStatus::Divider, VERSE));
        assert!(emission.is_none());
        assert!(state.open);
        assert_eq!(state.kind.as_deref(), Some(VERSE));
    }

    #[test]
    fn test_step_divider_when_open_and_empty_is_noop() {
        let (state, _) = FoldState::default().step(env(EnvironmentStatus::Divider, VERSE));
        let before = state.clone();
        let (state, emission) = state.step(env(EnvironmentStatus::Divider, VERSE));
        assert!(emission.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_step_divider_when_open_closes_and_continues() {
        let (state, _) = FoldState::default().step(env(EnvironmentStatus::Start, CHORUS));
        let (state, _) = state.step(lyrics("la la"));
        let (state, emission) = state.step(env(EnvironmentStatus::Divider, VERSE));

        // The block keeps the kind of the open environment
        assert_eq!(
            emission,
            Some(Emission::Block(EnvironmentBlock::new(
                CHORUS,
                vec![vec![WordUnit::plain("la"), WordUnit::plain("la")]]
            )))
        );
        assert!(state.open);
        assert_eq!(state.kind.as_deref(), Some(CHORUS));
        assert!(state.buffer.is_empty());
    }

    #[test]
    fn test_step_end_closes_under_end_kind() {
        let (state, _) = FoldState::default().step(lyrics("orphan"));
        let (state, emission) = state.step(env(EnvironmentStatus::End, TABULATURE));
        assert!(!state.open);
        assert!(state.buffer.is_empty());
        match emission {
            Some(Emission::Block(block)) => {
                assert_eq!(block.kind, TABULATURE);
                assert_eq!(block.lines.len(), 1);
            }
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_step_lyrics_reports_chords() {
        let (state, emission) = FoldState::default().step(lyrics("[G]A[C]ma[G]zing"));
        assert_eq!(
            emission,
            Some(Emission::Chords(vec![
                "G".to_string(),
                "C".to_string(),
                "G".to_string()
            ]))
        );
        assert_eq!(state.buffer.len(), 1);

        let (_, emission) = state.step(lyrics("no chords here"));
        assert!(emission.is_none());
    }

    #[test]
    fn test_step_unknown_status_is_ignored() {
        let (state, _) = FoldState::default().step(env(EnvironmentStatus::Start, VERSE));
        let (state, _) = state.step(lyrics("line"));
        let before = state.clone();
        let (state, emission) =
            state.step(env(EnvironmentStatus::Other("middle".to_string()), "song"));
        assert!(emission.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_chorus_scenario() {
        let song = parse_lines(["{title: Test}", "{soc}", "Hello [C]world", "{eoc}"]);

        assert_eq!(song.header.get("title").map(String::as_str), Some("Test"));
        assert_eq!(
            song.environments,
            vec![EnvironmentBlock::new(
                CHORUS,
                vec![vec![
                    WordUnit::plain("Hello"),
                    WordUnit::chorded("", "C", "world")
                ]]
            )]
        );
        assert_eq!(song.chord_vocabulary.as_slice(), ["C".to_string()]);
        assert_eq!(tags(&song), vec!["header", "chorus"]);
        assert_eq!(song.choruses().len(), 1);
        assert!(song.stanzas().is_empty());
    }

    #[test]
    fn test_chorus_with_n_lines() {
        let song = parse_lines(["{soc}", "one", "two", "three", "{eoc}"]);
        assert_eq!(song.environments.len(), 1);
        assert_eq!(song.environments[0].lines.len(), 3);
        assert_eq!(tags(&song).iter().filter(|t| **t == "chorus").count(), 1);
    }

    #[test]
    fn test_tablature_goes_through_lyric_path() {
        let song = parse_lines(["{sot}", "tab line one", "{eot}"]);
        assert_eq!(
            song.environments,
            vec![EnvironmentBlock::new(
                TABULATURE,
                vec![vec![
                    WordUnit::plain("tab"),
                    WordUnit::plain("line"),
                    WordUnit::plain("one")
                ]]
            )]
        );
        assert!(song.stanzas().is_empty());
        assert!(song.choruses().is_empty());
    }

    #[test]
    fn test_blank_lines_split_verses() {
        let song = parse_lines(["", "first verse", "", "second verse", ""]);
        assert_eq!(song.stanzas().len(), 2);
        assert_eq!(tags(&song), vec!["verse", "verse"]);
    }

    #[test]
    fn test_repeated_blank_lines_are_noise() {
        let song = parse_lines(["", "", "", "verse", "", "", ""]);
        assert_eq!(song.environments.len(), 1);
    }

    #[test]
    fn test_header_recorded_once() {
        let song = parse_lines(["{title: A}", "{artist: B}", "{comment}", "{key: G}"]);
        assert_eq!(tags(&song), vec!["header", "directive"]);
        assert_eq!(song.header.len(), 3);
    }

    #[test]
    fn test_header_last_write_wins() {
        let song = parse_lines(["{title: First}", "{title: Second}"]);
        assert_eq!(song.title(), Some("Second"));
        assert_eq!(song.header.len(), 1);
    }

    #[test]
    fn test_blank_metadata_value_stays_in_header() {
        let song = parse_lines(["{title: }"]);
        assert_eq!(song.header.get("title").map(String::as_str), Some(" "));
        assert!(song.directives.is_empty());
        assert_eq!(tags(&song), vec!["header"]);
    }

    #[test]
    fn test_directives() {
        let song = parse_lines(["{comment}", "{comment: nice job}"]);
        assert_eq!(
            song.directives,
            vec![
                Directive::new("comment", None),
                Directive::new("comment", Some("nice job".to_string())),
            ]
        );
        assert_eq!(song.directives[0].label_or_default(), "not_specified");
        assert_eq!(tags(&song), vec!["directive", "directive"]);
    }

    #[test]
    fn test_chord_vocabulary_dedupes_across_lines() {
        let song = parse_lines([
            "",
            "[G]Amazing [C]grace",
            "how [G]sweet the [D]sound",
            "that [G]saved a [Em]wretch",
            "",
        ]);
        assert_eq!(
            song.chord_vocabulary.iter().collect::<Vec<_>>(),
            vec!["G", "C", "D", "Em"]
        );
    }

    #[test]
    fn test_unterminated_environment_is_dropped() {
        let song = parse_lines(["{soc}", "never closed"]);
        assert!(song.environments.is_empty());
        assert!(song.structure.is_empty());
    }

    #[test]
    fn test_unterminated_environment_can_be_closed() {
        let options = ParseOptions {
            unterminated: UnterminatedPolicy::Close,
        };
        let song = parse_lines_with_options(["{soc}", "never [A]closed"], options.clone());
        assert_eq!(song.choruses().len(), 1);
        assert_eq!(tags(&song), vec!["chorus"]);

        // Nothing open, nothing to close
        let song = parse_lines_with_options(["{soc}", "x", "{eoc}", "after"], options);
        assert_eq!(song.environments.len(), 1);
    }

    #[test]
    fn test_lyrics_before_first_divider_are_lost() {
        // A divider with nothing open discards what was collected
        let song = parse_lines(["orphan line", "", "verse line", ""]);
        assert_eq!(song.environments.len(), 1);
        assert_eq!(
            song.environments[0].lines,
            vec![vec![WordUnit::plain("verse"), WordUnit::plain("line")]]
        );
    }

    #[test]
    fn test_empty_input() {
        let song = parse_lines(Vec::<String>::new());
        assert!(song.is_empty());
        assert_eq!(song, Song::default());
    }

    #[test]
    fn test_parse_strips_lines() {
        let song = parse("  {title: Padded}  \r\n\t{soc}\n   Hello   [C]world  \n{eoc}\n");
        assert_eq!(song.title(), Some("Padded"));
        assert_eq!(song.choruses().len(), 1);
        assert_eq!(song.environments[0].lines[0].len(), 2);
    }

    #[test]
    fn test_assembler_exposes_state() {
        let mut assembler = Assembler::new(ParseOptions::default());
        assembler.feed(env(EnvironmentStatus::Start, VERSE));
        assembler.feed(lyrics("one"));
        assert!(assembler.state().open);
        assert_eq!(assembler.state().buffer.len(), 1);
        let song = assembler.finish();
        assert!(song.environments.is_empty());
    }
}

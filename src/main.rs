use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use chordpro::{OutputFormat, ParseOptions, UnterminatedPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Parse a ChordPro song file and print its structure.
#[derive(Parser)]
#[command(name = "chordpro", version, about)]
struct Cli {
    /// Path to the ChordPro source file
    input: PathBuf,

    /// Output format
    #[arg(long, short, default_value = "yaml", value_enum)]
    format: Format,

    /// Keep an environment that is still open at end of file instead of dropping it
    #[arg(long)]
    close_unterminated: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG is used otherwise.
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ParseOptions {
        unterminated: if cli.close_unterminated {
            UnterminatedPolicy::Close
        } else {
            UnterminatedPolicy::Drop
        },
    };

    log::info!("Parsing {}", cli.input.display());
    let song = match chordpro::parse_file_with_options(&cli.input, options) {
        Ok(song) => song,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match chordpro::render(&song, cli.format.into()) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

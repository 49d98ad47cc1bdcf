use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use log::debug;

use pgn_expander_lib::{expand_file, ExpandOptions, ExpandSummary, Result};

#[derive(Parser, Debug)]
#[command(name = "pgn-expander")]
#[command(about = "Expand PGN variations into separate complete games.")]
#[command(after_help = "Example: pgn-expander input.pgn -o output.pgn")]
struct Cli {
    /// Input PGN file with variations
    input: PathBuf,

    /// Output PGN file
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file with expand options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not continue lines that transpose into the primary line
    #[arg(long)]
    no_merge: bool,

    /// Drop move comments from the output
    #[arg(long)]
    strip_comments: bool,

    /// Drop NAGs from the output
    #[arg(long)]
    strip_nags: bool,

    /// Maximum number of games generated from one source game
    #[arg(long)]
    max_paths: Option<usize>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Result<ExpandOptions> {
        let mut options = match &self.config {
            Some(path) => ExpandOptions::from_json_file(path)?,
            None => ExpandOptions::default(),
        };
        if self.no_merge {
            options.merge_transpositions = false;
        }
        options.strip_comments |= self.strip_comments;
        options.strip_nags |= self.strip_nags;
        if self.max_paths.is_some() {
            options.max_paths_per_game = self.max_paths;
        }
        Ok(options)
    }

    fn run(&self) -> Result<ExpandSummary> {
        let options = self.options()?;
        debug!("Running with {:?}", options);
        expand_file(&self.input, &self.output, &options)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.run() {
        Ok(summary) => {
            println!("Successfully expanded variations.");
            println!("Input: {}", cli.input.display());
            println!("Output: {}", cli.output.display());
            println!("Games written: {}", summary.games_written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

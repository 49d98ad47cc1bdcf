//! Reads source games, expands each one and writes the results.
//!
//! Games are processed one at a time in input order. The lines of a game are
//! written contiguously in enumeration order. A game without moves is passed
//! through unchanged. A record with unreadable moves is expanded from the
//! moves read before the problem; only I/O failures stop the run.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::ExpandOptions,
    error::{Error, Result},
    expand::{materialize, PathEnumerator},
    pgn::{PgnGames, PgnWriter},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandSummary {
    pub games_read: usize,
    pub games_written: usize,
    /// Source games without moves, written as they were.
    pub passed_through: usize,
    /// Lines that inherited moves from their game's primary line.
    pub merged_paths: usize,
    /// Lines dropped by `max_paths_per_game`.
    pub paths_skipped: usize,
    /// Source games cut short by an unplayable move or a bad `FEN` header.
    pub games_with_errors: usize,
}

pub fn expand_reader<R: Read, W: Write>(
    input: R,
    output: W,
    options: &ExpandOptions,
) -> Result<ExpandSummary> {
    let mut summary = ExpandSummary::default();
    let mut writer = PgnWriter::new(output);

    for game in PgnGames::new(input) {
        let game = game?;
        summary.games_read += 1;
        if !game.errors.is_empty() {
            warn!(
                "Game #{} was only partly read ({}), expanding the moves before the problem",
                summary.games_read,
                game.errors.join("; ")
            );
            summary.games_with_errors += 1;
        }

        let mut paths = PathEnumerator::new(&game.tree, options.merge_transpositions);
        let limit = options.max_paths_per_game.unwrap_or(usize::MAX);
        let mut emitted = 0;
        while emitted < limit {
            let Some(path) = paths.next() else {
                break;
            };
            if path.is_merged() {
                debug!(
                    "Game #{}: line {} inherits {}",
                    summary.games_read,
                    emitted + 1,
                    game.tree.san_line(path.inherited()).join(" ")
                );
                summary.merged_paths += 1;
            }
            writer.write_game(&materialize(&game, &path, options))?;
            emitted += 1;
        }

        let skipped = paths.count();
        if skipped > 0 {
            warn!(
                "Game #{} has {} more lines than the limit of {}, skipping them",
                summary.games_read, skipped, limit
            );
            summary.paths_skipped += skipped;
        }

        if emitted == 0 && skipped == 0 {
            debug!("Game #{} has no moves, passing it through", summary.games_read);
            writer.write_game(&game)?;
            summary.passed_through += 1;
        } else {
            debug!("Game #{}: wrote {} lines", summary.games_read, emitted);
        }
    }

    writer.flush()?;
    summary.games_written = writer.games_written();
    info!(
        "Expanded {} games into {} ({} merged, {} passed through, {} with errors)",
        summary.games_read,
        summary.games_written,
        summary.merged_paths,
        summary.passed_through,
        summary.games_with_errors
    );
    Ok(summary)
}

/// Expands `input` into `output`. A missing input is reported before the
/// output file is created.
pub fn expand_file(input: &Path, output: &Path, options: &ExpandOptions) -> Result<ExpandSummary> {
    if !input.exists() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }
    info!("Expanding {} into {}", input.display(), output.display());
    let source = File::open(input)?;
    let sink = BufWriter::new(File::create(output)?);
    expand_reader(source, sink, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(pgn: &str, options: &ExpandOptions) -> (String, ExpandSummary) {
        let mut out = Vec::new();
        let summary = expand_reader(pgn.as_bytes(), &mut out, options).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn writes_one_game_per_line() {
        let (text, summary) = expand(
            "[Event \"Test\"]\n\n1. e4 (1. Nf3 Nf6 2. Ng1 Ng8 3. e4) e5 *\n",
            &ExpandOptions::default(),
        );
        assert_eq!(
            text,
            "[Event \"Test\"]\n\n1. e4 e5 *\n\n\
             [Event \"Test\"]\n\n1. Nf3 Nf6 2. Ng1 Ng8 3. e4 e5 *\n\n"
        );
        assert_eq!(summary.games_read, 1);
        assert_eq!(summary.games_written, 2);
        assert_eq!(summary.merged_paths, 1);
    }

    #[test]
    fn empty_game_is_passed_through() {
        let (text, summary) = expand(
            "[Event \"Empty\"]\n[Result \"*\"]\n\n{Nothing yet} *\n",
            &ExpandOptions::default(),
        );
        assert_eq!(text, "[Event \"Empty\"]\n[Result \"*\"]\n\n{ Nothing yet } *\n\n");
        assert_eq!(summary.games_written, 1);
        assert_eq!(summary.passed_through, 1);
    }

    #[test]
    fn games_stay_in_input_order() {
        let (text, summary) = expand(
            "[Event \"A\"]\n\n1. e4 (1. d4) *\n\n[Event \"B\"]\n\n1. c4 *\n",
            &ExpandOptions::default(),
        );
        let events: Vec<_> = text
            .lines()
            .filter(|line| line.starts_with("[Event"))
            .collect();
        assert_eq!(events, vec!["[Event \"A\"]", "[Event \"A\"]", "[Event \"B\"]"]);
        assert_eq!(summary.games_written, 3);
    }

    #[test]
    fn path_limit_skips_the_rest() {
        let options = ExpandOptions {
            max_paths_per_game: Some(2),
            ..ExpandOptions::default()
        };
        let (text, summary) = expand("1. e4 (1. d4) (1. c4) (1. Nf3) *", &options);
        assert_eq!(text, "1. e4 *\n\n1. d4 *\n\n");
        assert_eq!(summary.paths_skipped, 2);
    }

    #[test]
    fn unplayable_move_does_not_stop_later_games() {
        let (text, summary) = expand(
            "1. e4 e5 2. Ke3 *\n\n1. d4 (1. c4) *\n",
            &ExpandOptions::default(),
        );
        assert_eq!(text, "1. e4 e5 *\n\n1. d4 *\n\n1. c4 *\n\n");
        assert_eq!(summary.games_read, 2);
        assert_eq!(summary.games_written, 3);
        assert_eq!(summary.games_with_errors, 1);
    }

    #[test]
    fn bad_fen_game_is_passed_through() {
        let (text, summary) = expand(
            "[FEN \"not a fen\"]\n\n1. e4 *\n\n1. d4 *\n",
            &ExpandOptions::default(),
        );
        assert_eq!(text, "[FEN \"not a fen\"]\n\n*\n\n1. d4 *\n\n");
        assert_eq!(summary.passed_through, 1);
        assert_eq!(summary.games_with_errors, 1);
    }

    #[test]
    fn missing_input_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pgn");
        let err = expand_file(
            &dir.path().join("missing.pgn"),
            &output,
            &ExpandOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
        assert!(!output.exists());
    }
}

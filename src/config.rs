//! Runtime options for variation expansion.
//!
//! Options can be loaded from a JSON file and then overridden from the
//! command line. Every field has a default, so a partial file is fine.

use std::path::Path;

use derivative::Derivative;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Knobs controlling how a source game is turned into linear games.
#[derive(Serialize, Deserialize, Debug, Clone, Derivative, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
#[derivative(Default)]
pub struct ExpandOptions {
    /// Splice a variation that ends early onto the primary line when both
    /// reach the same position.
    #[derivative(Default(value = "true"))]
    pub merge_transpositions: bool,
    pub strip_comments: bool,
    pub strip_nags: bool,
    /// Upper bound on linear games emitted per source game.
    pub max_paths_per_game: Option<usize>,
}

impl ExpandOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let options: ExpandOptions = serde_json::from_str(&text)?;
        info!("Loaded expand options from {}: {:?}", path.display(), options);
        Ok(options)
    }
}

//! Difficulty presets mapping capture folders to board layouts.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Board layout and mine total for one difficulty level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: String,
    pub mine_count: u32,
    pub width: i32,
    pub height: i32,
}

impl Difficulty {
    /// Folder names recognized by [`Self::from_level`], in processing order.
    pub const LEVELS: &'static [&'static str] = &["hard", "evil"];

    pub fn hard() -> Self {
        Self {
            level: "hard".to_string(),
            mine_count: 99,
            width: 30,
            height: 16,
        }
    }

    pub fn evil() -> Self {
        Self {
            level: "evil".to_string(),
            mine_count: 130,
            width: 30,
            height: 20,
        }
    }

    /// Resolve a capture-folder name to its difficulty preset.
    pub fn from_level(level: &str) -> Result<Self> {
        match level {
            "hard" => Ok(Self::hard()),
            "evil" => Ok(Self::evil()),
            other => bail!("unrecognized difficulty level: {other}"),
        }
    }
}

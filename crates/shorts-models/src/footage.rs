//! Background gameplay footage identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Game whose footage loops behind the primary clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundGame {
    SubwaySurfers,
    TempleRun,
    GeometryDash,
}

impl BackgroundGame {
    pub const ALL: &'static [BackgroundGame] = &[
        BackgroundGame::SubwaySurfers,
        BackgroundGame::TempleRun,
        BackgroundGame::GeometryDash,
    ];

    /// Name used for directories and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundGame::SubwaySurfers => "subway_surfers",
            BackgroundGame::TempleRun => "temple_run",
            BackgroundGame::GeometryDash => "geometry_dash",
        }
    }
}

impl fmt::Display for BackgroundGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundGame {
    type Err = GameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|game| game.as_str() == key)
            .ok_or_else(|| GameParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown background game: {0}")]
pub struct GameParseError(String);

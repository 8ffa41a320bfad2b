//! Letter grades derived from trust scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade for a score in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Map a score to a grade: A >= 0.85, B >= 0.70, C >= 0.55, D >= 0.40, else F
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.85 => Grade::A,
            s if s >= 0.70 => Grade::B,
            s if s >= 0.55 => Grade::C,
            s if s >= 0.40 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

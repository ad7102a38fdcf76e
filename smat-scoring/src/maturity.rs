//! Maturity level classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal maturity level, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityLevel {
    Resist,
    Comply,
    Optimize,
    Reinvent,
    Lead,
}

impl MaturityLevel {
    pub const ALL: [MaturityLevel; 5] = [
        MaturityLevel::Resist,
        MaturityLevel::Comply,
        MaturityLevel::Optimize,
        MaturityLevel::Reinvent,
        MaturityLevel::Lead,
    ];

    /// Classify an average score
    ///
    /// Brackets are closed at the lower bound: 2.0 is comply, 3.0 optimize,
    /// 4.0 reinvent, and anything from 5.0 up is lead.
    pub fn from_score(score: f64) -> Self {
        if score < 2.0 {
            MaturityLevel::Resist
        } else if score < 3.0 {
            MaturityLevel::Comply
        } else if score < 4.0 {
            MaturityLevel::Optimize
        } else if score < 5.0 {
            MaturityLevel::Reinvent
        } else {
            MaturityLevel::Lead
        }
    }

    /// Lowercase key used by the recommendations file
    pub fn as_str(self) -> &'static str {
        match self {
            MaturityLevel::Resist => "resist",
            MaturityLevel::Comply => "comply",
            MaturityLevel::Optimize => "optimize",
            MaturityLevel::Reinvent => "reinvent",
            MaturityLevel::Lead => "lead",
        }
    }

    /// Capitalized label shown in reports
    pub fn title(self) -> &'static str {
        match self {
            MaturityLevel::Resist => "Resist",
            MaturityLevel::Comply => "Comply",
            MaturityLevel::Optimize => "Optimize",
            MaturityLevel::Reinvent => "Reinvent",
            MaturityLevel::Lead => "Lead",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for MaturityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resist" => Ok(MaturityLevel::Resist),
            "comply" => Ok(MaturityLevel::Comply),
            "optimize" => Ok(MaturityLevel::Optimize),
            "reinvent" => Ok(MaturityLevel::Reinvent),
            "lead" => Ok(MaturityLevel::Lead),
            other => Err(format!("unknown maturity level '{}'", other)),
        }
    }
}

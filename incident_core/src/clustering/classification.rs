//! Incident classification by participant count.

use serde::{Deserialize, Serialize};

/// What kind of engagement an incident was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentType {
    Nothing,
    Fight,
    Skirmish,
    Battle,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Nothing => "nothing",
            IncidentType::Fight => "fight",
            IncidentType::Skirmish => "skirmish",
            IncidentType::Battle => "battle",
        }
    }
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size of an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Not an engagement at all.
    False,
    Tiny,
    Medium,
    Large,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::False => "false",
            Scale::Tiny => "tiny",
            Scale::Medium => "medium",
            Scale::Large => "large",
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds (inclusive) on participant count for each incident type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_fight: usize,
    pub min_skirmish: usize,
    pub min_battle: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_fight: 2,
            min_skirmish: 4,
            min_battle: 30,
        }
    }
}

/// Type and scale of a finished incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: IncidentType,
    pub scale: Scale,
}

impl Classification {
    /// Classify by participant count. Each range includes its lower bound.
    pub fn for_participants(count: usize, thresholds: &Thresholds) -> Self {
        let (kind, scale) = if count >= thresholds.min_battle {
            (IncidentType::Battle, Scale::Large)
        } else if count >= thresholds.min_skirmish {
            (IncidentType::Skirmish, Scale::Medium)
        } else if count >= thresholds.min_fight {
            (IncidentType::Fight, Scale::Tiny)
        } else {
            (IncidentType::Nothing, Scale::False)
        };
        Self { kind, scale }
    }
}

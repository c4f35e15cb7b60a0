//! Session type and location enums as the single source of truth for their labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class format, taken from the parenthesized tag in an event title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Lecture,
    Lab,
    ELearningExercise,
    Unknown,
}

impl SessionType {
    /// Every variant, in report order.
    pub const ALL: [Self; 4] = [
        Self::Lecture,
        Self::Lab,
        Self::ELearningExercise,
        Self::Unknown,
    ];

    /// Maps a tag (without parentheses) to a session type.
    ///
    /// Matching is case-insensitive. Returns `None` for codes that are not
    /// recognized so callers can keep looking at other parenthesized groups.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().as_str() {
            "W" | "E-W" => Some(Self::Lecture),
            "L" | "ĆW" | "CW" => Some(Self::Lab),
            "E-CW" | "E-ĆW" => Some(Self::ELearningExercise),
            _ => None,
        }
    }

    /// String representation used in machine-readable output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Lab => "lab",
            Self::ELearningExercise => "e_learning_exercise",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label including the canonical tag.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Lecture => "Lectures (W)",
            Self::Lab => "Labs (L)",
            Self::ELearningExercise => "E-learning exercises (E-CW)",
            Self::Unknown => "Other/unclassified",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a session takes place.
///
/// Anything that does not name one of the two remote platforms is assumed to
/// happen on campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    RemoteTeams,
    RemoteMoodle,
    OnCampus,
}

impl LocationCategory {
    /// Every variant, in report order.
    pub const ALL: [Self; 3] = [Self::RemoteTeams, Self::RemoteMoodle, Self::OnCampus];

    /// Classifies free location text by platform keyword.
    ///
    /// "teams" wins over "moodle" when both appear.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("teams") {
            Self::RemoteTeams
        } else if lower.contains("moodle") {
            Self::RemoteMoodle
        } else {
            Self::OnCampus
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteTeams | Self::RemoteMoodle)
    }

    /// String representation used in machine-readable output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteTeams => "remote_teams",
            Self::RemoteMoodle => "remote_moodle",
            Self::OnCampus => "on_campus",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RemoteTeams => "Platforma Teams",
            Self::RemoteMoodle => "Platforma Moodle",
            Self::OnCampus => "On campus",
        }
    }
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

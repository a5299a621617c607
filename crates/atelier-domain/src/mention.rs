//! Mention banding: the five-level ordinal label derived from a
//! 0-100 global score.
//!
//! The labels are the French wire/display values used across the
//! platform (evaluator output, feedback rows, certificates).

use serde::{Deserialize, Serialize};

/// Ordinal banding of a 0-100 score.
///
/// | score  | mention      |
/// |--------|--------------|
/// | 0-49   | Insuffisant  |
/// | 50-64  | Satisfaisant |
/// | 65-74  | Bien         |
/// | 75-89  | Très bien    |
/// | 90-100 | Excellent    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mention {
    /// Score 0-49.
    Insufficient,
    /// Score 50-64.
    Satisfactory,
    /// Score 65-74.
    Good,
    /// Score 75-89.
    VeryGood,
    /// Score 90-100.
    Excellent,
}

impl Mention {
    /// Derives the mention band for a global score.
    ///
    /// Scores above 100 are clamped into the top band; the scoring
    /// gateway rejects them before they reach this point.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_domain::Mention;
    ///
    /// assert_eq!(Mention::from_score(49), Mention::Insufficient);
    /// assert_eq!(Mention::from_score(90), Mention::Excellent);
    /// ```
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=49 => Self::Insufficient,
            50..=64 => Self::Satisfactory,
            65..=74 => Self::Good,
            75..=89 => Self::VeryGood,
            _ => Self::Excellent,
        }
    }

    /// The French label used on the wire and in certificates.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Insufficient => "Insuffisant",
            Self::Satisfactory => "Satisfaisant",
            Self::Good => "Bien",
            Self::VeryGood => "Très bien",
            Self::Excellent => "Excellent",
        }
    }

    /// Parses a French label back into a `Mention`.
    fn from_label(s: &str) -> Option<Self> {
        match s {
            "Insuffisant" => Some(Self::Insufficient),
            "Satisfaisant" => Some(Self::Satisfactory),
            "Bien" => Some(Self::Good),
            "Très bien" => Some(Self::VeryGood),
            "Excellent" => Some(Self::Excellent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Mention {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Mention {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_label(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid mention '{s}': expected one of 'Insuffisant', 'Satisfaisant', 'Bien', 'Très bien', 'Excellent'"
            ))
        })
    }
}

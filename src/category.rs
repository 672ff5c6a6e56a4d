// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! The fixed category vocabulary for image triage

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::PicsortError;

/// One of the five triage categories.
///
/// The set is closed: categories are not configurable and nothing in the
/// application adds or renames them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    TextHeavy,
    VisualHeavy,
    FormattingLayouts,
    TextVisualCombo,
    Exercises,
}

impl Category {
    /// All categories in display order (first button row of three,
    /// second row of two).
    pub const ALL: [Category; 5] = [
        Category::TextHeavy,
        Category::VisualHeavy,
        Category::FormattingLayouts,
        Category::TextVisualCombo,
        Category::Exercises,
    ];

    /// Stable identifier, used as the directory name inside the archive
    /// and as the URL path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::TextHeavy => "text_heavy",
            Category::VisualHeavy => "visual_heavy",
            Category::FormattingLayouts => "formatting_layouts",
            Category::TextVisualCombo => "text_visual_combo",
            Category::Exercises => "exercises",
        }
    }

    /// Human-readable button text.
    pub fn label(&self) -> &'static str {
        match self {
            Category::TextHeavy => "Text Heavy",
            Category::VisualHeavy => "Visual Heavy",
            Category::FormattingLayouts => "Formatting & Layouts",
            Category::TextVisualCombo => "Text + Visual Combo",
            Category::Exercises => "Exercises",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = PicsortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text_heavy" => Ok(Category::TextHeavy),
            "visual_heavy" => Ok(Category::VisualHeavy),
            "formatting_layouts" => Ok(Category::FormattingLayouts),
            "text_visual_combo" => Ok(Category::TextVisualCombo),
            "exercises" => Ok(Category::Exercises),
            other => Err(PicsortError::UnknownCategory(other.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for cat in Category::ALL {
            assert_eq!(cat.slug().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn test_unknown_slug_rejected() {
        let err = "memes".parse::<Category>().unwrap_err();
        assert!(matches!(err, PicsortError::UnknownCategory(_)));
    }

    #[test]
    fn test_serde_as_slug() {
        let json = serde_json::to_string(&Category::TextVisualCombo).unwrap();
        assert_eq!(json, "\"text_visual_combo\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::TextVisualCombo);
    }

    #[test]
    fn test_all_is_exhaustive_and_distinct() {
        let slugs: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.slug()).collect();
        assert_eq!(slugs.len(), 5);
    }
}

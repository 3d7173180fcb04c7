//! Core domain types shared by the hydration and navigation layers.

use serde::{Deserialize, Serialize};

/// The single key held in preference storage.
pub const THEME_STORAGE_KEY: &str = "theme";

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// Heading depth tracked by the page outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    /// Map an element tag name to an outline level.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            _ => None,
        }
    }

    /// Numeric heading depth (2 or 3).
    pub fn depth(self) -> u8 {
        match self {
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }
}

/// A single entry in the in-page outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor id of the heading, unique within the page.
    pub id: String,
    /// Display label (the heading text).
    pub label: String,
    /// Heading level.
    pub level: HeadingLevel,
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Persisted color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    pub fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::DocNavError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(crate::DocNavError::parse(format!("unknown theme: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ApiCard
// ---------------------------------------------------------------------------

/// Structured card derived from an API heading and the list that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCard {
    /// Heading text, shown as the card summary.
    pub title: String,
    /// Anchor id carried over from the heading.
    pub anchor: String,
    /// Inner HTML of the signature block, if the list had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Property rows in list order.
    pub rows: Vec<ApiRow>,
}

/// One row of an [`ApiCard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiRow {
    /// A labelled value.
    Property { label: String, value_html: String },
    /// A value without a recognizable label, spanning the whole row.
    FullWidth { value_html: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_from_tag() {
        assert_eq!(HeadingLevel::from_tag("h2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_tag("H3"), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_tag("h4"), None);
        assert_eq!(HeadingLevel::H3.depth(), 3);
    }

    #[test]
    fn theme_parses_stored_values() {
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.flipped(), Theme::Dark);
    }

    #[test]
    fn api_card_serialization() {
        let card = ApiCard {
            title: "spawn".into(),
            anchor: "spawn".into(),
            signature: Some("<code>spawn(task)</code>".into()),
            rows: vec![
                ApiRow::Property {
                    label: "Returns".into(),
                    value_html: "<code>Handle</code>".into(),
                },
                ApiRow::FullWidth {
                    value_html: "Runs on the current executor.".into(),
                },
            ],
        };

        let json = serde_json::to_string(&card).expect("serialize");
        assert!(json.contains("\"kind\":\"full_width\""));
        let parsed: ApiCard = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, card);
    }
}

//! Domain types shared by every component
//!
//! Wire names follow the backend's JSON: memory items carry their category
//! in a `type` field whose values are `blog` and `linkedin`.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Kind of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Long-form post
    #[serde(rename = "blog", alias = "primary")]
    Primary,
    /// Short social post
    #[serde(rename = "linkedin", alias = "secondary")]
    Secondary,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Primary, Category::Secondary];

    /// Value used on the wire (`type`, `filter_type`)
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Primary => "blog",
            Self::Secondary => "linkedin",
        }
    }

    /// Path of the latest-artifact endpoint
    pub fn latest_path(self) -> &'static str {
        match self {
            Self::Primary => "/latest-blog",
            Self::Secondary => "/latest-linkedin",
        }
    }

    /// Human label used in placeholder texts
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "blog",
            Self::Secondary => "LinkedIn post",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blog" | "primary" => Ok(Self::Primary),
            "linkedin" | "secondary" => Ok(Self::Secondary),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Category filter applied to list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// `filter_type` query value, absent for `All`
    pub fn as_query(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category.wire_name()),
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(value: Option<Category>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

/// Backend reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectivityState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking connection..."),
            Self::Connected => write!(f, "Backend connected"),
            Self::Disconnected => write!(f, "Backend disconnected"),
        }
    }
}

/// Latest content shown for a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSnapshot {
    pub category: Category,
    pub content: String,
}

/// Row of the memory archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryItemSummary {
    pub id: i64,
    pub created_at: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub title: String,
}

impl MemoryItemSummary {
    /// Parse `created_at`, accepting SQLite's `YYYY-MM-DD HH:MM:SS` and RFC 3339.
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    /// Title, or `(untitled)`
    pub fn headline(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }

    /// `BLOG • topic • 2024-05-01 09:30`
    pub fn byline(&self) -> String {
        let topic = if self.topic.trim().is_empty() {
            "-"
        } else {
            self.topic.as_str()
        };
        let when = self
            .created_at_time()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| self.created_at.clone());
        format!(
            "{} • {} • {}",
            self.category.wire_name().to_uppercase(),
            topic,
            when
        )
    }
}

/// Full memory item, fetched lazily on selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryItemDetail {
    #[serde(flatten)]
    pub summary: MemoryItemSummary,
    #[serde(default)]
    pub content: String,
}

/// Current text and category filter of the memory view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub text: String,
    pub filter: CategoryFilter,
}

impl SearchQuery {
    /// The request this query resolves to when dispatched. Search spans all
    /// categories; only the list request is filtered.
    pub fn request(&self) -> MemoryRequest {
        if self.text.trim().is_empty() {
            MemoryRequest::List {
                filter: self.filter,
            }
        } else {
            MemoryRequest::Search {
                text: self.text.clone(),
            }
        }
    }
}

/// A resolved memory query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryRequest {
    List { filter: CategoryFilter },
    Search { text: String },
}

/// Tab shown by the view coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Primary,
    Secondary,
    Memory,
}

impl From<Category> for ActiveView {
    fn from(category: Category) -> Self {
        match category {
            Category::Primary => Self::Primary,
            Category::Secondary => Self::Secondary,
        }
    }
}

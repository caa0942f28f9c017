//! Data types for media search functionality.

use mwb_core::{SearchDefaults, SortKey, SortOrder};
use serde::{Deserialize, Serialize};

/// Searchable text field of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Channel,
    Topic,
    Title,
    Description,
}

impl SearchField {
    /// Every searchable field, in the order the index documents them.
    pub const ALL: [SearchField; 4] = [
        SearchField::Channel,
        SearchField::Topic,
        SearchField::Title,
        SearchField::Description,
    ];

    /// Wire name understood by the index.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchField::Channel => "channel",
            SearchField::Topic => "topic",
            SearchField::Title => "title",
            SearchField::Description => "description",
        }
    }
}

/// Text constraint over one or more fields.
///
/// Matches when any of `values` matches in any of `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConstraint {
    pub fields: Vec<SearchField>,
    pub values: Vec<String>,
}

impl FieldConstraint {
    /// Constraint on a single field with a single value.
    pub fn single(field: SearchField, value: impl Into<String>) -> Self {
        Self {
            fields: vec![field],
            values: vec![value.into()],
        }
    }

    /// Constraint matching `text` in every searchable field at once.
    pub fn broadened(text: impl Into<String>) -> Self {
        Self {
            fields: SearchField::ALL.to_vec(),
            values: vec![text.into()],
        }
    }

    /// True when this constraint spans all searchable fields.
    pub fn is_broadened(&self) -> bool {
        SearchField::ALL.iter().all(|f| self.fields.contains(f))
    }
}

/// Which side of a duration range a marker bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationDirection {
    /// `>N`: longer than N minutes
    MoreThan,
    /// `<N`: shorter than N minutes
    LessThan,
}

/// A single `>N` / `<N` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBound {
    pub direction: DurationDirection,
    pub minutes: u32,
}

/// Effective duration range of a request, in minutes.
///
/// Holds at most one bound per side; adding a bound keeps the tightest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationBounds {
    pub min_minutes: Option<u32>,
    pub max_minutes: Option<u32>,
}

impl DurationBounds {
    /// Intersects the range with `bound`.
    pub fn tighten(&mut self, bound: DurationBound) {
        match bound.direction {
            DurationDirection::MoreThan => {
                self.min_minutes =
                    Some(self.min_minutes.map_or(bound.minutes, |m| m.max(bound.minutes)));
            }
            DurationDirection::LessThan => {
                self.max_minutes =
                    Some(self.max_minutes.map_or(bound.minutes, |m| m.min(bound.minutes)));
            }
        }
    }

    /// Intersects the range with every bound of `other`.
    pub fn intersect(&mut self, other: &DurationBounds) {
        if let Some(minutes) = other.min_minutes {
            self.tighten(DurationBound {
                direction: DurationDirection::MoreThan,
                minutes,
            });
        }
        if let Some(minutes) = other.max_minutes {
            self.tighten(DurationBound {
                direction: DurationDirection::LessThan,
                minutes,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_minutes.is_none() && self.max_minutes.is_none()
    }

    /// Lower bound in seconds, the unit the index filters on.
    pub fn min_seconds(&self) -> Option<u64> {
        self.min_minutes.map(|m| u64::from(m) * 60)
    }

    /// Upper bound in seconds, the unit the index filters on.
    pub fn max_seconds(&self) -> Option<u64> {
        self.max_minutes.map(|m| u64::from(m) * 60)
    }
}

/// Request-level options copied into every search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub size: usize,
    pub offset: usize,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub include_future: bool,
}

impl QueryOptions {
    pub fn from_defaults(defaults: &SearchDefaults) -> Self {
        Self {
            size: defaults.size,
            offset: defaults.offset,
            sort_key: defaults.sort_key,
            sort_order: defaults.sort_order,
            include_future: defaults.include_future,
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from_defaults(&SearchDefaults::default())
    }
}

/// Structured query for one search against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// The user term this request was built from, for reporting
    pub term: String,
    /// AND-ed constraints; empty matches everything
    pub constraints: Vec<FieldConstraint>,
    pub duration: DurationBounds,
    pub include_future: bool,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub size: usize,
    pub offset: usize,
}

impl SearchRequest {
    /// Request without text constraints, carrying `options`.
    pub fn match_all(term: impl Into<String>, options: &QueryOptions) -> Self {
        Self {
            term: term.into(),
            constraints: Vec::new(),
            duration: DurationBounds::default(),
            include_future: options.include_future,
            sort_key: options.sort_key,
            sort_order: options.sort_order,
            size: options.size,
            offset: options.offset,
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Values constrained on `field` by single-field constraints.
    pub fn values_for(&self, field: SearchField) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| c.fields == [field])
            .flat_map(|c| c.values.iter().map(String::as_str))
            .collect()
    }
}

/// One broadcast returned by the index.
///
/// `url_video` is the identity of the broadcast: two items with the same
/// URL are the same instance no matter which search produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub channel: String,
    pub topic: String,
    pub title: String,
    pub description: String,
    /// Broadcast start, seconds since the Unix epoch
    pub timestamp: i64,
    /// Length in seconds
    pub duration: u64,
    pub url_video: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_video_low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_video_hd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_subtitle: Option<String>,
}

impl ResultItem {
    /// Text the post-filter patterns are matched against.
    pub fn text_surface(&self) -> String {
        [
            self.title.as_str(),
            self.topic.as_str(),
            self.description.as_str(),
        ]
        .join(" ")
    }

    /// Format duration as `1h 5m 0s`, or `42m 7s` below an hour.
    pub fn format_duration(&self) -> String {
        let hours = self.duration / 3600;
        let minutes = (self.duration % 3600) / 60;
        let seconds = self.duration % 60;

        if hours > 0 {
            format!("{hours}h {minutes}m {seconds}s")
        } else {
            format!("{minutes}m {seconds}s")
        }
    }
}

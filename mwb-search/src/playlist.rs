//! Playlist file naming.
//!
//! Names are derived from the query so that a directory of exports stays
//! readable: `mwb_Tatort_m80_48213.m3u` for the query `"Tatort >80"`.

use std::fmt;
use std::str::FromStr;

use mwb_core::ConfigError;
use rand::Rng;

use crate::types::DurationBounds;

/// Prefix of every exported playlist file.
pub const PLAYLIST_PREFIX: &str = "mwb_";

/// Longest query-derived part of a file name, in characters.
pub const MAX_STEM_CHARS: usize = 50;

/// Exportable playlist format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    /// Extended M3U
    M3u,
    /// XML Shareable Playlist Format
    Xspf,
}

impl PlaylistFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PlaylistFormat::M3u => "m3u",
            PlaylistFormat::Xspf => "xspf",
        }
    }
}

impl FromStr for PlaylistFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m3u" => Ok(PlaylistFormat::M3u),
            "xspf" => Ok(PlaylistFormat::Xspf),
            _ => Err(ConfigError::UnsupportedOutputMode { mode: s.to_string() }),
        }
    }
}

impl fmt::Display for PlaylistFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Query-derived part of the name: spaces, selector characters and path
/// separators become `_`, duration markers become `m`, cut to
/// [`MAX_STEM_CHARS`].
///
/// Bounds not written in the terms themselves (set programmatically) are
/// appended as `m<minutes>` before the cut.
pub fn query_stem(terms: &[String], bounds: &DurationBounds) -> String {
    let mut query = terms.join(" ");

    if !query.contains(['>', '<']) {
        for minutes in [bounds.min_minutes, bounds.max_minutes].into_iter().flatten() {
            query.push_str(&format!(" m{minutes}"));
        }
    }

    query
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '!' | '#' | '+' | '*' | '/' | '\\' => '_',
            '>' | '<' => 'm',
            other => other,
        })
        .take(MAX_STEM_CHARS)
        .collect()
}

/// Playlist file name with an explicit disambiguating suffix.
pub fn derive_filename_with_suffix(
    terms: &[String],
    bounds: &DurationBounds,
    format: PlaylistFormat,
    suffix: u32,
) -> String {
    format!(
        "{PLAYLIST_PREFIX}{}_{suffix}.{}",
        query_stem(terms, bounds),
        format.extension()
    )
}

/// Playlist file name with a random five-digit suffix.
///
/// The suffix keeps near-simultaneous exports of the same query apart.
pub fn derive_filename(
    terms: &[String],
    bounds: &DurationBounds,
    format: PlaylistFormat,
) -> String {
    let suffix = rand::rng().random_range(10_000..100_000);
    derive_filename_with_suffix(terms, bounds, format, suffix)
}

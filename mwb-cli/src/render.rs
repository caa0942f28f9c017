//! Output rendering for search results and channel lists.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::DateTime;
use mwb_core::ConfigError;
use mwb_search::{DurationBounds, PlaylistFormat, ResultItem, derive_filename};
use owo_colors::OwoColorize;

/// Longest description shown in table output, in characters.
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// How search results are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
    Csv,
    /// `date | channel | title | duration | url`
    Oneline,
    /// `date | channel | title | duration | topic`
    OnelineTheme,
    M3u,
    Xspf,
}

impl OutputMode {
    /// Playlist format written to disk, if this mode exports one.
    pub fn playlist(self) -> Option<PlaylistFormat> {
        match self {
            OutputMode::M3u => Some(PlaylistFormat::M3u),
            OutputMode::Xspf => Some(PlaylistFormat::Xspf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Table => "table",
            OutputMode::Json => "json",
            OutputMode::Csv => "csv",
            OutputMode::Oneline => "oneline",
            OutputMode::OnelineTheme => "onelinetheme",
            OutputMode::M3u => "m3u",
            OutputMode::Xspf => "xspf",
        }
    }
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputMode::Table),
            "json" => Ok(OutputMode::Json),
            "csv" => Ok(OutputMode::Csv),
            "oneline" => Ok(OutputMode::Oneline),
            "onelinetheme" => Ok(OutputMode::OnelineTheme),
            "m3u" => Ok(OutputMode::M3u),
            "xspf" => Ok(OutputMode::Xspf),
            _ => Err(ConfigError::UnsupportedOutputMode { mode: s.to_string() }),
        }
    }
}

impl From<PlaylistFormat> for OutputMode {
    fn from(format: PlaylistFormat) -> Self {
        match format {
            PlaylistFormat::M3u => OutputMode::M3u,
            PlaylistFormat::Xspf => OutputMode::Xspf,
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes `items` to `out` in `mode`.
///
/// # Errors
/// - `io::Error` - writing to `out` failed, or JSON encoding failed
pub fn render<W: Write>(out: &mut W, items: &[ResultItem], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Table => write_table(out, items),
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)
        }
        OutputMode::Csv => write_csv(out, items),
        OutputMode::Oneline => write_oneline(out, items, false),
        OutputMode::OnelineTheme => write_oneline(out, items, true),
        OutputMode::M3u => write_m3u(out, items),
        OutputMode::Xspf => write_xspf(out, items),
    }
}

fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn description_preview(description: &str) -> Option<String> {
    let description = description.trim();
    if description.chars().count() <= 10 {
        return None;
    }
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        Some(format!("{cut}..."))
    } else {
        Some(description.to_string())
    }
}

fn write_table<W: Write>(out: &mut W, items: &[ResultItem]) -> io::Result<()> {
    writeln!(out, "{}", "Search Results".bold().blue())?;
    writeln!(out, "Showing: {}", items.len().to_string().green())?;
    writeln!(out)?;

    if items.is_empty() {
        writeln!(out, "{}", "No results found.".yellow())?;
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        writeln!(out, "{} {}", format!("{}.", i + 1).blue().bold(), "─".repeat(60).blue())?;
        writeln!(out, "{}: {}", "Channel".bold(), item.channel.green())?;
        writeln!(out, "{}: {}", "Theme".bold(), item.topic.cyan())?;
        writeln!(out, "{}: {}", "Title".bold(), item.title.bright_white())?;
        writeln!(out, "{}: {}", "Duration".bold(), item.format_duration())?;

        let date = format_date(item.timestamp);
        if !date.is_empty() {
            writeln!(out, "{}: {}", "Date".bold(), date.yellow())?;
        }

        writeln!(out, "{}: {}", "Video URL".bold(), item.url_video.bright_blue())?;

        if let Some(preview) = description_preview(&item.description) {
            writeln!(out, "{}: {}", "Description".bold(), preview.bright_black())?;
        }

        writeln!(out)?;
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn write_csv<W: Write>(out: &mut W, items: &[ResultItem]) -> io::Result<()> {
    writeln!(out, "Channel,Theme,Title,Duration,Date,URL,Description")?;

    for item in items {
        let fields = [
            csv_field(&item.channel),
            csv_field(&item.topic),
            csv_field(&item.title),
            csv_field(&item.duration.to_string()),
            csv_field(&format_date(item.timestamp)),
            csv_field(&item.url_video),
            csv_field(&item.description),
        ];
        writeln!(out, "{}", fields.join(","))?;
    }

    Ok(())
}

fn write_oneline<W: Write>(out: &mut W, items: &[ResultItem], show_topic: bool) -> io::Result<()> {
    for item in items {
        let last = if show_topic { &item.topic } else { &item.url_video };
        writeln!(
            out,
            "{} | {} | {} | {} | {}",
            format_date(item.timestamp),
            item.channel,
            item.title,
            item.format_duration(),
            last
        )?;
    }
    Ok(())
}

fn write_m3u<W: Write>(out: &mut W, items: &[ResultItem]) -> io::Result<()> {
    writeln!(out, "#EXTM3U")?;
    for item in items {
        writeln!(out, "#EXTINF:{},{} - {}", item.duration, item.channel, item.title)?;
        writeln!(out, "{}", item.url_video)?;
    }
    Ok(())
}

/// Escapes the five XML special characters.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn write_xspf<W: Write>(out: &mut W, items: &[ResultItem]) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<playlist version="1" xmlns="http://xspf.org/ns/0/">"#)?;
    writeln!(out, "  <trackList>")?;
    for item in items {
        writeln!(out, "    <track>")?;
        writeln!(out, "      <location>{}</location>", xml_escape(&item.url_video))?;
        writeln!(out, "      <title>{}</title>", xml_escape(&item.title))?;
        writeln!(out, "      <creator>{}</creator>", xml_escape(&item.channel))?;
        writeln!(out, "      <annotation>{}</annotation>", xml_escape(&item.topic))?;
        writeln!(out, "      <duration>{}</duration>", item.duration * 1000)?;
        writeln!(out, "    </track>")?;
    }
    writeln!(out, "  </trackList>")?;
    writeln!(out, "</playlist>")
}

/// Writes a playlist of `items` into `dir` and returns its path.
///
/// # Errors
/// - `io::Error` - file could not be created or written
pub fn save_playlist(
    dir: &Path,
    terms: &[String],
    bounds: &DurationBounds,
    format: PlaylistFormat,
    items: &[ResultItem],
) -> io::Result<PathBuf> {
    let path = dir.join(derive_filename(terms, bounds, format));
    let mut out = BufWriter::new(File::create(&path)?);
    render(&mut out, items, format.into())?;
    out.flush()?;

    tracing::info!(path = %path.display(), entries = items.len(), "Playlist written");
    Ok(path)
}

/// Channel names in rows of four, followed by selector tips.
///
/// # Errors
/// - `io::Error` - writing to `out` failed
pub fn write_channels<W: Write>(out: &mut W, channels: &[String]) -> io::Result<()> {
    writeln!(out, "{}", "Available Channels:".bold().blue())?;
    writeln!(out)?;

    for row in channels.chunks(4) {
        for channel in row {
            write!(out, "{}", format!("{channel:<20}").green())?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "{}: Use {} to filter by channel", "Tip".yellow(), "!CHANNEL".cyan())?;
    writeln!(out, "{}: Use {} for duration filtering", "Tip".yellow(), ">90 <120".cyan())
}

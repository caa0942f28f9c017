//! Selector grammar for MediathekView-style query terms.
//!
//! A token is classified by its first character: `!` channel, `#` topic,
//! `+` title, `*` description, `>N`/`<N` duration in minutes. Anything else
//! is free text. Inside a selector value a comma stands for a space, so
//! `#sturm,der,liebe` selects the topic "sturm der liebe".

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::MediaSearchError;
use crate::types::{DurationBound, DurationDirection, SearchField};

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([<>])\s*(\d+)$").expect("duration pattern compiles"));

/// Classified fragment of a query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    Channel(String),
    Topic(String),
    Title(String),
    Description(String),
    DurationBound(DurationBound),
    FreeText(String),
}

impl SelectorToken {
    /// Field an explicit selector narrows to; `None` for free text and durations.
    pub fn field(&self) -> Option<SearchField> {
        match self {
            SelectorToken::Channel(_) => Some(SearchField::Channel),
            SelectorToken::Topic(_) => Some(SearchField::Topic),
            SelectorToken::Title(_) => Some(SearchField::Title),
            SelectorToken::Description(_) => Some(SearchField::Description),
            SelectorToken::DurationBound(_) | SelectorToken::FreeText(_) => None,
        }
    }

    /// Searchable text of the token, without its selector character.
    pub fn text(&self) -> Option<&str> {
        match self {
            SelectorToken::Channel(text)
            | SelectorToken::Topic(text)
            | SelectorToken::Title(text)
            | SelectorToken::Description(text)
            | SelectorToken::FreeText(text) => Some(text),
            SelectorToken::DurationBound(_) => None,
        }
    }
}

/// Classifies a single token.
///
/// Duration markers are recognized only when they make up the whole token;
/// a bare number such as `85` is free text.
///
/// # Errors
/// - `MediaSearchError::MalformedDuration` - token starts with `>`/`<` but carries no minute count
/// - `MediaSearchError::EmptySelector` - selector character with no value
pub fn classify(token: &str) -> Result<SelectorToken, MediaSearchError> {
    let token = token.trim();

    if let Some(caps) = DURATION_RE.captures(token) {
        let minutes = caps[2]
            .parse::<u32>()
            .map_err(|_| MediaSearchError::MalformedDuration {
                token: token.to_string(),
            })?;
        let direction = if &caps[1] == ">" {
            DurationDirection::MoreThan
        } else {
            DurationDirection::LessThan
        };
        return Ok(SelectorToken::DurationBound(DurationBound { direction, minutes }));
    }

    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return Ok(SelectorToken::FreeText(String::new()));
    };

    let selector: fn(String) -> SelectorToken = match first {
        '>' | '<' => {
            return Err(MediaSearchError::MalformedDuration {
                token: token.to_string(),
            });
        }
        '!' => SelectorToken::Channel,
        '#' => SelectorToken::Topic,
        '+' => SelectorToken::Title,
        '*' => SelectorToken::Description,
        _ => return Ok(SelectorToken::FreeText(token.to_string())),
    };

    let value = chars.as_str().replace(',', " ");
    let value = value.trim();
    if value.is_empty() {
        return Err(MediaSearchError::EmptySelector {
            token: token.to_string(),
        });
    }

    Ok(selector(value.to_string()))
}

/// One raw term broken into its duration bounds and text units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTerm {
    /// Every `>N`/`<N` marker, in order of appearance
    pub durations: Vec<DurationBound>,
    /// Selector tokens plus at most one free-text phrase
    pub units: Vec<SelectorToken>,
}

impl ParsedTerm {
    /// True when every unit names its field explicitly.
    pub fn is_fully_selected(&self) -> bool {
        self.units.iter().all(|unit| unit.field().is_some())
    }

    /// True when the term carries nothing but duration markers.
    pub fn is_duration_only(&self) -> bool {
        self.units.is_empty()
    }
}

/// Splits a term on whitespace and classifies every token.
///
/// A marker separated from its number (`> 90`) counts as one duration.
/// Free-text words are gathered into a single phrase placed where the
/// first of them appeared, with duration markers cut out.
///
/// # Errors
/// - `MediaSearchError::EmptyTerm` - term is empty or only whitespace
/// - Any error of [`classify`]
pub fn parse_term(term: &str) -> Result<ParsedTerm, MediaSearchError> {
    if term.trim().is_empty() {
        return Err(MediaSearchError::EmptyTerm);
    }

    let mut parsed = ParsedTerm::default();
    let mut phrase: Vec<&str> = Vec::new();
    let mut phrase_slot: Option<usize> = None;

    let mut words = term.split_whitespace().peekable();
    while let Some(word) = words.next() {
        let detached = matches!(word, ">" | "<")
            && words
                .peek()
                .is_some_and(|next| next.bytes().all(|b| b.is_ascii_digit()));
        let joined;
        let token = if detached && let Some(next) = words.next() {
            joined = format!("{word}{next}");
            joined.as_str()
        } else {
            word
        };

        match classify(token)? {
            SelectorToken::DurationBound(bound) => parsed.durations.push(bound),
            SelectorToken::FreeText(_) => {
                phrase.push(word);
                phrase_slot.get_or_insert(parsed.units.len());
            }
            unit => parsed.units.push(unit),
        }
    }

    if let Some(slot) = phrase_slot {
        parsed
            .units
            .insert(slot, SelectorToken::FreeText(phrase.join(" ")));
    }

    Ok(parsed)
}

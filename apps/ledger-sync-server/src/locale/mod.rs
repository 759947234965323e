//! Locale negotiation
//!
//! Picks one supported locale from a weighted `Accept-Language` list.
//! Negotiation never fails: anything unusable degrades to the configured
//! default.

pub mod messages;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use messages::Message;

/// Locales the API can answer in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
    Es,
    De,
    Pt,
    It,
}

/// The canonical supported set, in declaration order
pub const SUPPORTED_LOCALES: [Locale; 6] = [
    Locale::En,
    Locale::Fr,
    Locale::Es,
    Locale::De,
    Locale::Pt,
    Locale::It,
];

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::Es => "es",
            Locale::De => "de",
            Locale::Pt => "pt",
            Locale::It => "it",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tag is not one of the supported locales
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    /// Case-sensitive: only the lowercase canonical tags are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_LOCALES
            .iter()
            .copied()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

/// One entry of a weighted preference list
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference<'a> {
    pub tag: &'a str,
    pub quality: f32,
}

/// Split an `Accept-Language` value into entries, highest weight first.
///
/// Entries without a usable `;q=` weight count as 1.0. The sort is stable,
/// so entries sharing a weight keep their left-to-right order.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference<'_>> {
    let mut entries: Vec<LanguagePreference<'_>> = header
        .split(',')
        .map(str::trim)
        .map(|entry| match entry.split_once(";q=") {
            Some((tag, weight)) => LanguagePreference {
                tag: tag.trim(),
                quality: weight
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|q| q.is_finite())
                    .unwrap_or(1.0),
            },
            None => LanguagePreference {
                tag: entry,
                quality: 1.0,
            },
        })
        .collect();

    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    entries
}

/// Negotiate the response locale from an `Accept-Language` header.
pub fn negotiate(header: Option<&str>, default: Locale, supported: &[Locale]) -> Locale {
    let header = match header.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => return default,
    };

    parse_accept_language(header)
        .iter()
        .find_map(|pref| {
            let primary: String = pref.tag.chars().take(2).collect();
            supported
                .iter()
                .copied()
                .find(|locale| locale.as_str() == primary)
        })
        .unwrap_or(default)
}

//! File name normalization for the three media grammars.
//!
//! All functions work on the stem only; the extension is split off beforehand
//! with [`split_file_name`](crate::models::split_file_name) and glued back on by
//! the caller. A stem that does not fit its grammar passes through unchanged.

use crate::models::MediaType;
use regex::Regex;

/// Release/quality tokens stripped from movie and series names, in removal order.
///
/// Matching is case-sensitive on purpose: `bluray` does not remove `BluRay`.
pub const QUALITY_TOKENS: [&str; 8] = [
    "1080p", "720p", "WEB-DL", "DD5.1", "H.264", "H264", "bluray", "x264",
];

/// A cleaned stem plus whatever structure the grammar recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub stem: String,
    pub series_name: Option<String>,
    pub season: Option<u32>,
}

impl NormalizedName {
    fn plain(stem: &str) -> Self {
        Self {
            stem: stem.trim().to_string(),
            series_name: None,
            season: None,
        }
    }
}

/// Converts raw download names into display names.
///
/// # Grammars
///
/// - Anime: `[Group] Title S01 - 05 [tags]` becomes `Title S01 05`. Every leading
///   bracketed tag counts as the group, so `[Grp][Other] Title - 01` becomes
///   `Title 01`. The season is optional, the episode marker is `OVA` or a number
///   with an optional `v2` revision suffix.
/// - Movie: quality tokens are removed, nothing else changes.
/// - Series: quality tokens are removed, dots become spaces, then
///   `Title S01E02 Episode-GROUP` becomes `Title - S01E02 - Episode`. Everything
///   from the last dash on is the dropped group, and a dash is required for the
///   reformat. An already reformatted name with an episode title still has a dash
///   after the marker and matches once more: `Title - S01E02 - Episode` becomes
///   `Title - - S01E02`, which no longer matches.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    anime_pattern: Regex,
    series_pattern: Regex,
    season_digits: Regex,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self {
            anime_pattern: Regex::new(
                r"(?i)^(?:\[[^\]]*\]\s*)+(.*?)(?:\s+(S\d+))?\s*-\s*(OVA|\d+(?:v\d+)?)\b(.*)$",
            )
            .expect("Invalid anime regex"),
            series_pattern: Regex::new(r"(?i)^(.*?)(S\d+E\d+)(.*)(-.*)$")
                .expect("Invalid series regex"),
            season_digits: Regex::new(r"(?i)^S(\d+)").expect("Invalid season regex"),
        }
    }

    /// Normalize a stem for the given media type
    pub fn normalize(&self, stem: &str, media_type: MediaType) -> NormalizedName {
        match media_type {
            MediaType::Anime => self.normalize_anime(stem),
            MediaType::Series => self.normalize_series(stem),
            MediaType::Movie => NormalizedName::plain(&strip_quality_tokens(stem)),
        }
    }

    /// Convenience wrapper returning only the cleaned stem
    pub fn normalize_stem(&self, stem: &str, media_type: MediaType) -> String {
        self.normalize(stem, media_type).stem
    }

    fn normalize_anime(&self, stem: &str) -> NormalizedName {
        let Some(caps) = self.anime_pattern.captures(stem) else {
            return NormalizedName::plain(stem);
        };

        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        let season = caps.get(2).map(|m| m.as_str().to_uppercase());
        let episode = caps.get(3).map_or("", |m| m.as_str()).trim().to_uppercase();

        let mut result = name.to_string();
        if let Some(ref season) = season {
            result.push(' ');
            result.push_str(season);
        }
        result.push(' ');
        result.push_str(&episode);

        NormalizedName {
            stem: result.trim().to_string(),
            series_name: non_empty(name),
            season: season.as_deref().and_then(|s| self.parse_season(s)),
        }
    }

    fn normalize_series(&self, stem: &str) -> NormalizedName {
        let cleaned = strip_quality_tokens(stem).replace('.', " ");

        let Some(caps) = self.series_pattern.captures(&cleaned) else {
            return NormalizedName::plain(&cleaned);
        };

        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        let episode = caps.get(2).map_or("", |m| m.as_str()).to_uppercase();
        let episode_title = caps.get(3).map_or("", |m| m.as_str()).trim();

        let mut result = format!("{} - {}", name, episode);
        if !episode_title.is_empty() {
            result.push_str(" - ");
            result.push_str(episode_title);
        }

        NormalizedName {
            stem: result.trim().to_string(),
            series_name: non_empty(name),
            season: self.parse_season(&episode),
        }
    }

    fn parse_season(&self, marker: &str) -> Option<u32> {
        self.season_digits
            .captures(marker)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Remove every [`QUALITY_TOKENS`] entry once, in list order.
pub fn strip_quality_tokens(name: &str) -> String {
    QUALITY_TOKENS
        .iter()
        .fold(name.to_string(), |acc, token| strip_token(&acc, token))
}

/// Remove one token.
///
/// The bracketed form is always removed first. After that exactly one of the
/// dash-prefixed, space-prefixed or bare forms is removed, whichever is found
/// first in that order. Each removal replaces all occurrences of that form.
fn strip_token(name: &str, token: &str) -> String {
    let mut result = name.replace(&format!("[{}]", token), "");

    let dashed = format!("-{}", token);
    let spaced = format!(" {}", token);
    if result.contains(&dashed) {
        result = result.replace(&dashed, "");
    } else if result.contains(&spaced) {
        result = result.replace(&spaced, "");
    } else if result.contains(token) {
        result = result.replace(token, "");
    }

    result
}

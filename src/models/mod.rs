//! Data model for the matching engine
//!
//! Inputs (channels, streams, EPG entries) are owned by the host
//! application and read-only here; everything derived is ephemeral and
//! recomputed per batch.

use serde::{Deserialize, Serialize};

/// A playlist channel with its ordered stream references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    /// Stream ids in priority order, as maintained by the host.
    pub streams: Vec<i64>,
}

/// A raw stream harvested from a playlist source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: i64,
    pub name: String,
    pub channel_group_name: Option<String>,
}

/// One entry of the EPG catalog.
///
/// `tvg_id` is the catalog identifier (conventionally `name.country` or
/// `name.league`, optionally with parenthesized call-sign segments) and is
/// not guaranteed unique across sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpgEntry {
    pub id: i64,
    pub name: String,
    pub tvg_id: String,
    pub source: i64,
}

/// An EPG source, used only for display names and priority lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgSource {
    pub id: i64,
    pub name: String,
}

/// Lowercase 2-3 letter country code derived from a name or identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_us(&self) -> bool {
        self.0 == "us"
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase, space-stripped league token (e.g. `nfl`, `premierleague`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueCode(String);

impl LeagueCode {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into().to_lowercase().replace(' ', ""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeagueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase North-American broadcast call sign base (e.g. `katu`),
/// operational suffix (`-DT`, `-TV`, ...) already discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallSign(String);

impl CallSign {
    pub fn new<S: Into<String>>(sign: S) -> Self {
        Self(sign.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a candidate was found: exact key lookup vs prefix-overlap scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    Exact,
    Prefix,
}

/// Outcome classification for one channel, a pure function of the number
/// of matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    None,
    Exact,
    Multiple,
}

impl MatchStatus {
    pub fn from_match_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Exact,
            _ => Self::Multiple,
        }
    }
}

/// An EPG candidate with its bounded confidence score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMatch<'a> {
    pub epg: &'a EpgEntry,
    /// Heuristic match quality estimate in `[0, 100]`; independent of the
    /// comparator order used to pick the best candidate.
    pub confidence: u8,
}

/// Per-channel result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelMatchResult<'a> {
    pub channel: &'a Channel,
    pub detected_country: Option<CountryCode>,
    pub normalized_name: String,
    /// Candidate entries, best first (ranking comparator order).
    pub matches: Vec<&'a EpgEntry>,
    /// The same candidates ordered by descending confidence.
    pub matches_with_scores: Vec<ScoredMatch<'a>>,
    /// Confidence of the top scored match, or 0 when there is none.
    pub best_score: u8,
    pub status: MatchStatus,
}

//! TVG identifier parsing
//!
//! Catalog identifiers conventionally look like `name.country` or
//! `name.league`, with optional parenthesized call-sign or variant
//! segments, e.g. `AdultSwim(IPFeed)(ASIP).ca`.

use regex::Regex;

use crate::matching::normalizer::NameNormalizer;
use crate::matching::tables;
use crate::models::{CountryCode, LeagueCode};

/// Components of a parsed catalog identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedIdentifier {
    pub normalized_name: String,
    pub country: Option<CountryCode>,
    pub league: Option<LeagueCode>,
}

/// Decomposes tvg-id strings into comparable components.
pub struct IdentifierParser {
    parenthesized: Regex,
}

impl IdentifierParser {
    pub fn new() -> Self {
        Self {
            parenthesized: Regex::new(r"\(([^)]*)\)").expect("invalid parenthesized pattern"),
        }
    }

    /// Splits `tvg_id` into (normalized name, country, league).
    ///
    /// The suffix after the last `.` is taken as a league code when it is
    /// one of the known league tokens, otherwise as a country code when it
    /// is 2-3 lowercase letters. Unrecognizable input degrades to an
    /// empty/default result rather than failing.
    pub fn parse(&self, normalizer: &NameNormalizer, tvg_id: &str) -> ParsedIdentifier {
        let trimmed = tvg_id.trim();
        if trimmed.is_empty() {
            return ParsedIdentifier::default();
        }

        let mut rest = trimmed;
        let mut country = None;
        let mut league = None;

        if let Some(dot) = trimmed.rfind('.') {
            let suffix = &trimmed[dot + 1..];
            if tables::is_league_code(&suffix.to_lowercase()) {
                league = Some(LeagueCode::new(suffix));
                rest = &trimmed[..dot];
            } else if (2..=3).contains(&suffix.len())
                && suffix.chars().all(|c| c.is_ascii_lowercase())
            {
                country = Some(CountryCode::new(suffix));
                rest = &trimmed[..dot];
            }
        }

        let without_annotations = self.parenthesized.replace_all(rest, "");
        let normalized_name = normalizer.normalize_identifier_name(&without_annotations);

        ParsedIdentifier {
            normalized_name,
            country,
            league,
        }
    }

    /// All parenthesized segments of an identifier, in order, parentheses
    /// stripped. Used by the index builder for call-sign and regional
    /// markers.
    pub(crate) fn parenthesized_segments<'s>(&self, tvg_id: &'s str) -> Vec<&'s str> {
        self.parenthesized
            .captures_iter(tvg_id)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for IdentifierParser {
    fn default() -> Self {
        Self::new()
    }
}

//! EPG catalog index
//!
//! Built once per batch in a single pass over the catalog, then queried
//! read-only by the collector and ranker for every channel.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::matching::identifier::IdentifierParser;
use crate::matching::normalizer::NameNormalizer;
use crate::matching::tables;
use crate::models::{CountryCode, EpgEntry, LeagueCode};

/// Regional feed designation carried by a tvg-id annotation such as
/// `(West)` or the channel name itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    East,
    West,
    Central,
    Mountain,
}

impl Region {
    /// Region named by a parenthesized identifier segment, if any.
    pub fn from_marker(segment: &str) -> Option<Self> {
        let lowered = segment.to_lowercase();
        for word in lowered.split(|c: char| !c.is_ascii_alphabetic()) {
            match word {
                "west" | "pacific" => return Some(Self::West),
                "east" => return Some(Self::East),
                "central" => return Some(Self::Central),
                "mountain" => return Some(Self::Mountain),
                _ => {}
            }
        }
        None
    }

    /// Region a channel name asks for. East is the default feed when the
    /// name carries no regional wording.
    pub fn desired_for(channel_name: &str) -> Self {
        let lowered = channel_name.to_lowercase();
        if lowered.contains("west") || lowered.contains("pacific") {
            Self::West
        } else if lowered.contains("east") {
            Self::East
        } else if lowered.contains("central") {
            Self::Central
        } else if lowered.contains("mountain") {
            Self::Mountain
        } else {
            Self::East
        }
    }
}

/// Read-only lookup structures over one EPG catalog snapshot.
pub struct EpgIndex<'a> {
    entries: HashMap<i64, &'a EpgEntry>,
    by_tvg_id: HashMap<String, Vec<i64>>,
    by_name: HashMap<String, Vec<i64>>,
    /// `"{normalized name}.{league}"` keys, only for entries whose
    /// identifier carried a league suffix.
    by_name_with_league: HashMap<String, Vec<i64>>,
    by_call_sign: HashMap<String, Vec<i64>>,
    country_of: HashMap<i64, CountryCode>,
    league_of: HashMap<i64, LeagueCode>,
    normalized_tvg_id_of: HashMap<i64, String>,
    call_signs_of: HashMap<i64, Vec<String>>,
    /// Subset of `call_signs_of` that came from parenthesized identifier
    /// annotations; the confidence scorer only credits these.
    paren_call_signs_of: HashMap<i64, Vec<String>>,
    region_of: HashMap<i64, Region>,
    hd_variants: HashSet<i64>,
    /// Flat lists for linear prefix scans when the hash lookups miss.
    all_tvg_ids: Vec<(String, i64)>,
    all_names: Vec<(String, i64)>,
}

impl<'a> EpgIndex<'a> {
    /// Single O(n) pass over the catalog.
    pub fn build(
        normalizer: &NameNormalizer,
        parser: &IdentifierParser,
        entries: &'a [EpgEntry],
    ) -> Self {
        let mut index = Self {
            entries: HashMap::with_capacity(entries.len()),
            by_tvg_id: HashMap::with_capacity(entries.len()),
            by_name: HashMap::with_capacity(entries.len()),
            by_name_with_league: HashMap::new(),
            by_call_sign: HashMap::new(),
            country_of: HashMap::new(),
            league_of: HashMap::new(),
            normalized_tvg_id_of: HashMap::with_capacity(entries.len()),
            call_signs_of: HashMap::new(),
            paren_call_signs_of: HashMap::new(),
            region_of: HashMap::new(),
            hd_variants: HashSet::new(),
            all_tvg_ids: Vec::with_capacity(entries.len()),
            all_names: Vec::with_capacity(entries.len()),
        };

        for entry in entries {
            index.entries.insert(entry.id, entry);

            let parsed = parser.parse(normalizer, &entry.tvg_id);
            if !parsed.normalized_name.is_empty() {
                index
                    .by_tvg_id
                    .entry(parsed.normalized_name.clone())
                    .or_default()
                    .push(entry.id);
                index.all_tvg_ids.push((parsed.normalized_name.clone(), entry.id));
                index
                    .normalized_tvg_id_of
                    .insert(entry.id, parsed.normalized_name);
            }

            let name_key = normalizer.normalize(&entry.name);
            if !name_key.is_empty() {
                index.by_name.entry(name_key.clone()).or_default().push(entry.id);
                index.all_names.push((name_key.clone(), entry.id));
                if let Some(league) = &parsed.league {
                    index
                        .by_name_with_league
                        .entry(format!("{name_key}.{league}"))
                        .or_default()
                        .push(entry.id);
                }
            }

            if let Some(country) = parsed.country {
                index.country_of.insert(entry.id, country);
            }
            if let Some(league) = parsed.league {
                index.league_of.insert(entry.id, league);
            }

            let (call_signs, paren_signs) = Self::collect_call_signs(normalizer, parser, entry);
            for sign in &call_signs {
                index
                    .by_call_sign
                    .entry(sign.clone())
                    .or_default()
                    .push(entry.id);
            }
            if !call_signs.is_empty() {
                index.call_signs_of.insert(entry.id, call_signs);
            }
            if !paren_signs.is_empty() {
                index.paren_call_signs_of.insert(entry.id, paren_signs);
            }

            for segment in parser.parenthesized_segments(&entry.tvg_id) {
                if let Some(region) = Region::from_marker(segment) {
                    index.region_of.insert(entry.id, region);
                    break;
                }
            }

            if Self::entry_is_hd_variant(entry) {
                index.hd_variants.insert(entry.id);
            }
        }

        debug!(
            "EPG index built: {} entries, {} tvg-id keys, {} name keys, {} call signs",
            entries.len(),
            index.by_tvg_id.len(),
            index.by_name.len(),
            index.by_call_sign.len()
        );

        index
    }

    /// Call-sign keys for one entry: every parenthesized identifier
    /// segment both as-is and with a trailing quality suffix stripped,
    /// plus any broadcast call sign in the identifier or display name.
    /// Deduplicated per entry. Returns (all signs, parenthesized signs).
    fn collect_call_signs(
        normalizer: &NameNormalizer,
        parser: &IdentifierParser,
        entry: &EpgEntry,
    ) -> (Vec<String>, Vec<String>) {
        let mut paren_signs: Vec<String> = Vec::new();
        for segment in parser.parenthesized_segments(&entry.tvg_id) {
            let key: String = segment
                .to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            if key.is_empty() {
                continue;
            }
            if !paren_signs.contains(&key) {
                paren_signs.push(key.clone());
            }
            let stripped = tables::strip_call_sign_quality(&key);
            if stripped != key && !paren_signs.iter().any(|s| s == stripped) {
                paren_signs.push(stripped.to_string());
            }
        }

        let mut signs = paren_signs.clone();
        if let Some(sign) = normalizer
            .extract_broadcast_call_sign(&entry.tvg_id)
            .or_else(|| normalizer.extract_broadcast_call_sign(&entry.name))
        {
            let sign = sign.as_str().to_string();
            if !signs.contains(&sign) {
                signs.push(sign);
            }
        }

        (signs, paren_signs)
    }

    /// HD feed detection: the identifier carries a trailing `HD)`
    /// annotation before its suffix dot, or the display name ends in the
    /// word `HD`.
    fn entry_is_hd_variant(entry: &EpgEntry) -> bool {
        let id_body = match entry.tvg_id.rfind('.') {
            Some(dot) => &entry.tvg_id[..dot],
            None => entry.tvg_id.as_str(),
        };
        if id_body.trim_end().to_lowercase().ends_with("hd)") {
            return true;
        }

        let name = entry.name.trim_end();
        let upper = name.to_uppercase();
        upper.ends_with("HD")
            && (name.len() == 2
                || !upper.as_bytes()[upper.len() - 3].is_ascii_alphanumeric())
    }

    pub fn entry(&self, id: i64) -> Option<&'a EpgEntry> {
        self.entries.get(&id).copied()
    }

    pub fn ids_by_tvg_id(&self, key: &str) -> &[i64] {
        self.by_tvg_id.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids_by_name(&self, key: &str) -> &[i64] {
        self.by_name.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids_by_name_with_league(&self, key: &str) -> &[i64] {
        self.by_name_with_league
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ids_by_call_sign(&self, key: &str) -> &[i64] {
        self.by_call_sign.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn country_of(&self, id: i64) -> Option<&CountryCode> {
        self.country_of.get(&id)
    }

    pub fn league_of(&self, id: i64) -> Option<&LeagueCode> {
        self.league_of.get(&id)
    }

    pub fn normalized_tvg_id_of(&self, id: i64) -> Option<&str> {
        self.normalized_tvg_id_of.get(&id).map(String::as_str)
    }

    pub fn call_signs_of(&self, id: i64) -> &[String] {
        self.call_signs_of.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn paren_call_signs_of(&self, id: i64) -> &[String] {
        self.paren_call_signs_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn region_of(&self, id: i64) -> Option<Region> {
        self.region_of.get(&id).copied()
    }

    pub fn is_hd_variant(&self, id: i64) -> bool {
        self.hd_variants.contains(&id)
    }

    pub fn all_tvg_ids(&self) -> &[(String, i64)] {
        &self.all_tvg_ids
    }

    pub fn all_names(&self) -> &[(String, i64)] {
        &self.all_names
    }
}

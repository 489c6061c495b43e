//! Per-channel candidate collection
//!
//! Detects the channel's country and league signals, then gathers exact
//! and prefix-fallback candidates from the shared index.

use std::collections::HashMap;

use tracing::debug;

use crate::matching::index::EpgIndex;
use crate::matching::normalizer::NameNormalizer;
use crate::models::{Channel, CountryCode, LeagueCode, MatchQuality, Stream};

/// Normalized keys shorter than this skip the linear prefix scan; they
/// overlap half the catalog by accident.
const MIN_PREFIX_SCAN_LEN: usize = 4;

/// Candidate set for one channel, before ranking.
#[derive(Debug)]
pub(crate) struct CollectedCandidates {
    pub detected_country: CountryCode,
    pub detected_league: Option<LeagueCode>,
    pub normalized_name: String,
    /// Entry id -> how it was found. First write wins, so an id found by
    /// exact lookup is never downgraded by the prefix scan.
    pub candidates: HashMap<i64, MatchQuality>,
}

pub(crate) fn collect(
    normalizer: &NameNormalizer,
    index: &EpgIndex<'_>,
    channel: &Channel,
    streams_of_channel: &[&Stream],
    default_country: &CountryCode,
) -> CollectedCandidates {
    let detected_country = detect_country(normalizer, channel, streams_of_channel)
        .unwrap_or_else(|| default_country.clone());

    let (normalized_name, detected_league) = normalizer.normalize_with_league(&channel.name);

    let mut collected = CollectedCandidates {
        detected_country,
        detected_league,
        normalized_name,
        candidates: HashMap::new(),
    };
    if collected.normalized_name.is_empty() {
        return collected;
    }

    fn add_exact(candidates: &mut HashMap<i64, MatchQuality>, ids: &[i64]) {
        for id in ids {
            candidates.entry(*id).or_insert(MatchQuality::Exact);
        }
    }

    if let Some(league) = &collected.detected_league {
        let key = format!("{}.{}", collected.normalized_name, league);
        add_exact(
            &mut collected.candidates,
            index.ids_by_name_with_league(&key),
        );
    }
    add_exact(
        &mut collected.candidates,
        index.ids_by_tvg_id(&collected.normalized_name),
    );
    add_exact(
        &mut collected.candidates,
        index.ids_by_name(&collected.normalized_name),
    );
    add_exact(
        &mut collected.candidates,
        index.ids_by_call_sign(&collected.normalized_name),
    );
    if let Some(sign) = normalizer.extract_broadcast_call_sign(&channel.name) {
        add_exact(
            &mut collected.candidates,
            index.ids_by_call_sign(sign.as_str()),
        );
    }

    if collected.normalized_name.len() >= MIN_PREFIX_SCAN_LEN {
        let name = collected.normalized_name.as_str();
        for (key, id) in index.all_tvg_ids().iter().chain(index.all_names()) {
            if key.starts_with(name) || name.starts_with(key.as_str()) {
                collected.candidates.entry(*id).or_insert(MatchQuality::Prefix);
            }
        }
    }

    debug!(
        "channel '{}' -> key '{}', country {}, {} candidates",
        channel.name,
        collected.normalized_name,
        collected.detected_country,
        collected.candidates.len()
    );

    collected
}

/// Country signal: stream names first (name, then group name, in stream
/// order), then the channel's own name.
fn detect_country(
    normalizer: &NameNormalizer,
    channel: &Channel,
    streams_of_channel: &[&Stream],
) -> Option<CountryCode> {
    for stream in streams_of_channel {
        if let Some(country) = normalizer.leading_country_token(&stream.name) {
            return Some(country);
        }
        if let Some(group) = &stream.channel_group_name {
            if let Some(country) = normalizer.leading_country_token(group) {
                return Some(country);
            }
        }
    }
    normalizer.leading_country_token(&channel.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::identifier::IdentifierParser;
    use crate::models::EpgEntry;

    fn entry(id: i64, name: &str, tvg_id: &str) -> EpgEntry {
        EpgEntry {
            id,
            name: name.to_string(),
            tvg_id: tvg_id.to_string(),
            source: 1,
        }
    }

    fn channel(name: &str) -> Channel {
        Channel {
            id: 1,
            name: name.to_string(),
            streams: vec![],
        }
    }

    fn stream(id: i64, name: &str, group: Option<&str>) -> Stream {
        Stream {
            id,
            name: name.to_string(),
            channel_group_name: group.map(String::from),
        }
    }

    fn us() -> CountryCode {
        CountryCode::new("us")
    }

    #[test]
    fn test_country_from_stream_name_wins() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "TF1", "TF1.fr")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("DE: TF1");
        let s1 = stream(10, "FR | TF1 HD", Some("UK SPORTS"));
        let collected = collect(&normalizer, &index, &ch, &[&s1], &us());
        assert_eq!(collected.detected_country.as_str(), "fr");
    }

    #[test]
    fn test_country_from_group_then_channel_then_default() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "TF1", "TF1.fr")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("TF1");
        let s1 = stream(10, "TF1 HD", Some("FR | GENERAL"));
        let collected = collect(&normalizer, &index, &ch, &[&s1], &us());
        assert_eq!(collected.detected_country.as_str(), "fr");

        let ch = channel("UK: BBC One");
        let s1 = stream(10, "BBC One", None);
        let collected = collect(&normalizer, &index, &ch, &[&s1], &us());
        assert_eq!(collected.detected_country.as_str(), "uk");

        let ch = channel("ESPN");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        assert_eq!(collected.detected_country.as_str(), "us");
    }

    #[test]
    fn test_empty_normalized_name_returns_no_candidates() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "ESPN", "ESPN.us")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("###");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        assert!(collected.normalized_name.is_empty());
        assert!(collected.candidates.is_empty());
    }

    #[test]
    fn test_exact_beats_prefix_quality() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "ESPN", "ESPN.us"), entry(2, "ESPN 2", "ESPN2.us")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("ESPN");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        // Entry 1 matches exactly and also overlaps in the prefix scan;
        // it must keep its Exact quality.
        assert_eq!(collected.candidates.get(&1), Some(&MatchQuality::Exact));
        // Entry 2 is only reachable through the prefix scan.
        assert_eq!(collected.candidates.get(&2), Some(&MatchQuality::Prefix));
    }

    #[test]
    fn test_short_keys_skip_prefix_scan() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "CNN International", "CNNInternational.us")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("CNN");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        assert!(collected.candidates.is_empty());
    }

    #[test]
    fn test_call_sign_candidates_from_channel_name() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [entry(1, "KATU", "KATU.us")];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("2.2 | ABC: KATU Portland");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        assert_eq!(collected.candidates.get(&1), Some(&MatchQuality::Exact));
    }

    #[test]
    fn test_league_keyed_candidates() {
        let normalizer = NameNormalizer::new();
        let parser = IdentifierParser::new();
        let entries = [
            entry(1, "Arizona Cardinals", "arizonacardinals.nfl"),
            entry(2, "Cardinals US Feed", "arizonacardinals.us"),
        ];
        let index = EpgIndex::build(&normalizer, &parser, &entries);

        let ch = channel("NFL: Arizona Cardinals");
        let collected = collect(&normalizer, &index, &ch, &[], &us());
        assert_eq!(collected.detected_league.as_ref().unwrap().as_str(), "nfl");
        assert_eq!(collected.candidates.len(), 2);
        assert_eq!(collected.candidates.get(&1), Some(&MatchQuality::Exact));
        assert_eq!(collected.candidates.get(&2), Some(&MatchQuality::Exact));
    }
}

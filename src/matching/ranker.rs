//! Candidate ranking and confidence scoring
//!
//! Ranking is a nine-key comparator evaluated top to bottom, first
//! non-tie decides. The confidence score is a separate bounded 0-100
//! estimate used for display and status, never for ordering.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::matching::index::{EpgIndex, Region};
use crate::matching::tables;
use crate::models::{
    Channel, CountryCode, EpgEntry, LeagueCode, MatchQuality, ScoredMatch,
};

/// Per-channel signals the comparator needs for every pairwise decision.
pub(crate) struct RankContext<'c> {
    pub normalized_name: &'c str,
    pub detected_country: &'c CountryCode,
    pub detected_league: Option<&'c LeagueCode>,
    pub desired_region: Region,
    /// Special punctuation present in the raw channel name.
    shared_punctuation: Vec<char>,
}

impl<'c> RankContext<'c> {
    pub fn new(
        channel: &'c Channel,
        normalized_name: &'c str,
        detected_country: &'c CountryCode,
        detected_league: Option<&'c LeagueCode>,
    ) -> Self {
        Self {
            normalized_name,
            detected_country,
            detected_league,
            desired_region: Region::desired_for(&channel.name),
            shared_punctuation: tables::SPECIAL_PUNCTUATION
                .iter()
                .copied()
                .filter(|c| channel.name.contains(*c))
                .collect(),
        }
    }
}

/// One candidate entering the ranking stage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub epg: &'a EpgEntry,
    pub quality: MatchQuality,
}

/// Sorts the deduplicated candidate set and derives the scored listing.
/// Returns (comparator-ordered matches, confidence-ordered scored
/// matches).
pub(crate) fn rank<'a>(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'a>,
    candidates: &HashMap<i64, MatchQuality>,
) -> (Vec<&'a EpgEntry>, Vec<ScoredMatch<'a>>) {
    let mut ranked: Vec<Candidate<'a>> = candidates
        .iter()
        .filter_map(|(id, quality)| {
            index.entry(*id).map(|epg| Candidate {
                epg,
                quality: *quality,
            })
        })
        .collect();

    ranked.sort_by(|a, b| compare(ctx, index, a, b));

    let matches: Vec<&'a EpgEntry> = ranked.iter().map(|c| c.epg).collect();

    let mut scored: Vec<ScoredMatch<'a>> = ranked
        .iter()
        .map(|c| ScoredMatch {
            epg: c.epg,
            confidence: confidence(ctx, index, c),
        })
        .collect();
    // Stable: confidence ties keep the comparator order.
    scored.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    (matches, scored)
}

/// The ordering comparator. Composed as a short-circuit chain so each
/// tie-break stays auditable on its own.
pub(crate) fn compare(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    league_match(ctx, index, a, b)
        .then_with(|| country_match(ctx, index, a, b))
        .then_with(|| quality_rank(ctx, a, b))
        .then_with(|| shared_punctuation(ctx, a, b))
        .then_with(|| prefix_direction(ctx, index, a, b))
        .then_with(|| length_similarity(ctx, index, a, b))
        .then_with(|| regional_preference(ctx, index, a, b))
        .then_with(|| hd_call_sign_quality(ctx, index, a, b))
        .then_with(|| a.epg.name.cmp(&b.epg.name))
        .then_with(|| a.epg.id.cmp(&b.epg.id))
}

fn rank_bool(a: bool, b: bool) -> Ordering {
    // true sorts first
    b.cmp(&a)
}

fn league_match(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    let Some(league) = ctx.detected_league else {
        return Ordering::Equal;
    };
    rank_bool(
        index.league_of(a.epg.id) == Some(league),
        index.league_of(b.epg.id) == Some(league),
    )
}

fn country_match(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    rank_bool(
        index.country_of(a.epg.id) == Some(ctx.detected_country),
        index.country_of(b.epg.id) == Some(ctx.detected_country),
    )
}

fn quality_rank(ctx: &RankContext<'_>, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    // Too-short keys make Exact vs Prefix meaningless.
    if ctx.normalized_name.len() <= 2 {
        return Ordering::Equal;
    }
    rank_bool(
        a.quality == MatchQuality::Exact,
        b.quality == MatchQuality::Exact,
    )
}

fn shared_punctuation(ctx: &RankContext<'_>, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    if ctx.shared_punctuation.is_empty() {
        return Ordering::Equal;
    }
    let shares = |c: &Candidate<'_>| {
        ctx.shared_punctuation
            .iter()
            .any(|p| c.epg.name.contains(*p) || c.epg.tvg_id.contains(*p))
    };
    rank_bool(shares(a), shares(b))
}

fn prefix_direction(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    let forward = |c: &Candidate<'_>| {
        index
            .normalized_tvg_id_of(c.epg.id)
            .map(|key| key.starts_with(ctx.normalized_name))
            .unwrap_or(false)
    };
    rank_bool(forward(a), forward(b))
}

fn length_similarity(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    let diff = |c: &Candidate<'_>| {
        let len = index
            .normalized_tvg_id_of(c.epg.id)
            .map(str::len)
            .unwrap_or(0);
        len.abs_diff(ctx.normalized_name.len())
    };
    diff(a).cmp(&diff(b))
}

fn regional_preference(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    // Matching feed first, then non-regional, then the wrong region.
    let rank = |c: &Candidate<'_>| match index.region_of(c.epg.id) {
        Some(region) if region == ctx.desired_region => 0u8,
        None => 1,
        Some(_) => 2,
    };
    rank(a).cmp(&rank(b))
}

/// Combined HD-variant / call-sign step. HD wins between an HD and a
/// non-HD candidate unless the non-HD one is clearly the better station
/// match (call-sign score at least 2 higher while the HD one scores <= 1).
fn hd_call_sign_quality(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
) -> Ordering {
    let a_hd = index.is_hd_variant(a.epg.id);
    let b_hd = index.is_hd_variant(b.epg.id);
    let a_score = call_sign_score(ctx, index, a);
    let b_score = call_sign_score(ctx, index, b);

    if a_hd != b_hd {
        let (hd_score, other_score) = if a_hd { (a_score, b_score) } else { (b_score, a_score) };
        let prefer_non_hd = other_score >= hd_score + 2 && hd_score <= 1;
        let a_first = if a_hd { !prefer_non_hd } else { prefer_non_hd };
        return if a_first {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    b_score.cmp(&a_score)
}

/// 0-3 station-identity score against the channel's normalized name.
fn call_sign_score(ctx: &RankContext<'_>, index: &EpgIndex<'_>, c: &Candidate<'_>) -> u8 {
    let name = ctx.normalized_name;
    let mut best = 0u8;
    for sign in index.call_signs_of(c.epg.id) {
        let score = if tables::strip_call_sign_quality(sign) == name {
            3
        } else if sign.starts_with(name) {
            2
        } else if shares_long_prefix(sign, name) {
            1
        } else {
            0
        };
        best = best.max(score);
    }
    best
}

/// Common prefix covering at least 60% of the shorter string, both at
/// least 4 characters long.
fn shares_long_prefix(a: &str, b: &str) -> bool {
    if a.len() < 4 || b.len() < 4 {
        return false;
    }
    let common = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    common * 10 >= a.len().min(b.len()) * 6
}

/// Bounded 0-100 confidence estimate, independent of the comparator.
pub(crate) fn confidence(
    ctx: &RankContext<'_>,
    index: &EpgIndex<'_>,
    c: &Candidate<'_>,
) -> u8 {
    let name = ctx.normalized_name;
    let candidate_key = index.normalized_tvg_id_of(c.epg.id).unwrap_or("");
    let mut score: u32 = 0;

    // Country agreement, with partial credit for countryless entries when
    // the channel defaulted to the US.
    match index.country_of(c.epg.id) {
        Some(country) if country == ctx.detected_country => score += 40,
        None if ctx.detected_country.is_us() => score += 20,
        _ => {}
    }

    // How the candidate was found, or failing that, how the keys overlap.
    if c.quality == MatchQuality::Exact {
        score += 25;
    } else {
        let forward = !candidate_key.is_empty() && candidate_key.starts_with(name);
        let backward = !candidate_key.is_empty() && name.starts_with(candidate_key);
        score += match (forward, backward) {
            (true, true) => 25,
            (true, false) => 20,
            (false, true) => 15,
            (false, false) => 0,
        };
    }

    // Length similarity.
    let max_len = candidate_key.len().max(name.len()).max(1);
    let diff = candidate_key.len().abs_diff(name.len());
    score += (20.0 * (1.0 - diff as f64 / max_len as f64)).round() as u32;

    // Station identity, credited from parenthesized annotations only.
    let mut sign_bonus = 0u32;
    for sign in index.paren_call_signs_of(c.epg.id) {
        let bonus = if tables::strip_call_sign_quality(sign) == name {
            10
        } else if sign.starts_with(name) {
            7
        } else if name.starts_with(sign.as_str()) {
            5
        } else {
            0
        };
        sign_bonus = sign_bonus.max(bonus);
    }
    score += sign_bonus;

    if index.is_hd_variant(c.epg.id) {
        score += 5;
    }

    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::identifier::IdentifierParser;
    use crate::matching::normalizer::NameNormalizer;

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

    struct Fixture {
        normalizer: NameNormalizer,
        parser: IdentifierParser,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                normalizer: NameNormalizer::new(),
                parser: IdentifierParser::new(),
            }
        }
    }

    fn candidate<'a>(epg: &'a EpgEntry, quality: MatchQuality) -> Candidate<'a> {
        Candidate { epg, quality }
    }

    #[test]
    fn test_league_match_decides_first() {
        let f = Fixture::new();
        let entries = [
            entry(1, "Arizona Cardinals", "arizonacardinals.nfl"),
            entry(2, "Cardinals US Feed", "arizonacardinals.us"),
        ];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("NFL: Arizona Cardinals");
        let country = CountryCode::new("us");
        let league = LeagueCode::new("nfl");
        let ctx = RankContext::new(&ch, "arizonacardinals", &country, Some(&league));

        let a = candidate(&entries[0], MatchQuality::Exact);
        let b = candidate(&entries[1], MatchQuality::Exact);
        // The league entry wins even though the other matches the
        // detected country.
        assert_eq!(compare(&ctx, &index, &a, &b), Ordering::Less);
        assert_eq!(compare(&ctx, &index, &b, &a), Ordering::Greater);
    }

    #[test]
    fn test_country_match_decides_second() {
        let f = Fixture::new();
        let entries = [entry(1, "ESPN", "ESPN.us"), entry(2, "ESPN", "ESPN.ca")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("ESPN");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "espn", &country, None);

        let a = candidate(&entries[0], MatchQuality::Exact);
        let b = candidate(&entries[1], MatchQuality::Exact);
        assert_eq!(compare(&ctx, &index, &a, &b), Ordering::Less);
    }

    #[test]
    fn test_exact_sorts_before_prefix() {
        let f = Fixture::new();
        let entries = [entry(1, "ESPN", "ESPN.us"), entry(2, "ESPN 2", "ESPN2.us")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("ESPN");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "espn", &country, None);

        let a = candidate(&entries[0], MatchQuality::Exact);
        let b = candidate(&entries[1], MatchQuality::Prefix);
        assert_eq!(compare(&ctx, &index, &a, &b), Ordering::Less);
    }

    #[test]
    fn test_regional_preference_order() {
        let f = Fixture::new();
        let entries = [
            entry(1, "AMC", "AMC(West).us"),
            entry(2, "AMC", "AMC.us"),
            entry(3, "AMC", "AMC(East).us"),
        ];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("AMC West");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "amc", &country, None);
        assert_eq!(ctx.desired_region, Region::West);

        let west = candidate(&entries[0], MatchQuality::Exact);
        let plain = candidate(&entries[1], MatchQuality::Exact);
        let east = candidate(&entries[2], MatchQuality::Exact);

        assert_eq!(compare(&ctx, &index, &west, &plain), Ordering::Less);
        assert_eq!(compare(&ctx, &index, &plain, &east), Ordering::Less);
        assert_eq!(compare(&ctx, &index, &west, &east), Ordering::Less);
    }

    #[test]
    fn test_hd_preferred_unless_station_match_is_clearly_better() {
        let f = Fixture::new();
        let entries = [
            entry(1, "Portland Feed HD", "PDXFeed(FEEDHD).us"),
            entry(2, "KATU", "KATU(KATU).us"),
        ];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("KATU");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "katu", &country, None);

        let hd = candidate(&entries[0], MatchQuality::Exact);
        let station = candidate(&entries[1], MatchQuality::Exact);
        // Non-HD has call-sign score 3, HD has 0: the station match wins.
        assert_eq!(
            hd_call_sign_quality(&ctx, &index, &hd, &station),
            Ordering::Greater
        );

        // Without a call-sign edge the HD variant wins.
        let entries2 = [entry(3, "AMC HD", "amc.us"), entry(4, "AMC", "amc2.us")];
        let index2 = EpgIndex::build(&f.normalizer, &f.parser, &entries2);
        let ch2 = channel("AMC");
        let ctx2 = RankContext::new(&ch2, "amc", &country, None);
        let hd2 = candidate(&entries2[0], MatchQuality::Exact);
        let plain2 = candidate(&entries2[1], MatchQuality::Exact);
        assert_eq!(
            hd_call_sign_quality(&ctx2, &index2, &hd2, &plain2),
            Ordering::Less
        );
    }

    #[test]
    fn test_alphabetical_final_tiebreak() {
        let f = Fixture::new();
        let entries = [entry(1, "ESPN Two", "ESPN.us"), entry(2, "ESPN One", "ESPN.us")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("ESPN");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "espn", &country, None);

        let a = candidate(&entries[0], MatchQuality::Exact);
        let b = candidate(&entries[1], MatchQuality::Exact);
        assert_eq!(compare(&ctx, &index, &a, &b), Ordering::Greater);
    }

    #[test]
    fn test_confidence_bounds_and_components() {
        let f = Fixture::new();
        let entries = [entry(1, "ESPN", "ESPN.us")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("ESPN");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "espn", &country, None);

        let c = candidate(&entries[0], MatchQuality::Exact);
        // 40 country + 25 exact + 20 length = 85.
        assert_eq!(confidence(&ctx, &index, &c), 85);
    }

    #[test]
    fn test_confidence_partial_country_credit() {
        let f = Fixture::new();
        let entries = [entry(1, "ESPN", "ESPN")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("ESPN");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "espn", &country, None);

        let c = candidate(&entries[0], MatchQuality::Exact);
        // 20 countryless-US + 25 exact + 20 length = 65.
        assert_eq!(confidence(&ctx, &index, &c), 65);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let f = Fixture::new();
        let entries = [entry(1, "KATU HD", "KATU(KATU).us")];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("KATU");
        let country = CountryCode::new("us");
        let ctx = RankContext::new(&ch, "katu", &country, None);

        let c = candidate(&entries[0], MatchQuality::Exact);
        let score = confidence(&ctx, &index, &c);
        assert!(score <= 100);
        // 40 + 25 + 20 + 10 + 5 = 100 exactly.
        assert_eq!(score, 100);
    }

    #[test]
    fn test_rank_orders_scored_by_confidence() {
        let f = Fixture::new();
        let entries = [
            entry(1, "Cardinals US Feed", "arizonacardinals.us"),
            entry(2, "Arizona Cardinals", "arizonacardinals.nfl"),
        ];
        let index = EpgIndex::build(&f.normalizer, &f.parser, &entries);

        let ch = channel("NFL: Arizona Cardinals");
        let country = CountryCode::new("us");
        let league = LeagueCode::new("nfl");
        let ctx = RankContext::new(&ch, "arizonacardinals", &country, Some(&league));

        let mut candidates = HashMap::new();
        candidates.insert(1, MatchQuality::Exact);
        candidates.insert(2, MatchQuality::Exact);

        let (matches, scored) = rank(&ctx, &index, &candidates);
        assert_eq!(matches.len(), 2);
        // Comparator puts the league entry first.
        assert_eq!(matches[0].id, 2);
        // Scored listing is sorted by confidence descending.
        assert!(scored[0].confidence >= scored[1].confidence);
        for s in &scored {
            assert!(s.confidence <= 100);
        }
    }
}

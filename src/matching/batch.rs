//! Batch coordination
//!
//! Builds the catalog index once, drives the collector and ranker across
//! all channels in input order, and applies the optional source-priority
//! re-ranking. The async variant yields cooperatively so an interactive
//! host stays responsive during large batches; results are identical to
//! the synchronous form.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::matching::collector;
use crate::matching::identifier::IdentifierParser;
use crate::matching::index::EpgIndex;
use crate::matching::normalizer::NameNormalizer;
use crate::matching::ranker::{self, RankContext};
use crate::models::{
    Channel, ChannelMatchResult, CountryCode, EpgEntry, MatchStatus, ScoredMatch, Stream,
};

/// Read-only input for one batch run.
pub struct MatchBatch<'a> {
    pub channels: &'a [Channel],
    pub streams: &'a [Stream],
    pub epg_entries: &'a [EpgEntry],
    /// EPG source ids in priority order, first is highest. Sources not
    /// listed rank below every listed one.
    pub source_priority: Option<Vec<i64>>,
}

/// The matching engine. Construct once, run any number of batches; all
/// patterns are compiled at construction and every batch gets a fresh
/// index.
pub struct MatchEngine {
    normalizer: NameNormalizer,
    parser: IdentifierParser,
    default_country: CountryCode,
    yield_every: usize,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            normalizer: NameNormalizer::new(),
            parser: IdentifierParser::new(),
            default_country: CountryCode::new(config.default_country),
            yield_every: config.yield_every.max(1),
        }
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    pub fn parser(&self) -> &IdentifierParser {
        &self.parser
    }

    /// Synchronous batch run. One result per input channel, same order.
    pub fn run_batch<'a>(&self, batch: &MatchBatch<'a>) -> Vec<ChannelMatchResult<'a>> {
        self.run_batch_with_progress(batch, |_, _, _| {})
    }

    /// Synchronous batch run with a progress callback, invoked before
    /// each channel with (zero-based index, total, channel name).
    pub fn run_batch_with_progress<'a, F>(
        &self,
        batch: &MatchBatch<'a>,
        mut on_progress: F,
    ) -> Vec<ChannelMatchResult<'a>>
    where
        F: FnMut(usize, usize, &str),
    {
        let started = Instant::now();
        let index = EpgIndex::build(&self.normalizer, &self.parser, batch.epg_entries);
        let streams_by_id = Self::streams_by_id(batch);

        let total = batch.channels.len();
        info!(
            "Starting EPG match batch: {} channels against {} catalog entries",
            total,
            batch.epg_entries.len()
        );

        let mut results = Vec::with_capacity(total);
        for (i, channel) in batch.channels.iter().enumerate() {
            on_progress(i, total, &channel.name);
            results.push(self.match_channel(channel, &streams_by_id, &index, batch));
        }

        info!(
            "EPG match batch finished: {} channels in {:?}",
            total,
            started.elapsed()
        );
        results
    }

    /// Cooperative batch run: identical results, but control is yielded
    /// back to the runtime every `yield_every` channels.
    pub async fn run_batch_yielding<'a, F>(
        &self,
        batch: &MatchBatch<'a>,
        mut on_progress: F,
    ) -> Vec<ChannelMatchResult<'a>>
    where
        F: FnMut(usize, usize, &str),
    {
        let started = Instant::now();
        let index = EpgIndex::build(&self.normalizer, &self.parser, batch.epg_entries);
        let streams_by_id = Self::streams_by_id(batch);

        let total = batch.channels.len();
        info!(
            "Starting EPG match batch: {} channels against {} catalog entries",
            total,
            batch.epg_entries.len()
        );

        let mut results = Vec::with_capacity(total);
        for (i, channel) in batch.channels.iter().enumerate() {
            if i > 0 && i % self.yield_every == 0 {
                tokio::task::yield_now().await;
            }
            on_progress(i, total, &channel.name);
            results.push(self.match_channel(channel, &streams_by_id, &index, batch));
        }

        info!(
            "EPG match batch finished: {} channels in {:?}",
            total,
            started.elapsed()
        );
        results
    }

    fn streams_by_id<'a>(batch: &MatchBatch<'a>) -> HashMap<i64, &'a Stream> {
        batch.streams.iter().map(|s| (s.id, s)).collect()
    }

    fn match_channel<'a>(
        &self,
        channel: &'a Channel,
        streams_by_id: &HashMap<i64, &'a Stream>,
        index: &EpgIndex<'a>,
        batch: &MatchBatch<'a>,
    ) -> ChannelMatchResult<'a> {
        let streams_of_channel: Vec<&Stream> = channel
            .streams
            .iter()
            .filter_map(|id| streams_by_id.get(id).copied())
            .collect();

        let collected = collector::collect(
            &self.normalizer,
            index,
            channel,
            &streams_of_channel,
            &self.default_country,
        );

        if collected.normalized_name.is_empty() {
            return ChannelMatchResult {
                channel,
                detected_country: Some(collected.detected_country),
                normalized_name: collected.normalized_name,
                matches: Vec::new(),
                matches_with_scores: Vec::new(),
                best_score: 0,
                status: MatchStatus::None,
            };
        }

        let ctx = RankContext::new(
            channel,
            &collected.normalized_name,
            &collected.detected_country,
            collected.detected_league.as_ref(),
        );
        let (mut matches, mut scored) = ranker::rank(&ctx, index, &collected.candidates);
        let mut status = MatchStatus::from_match_count(matches.len());

        if let Some(priority) = &batch.source_priority {
            if matches.len() > 1 {
                apply_source_priority(&mut matches, &mut scored, &mut status, priority);
            }
        }

        let best_score = scored.first().map(|s| s.confidence).unwrap_or(0);
        debug!(
            "channel '{}': {:?}, best score {}",
            channel.name, status, best_score
        );

        ChannelMatchResult {
            channel,
            detected_country: Some(collected.detected_country),
            normalized_name: collected.normalized_name,
            matches,
            matches_with_scores: scored,
            best_score,
            status,
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-sorts matches by source priority rank (stable, so the comparator
/// order survives within one rank). When exactly one match holds the
/// top rank, the result is narrowed to it and promoted to Exact.
fn apply_source_priority<'a>(
    matches: &mut Vec<&'a EpgEntry>,
    scored: &mut Vec<ScoredMatch<'a>>,
    status: &mut MatchStatus,
    priority: &[i64],
) {
    let rank_of =
        |source: i64| priority.iter().position(|p| *p == source).unwrap_or(usize::MAX);

    matches.sort_by_key(|epg| rank_of(epg.source));

    let top_rank = rank_of(matches[0].source);
    let top_count = matches
        .iter()
        .filter(|epg| rank_of(epg.source) == top_rank)
        .count();
    if top_count == 1 {
        let winner_id = matches[0].id;
        matches.truncate(1);
        scored.retain(|s| s.epg.id == winner_id);
        *status = MatchStatus::Exact;
    }
}

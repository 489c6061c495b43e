//! EPG name-normalization and match-ranking engine
//!
//! Turns noisy playlist channel names into canonical keys, indexes an EPG
//! catalog once per batch, and ranks candidate entries per channel with a
//! deterministic multi-key comparator plus an independent 0-100
//! confidence score. Pure computation: no I/O, no shared state, total
//! over all inputs.

pub mod batch;
pub(crate) mod collector;
pub mod identifier;
pub mod index;
pub mod normalizer;
pub(crate) mod ranker;
pub mod tables;

pub use batch::{MatchBatch, MatchEngine};
pub use identifier::{IdentifierParser, ParsedIdentifier};
pub use index::{EpgIndex, Region};
pub use normalizer::NameNormalizer;

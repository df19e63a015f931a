//! Genomic intervals, records and the chromosome-partitioned [`GenomicIndex`]
//!
//! All coordinates are 0-based and half-open (`[start, end)`).
//!
//! - [`Interval`]: a named, immutable range on a chromosome
//! - [`GenomicRecord`]: the capability shared by everything that embeds an [`Interval`]
//! - [`Gene`] and [`Cnv`]: the two record types of an analysis
//! - [`GenomicIndex`]: a keyed interval index with any-, complete- and
//!   reciprocal-overlap queries
mod chromosome;
mod index;
mod interval;
mod records;

pub use chromosome::{chromosome_key, ChromosomeKey};
pub use index::GenomicIndex;
pub use interval::{GenomicRecord, Interval};
pub use records::{Cnv, CnvType, Gene};

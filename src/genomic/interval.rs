use std::cmp::Ordering;
use std::fmt::Display;

use crate::genomic::chromosome_key;
use crate::{PhenomatchError, PhenomatchResult};

/// A named, half-open genomic range `[start, end)` on a chromosome
///
/// Intervals are immutable once constructed. Zero-length intervals
/// (`start == end`) are valid and are used as breakpoint markers.
///
/// Intervals are ordered by chromosome (natural order, see
/// [`chromosome_key`]), then start, end and name.
///
/// # Examples
///
/// ```
/// use phenomatch::Interval;
///
/// let gene = Interval::new("chr1", 5, 16, "instance").unwrap();
/// assert_eq!(gene.len(), 11);
/// assert_eq!(gene.to_string(), "instance:chr1:[5,16)");
///
/// assert!(Interval::new("chr1", -1, 1, "negative").is_err());
/// assert!(Interval::new("chr1", 10, 1, "inverted").is_err());
/// assert!(Interval::new("chr1", 10, 10, "breakpoint").is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    chr: String,
    start: u32,
    end: u32,
    name: String,
}

impl Interval {
    /// Constructs a new [`Interval`]
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::InvalidInterval`] if `start < 0`, `start > end`
    /// or if a coordinate does not fit into `u32`
    pub fn new<C: Into<String>, N: Into<String>>(
        chr: C,
        start: i64,
        end: i64,
        name: N,
    ) -> PhenomatchResult<Self> {
        let chr = chr.into();
        match (u32::try_from(start), u32::try_from(end)) {
            (Ok(s), Ok(e)) if s <= e => Ok(Self::from_parts(chr, s, e, name)),
            _ => Err(PhenomatchError::InvalidInterval { chr, start, end }),
        }
    }

    /// Constructs an interval from coordinates that are known to be valid
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `start > end`
    pub(crate) fn from_parts<C: Into<String>, N: Into<String>>(
        chr: C,
        start: u32,
        end: u32,
        name: N,
    ) -> Self {
        debug_assert!(start <= end, "interval start must not exceed its end");
        Self {
            chr: chr.into(),
            start,
            end,
            name: name.into(),
        }
    }

    /// The chromosome, e.g. `chr22`
    pub fn chr(&self) -> &str {
        &self.chr
    }

    /// 0-based start coordinate (inclusive)
    pub fn start(&self) -> u32 {
        self.start
    }

    /// 0-based end coordinate (exclusive)
    pub fn end(&self) -> u32 {
        self.end
    }

    /// The name or ID of the interval
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the length `end - start`
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for zero-length intervals
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if both intervals are on the same chromosome and
    /// `self.start < other.end && other.start < self.end`
    pub fn any_overlap(&self, other: &Interval) -> bool {
        self.chr == other.chr && self.start < other.end && other.start < self.end
    }

    /// Returns `true` if `other` lies completely within `self`
    ///
    /// The relation is directed: `self` is the containing interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.chr == other.chr && self.start <= other.start && other.end <= self.end
    }

    /// Returns the number of bases shared by both intervals
    pub fn overlap_length(&self, other: &Interval) -> u32 {
        if self.chr != other.chr {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }

    /// Returns `true` if the shared region covers at least `fraction` of
    /// both intervals
    ///
    /// Both comparisons are inclusive. Intervals without a shared base, and
    /// zero-length intervals, never overlap reciprocally, not even for a
    /// `fraction` of `0.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::Interval;
    ///
    /// let a = Interval::new("chr1", 0, 10, "a").unwrap();
    /// let b = Interval::new("chr1", 5, 15, "b").unwrap();
    ///
    /// assert!(a.reciprocal_overlap(&b, 0.5));
    /// assert!(!a.reciprocal_overlap(&b, 0.51));
    /// ```
    pub fn reciprocal_overlap(&self, other: &Interval, fraction: f64) -> bool {
        let shared = self.overlap_length(other);
        if shared == 0 {
            return false;
        }
        let shared = f64::from(shared);
        shared / f64::from(self.len()) >= fraction && shared / f64::from(other.len()) >= fraction
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        chromosome_key(&self.chr)
            .cmp(&chromosome_key(&other.chr))
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:[{},{})", self.name, self.chr, self.start, self.end)
    }
}

/// Shared capability of everything that is located on the genome
///
/// [`crate::Gene`]s and [`crate::Cnv`]s embed an [`Interval`] by value and
/// expose it through this trait, so that they can be stored in a
/// [`crate::GenomicIndex`].
pub trait GenomicRecord {
    /// The location of the record
    fn interval(&self) -> &Interval;

    /// The chromosome of the record
    fn chr(&self) -> &str {
        self.interval().chr()
    }

    /// 0-based start coordinate (inclusive)
    fn start(&self) -> u32 {
        self.interval().start()
    }

    /// 0-based end coordinate (exclusive)
    fn end(&self) -> u32 {
        self.interval().end()
    }

    /// The unique name of the record
    fn name(&self) -> &str {
        self.interval().name()
    }

    /// Length of the record, `end - start`
    fn length(&self) -> u32 {
        self.interval().len()
    }
}

impl GenomicRecord for Interval {
    fn interval(&self) -> &Interval {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn iv(chr: &str, start: i64, end: i64) -> Interval {
        Interval::new(chr, start, end, "x").unwrap()
    }

    #[test]
    fn rejects_invalid_coordinates() {
        assert!(matches!(
            Interval::new("chr1", -1, 1, "wrong"),
            Err(PhenomatchError::InvalidInterval { start: -1, .. })
        ));
        assert!(Interval::new("chr1", 10, 1, "wrong").is_err());
        assert!(Interval::new("chr1", 0, i64::from(u32::MAX) + 1, "wrong").is_err());
    }

    #[test]
    fn accessors() {
        let gi = Interval::new("chr1", 0, 1, "name").unwrap();
        assert_eq!(gi.chr(), "chr1");
        assert_eq!(gi.start(), 0);
        assert_eq!(gi.end(), 1);
        assert_eq!(gi.name(), "name");
        assert_eq!(gi.to_string(), "name:chr1:[0,1)");
    }

    #[test]
    fn has_overlap() {
        let instance = iv("chr1", 5, 16);
        assert!(instance.any_overlap(&iv("chr1", 10, 20)));
        assert!(!instance.any_overlap(&iv("chr1", 20, 30)));
        // half-open: touching intervals do not overlap
        assert!(!instance.any_overlap(&iv("chr1", 16, 20)));
        assert!(!instance.any_overlap(&iv("chr2", 10, 20)));
    }

    #[test]
    fn containment_is_directed() {
        let outer = iv("chr1", 5, 16);
        let inner = iv("chr1", 6, 16);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&iv("chr1", 5, 5)));
    }

    #[test]
    fn overlap_length() {
        assert_eq!(iv("chr1", 5, 16).overlap_length(&iv("chr1", 10, 20)), 6);
        assert_eq!(iv("chr1", 5, 16).overlap_length(&iv("chr1", 20, 30)), 0);
        assert_eq!(iv("chr1", 5, 16).overlap_length(&iv("chr2", 5, 16)), 0);
    }

    #[test]
    fn reciprocal_overlap_is_symmetric() {
        let a = iv("chr1", 0, 100);
        let b = iv("chr1", 20, 140);
        for fraction in [0.1, 0.5, 0.66, 0.67, 0.8, 1.0] {
            assert_eq!(
                a.reciprocal_overlap(&b, fraction),
                b.reciprocal_overlap(&a, fraction)
            );
        }
        // 80 shared bases: 0.8 of a, 0.666 of b
        assert!(a.reciprocal_overlap(&b, 0.66));
        assert!(!a.reciprocal_overlap(&b, 0.67));
    }

    #[test]
    fn reciprocal_overlap_zero_length() {
        let a = iv("chr1", 10, 10);
        let b = iv("chr1", 0, 20);
        assert!(!a.reciprocal_overlap(&b, 0.0));
        assert!(!b.reciprocal_overlap(&a, 0.0));
    }

    #[test]
    fn reciprocal_overlap_needs_shared_bases() {
        let a = iv("chr1", 0, 10);
        assert!(!a.reciprocal_overlap(&iv("chr1", 20, 30), 0.0));
        assert!(!a.reciprocal_overlap(&iv("chr1", 10, 20), 0.0));
        assert!(!a.reciprocal_overlap(&iv("chr2", 0, 10), 0.0));
        assert!(a.reciprocal_overlap(&iv("chr1", 9, 1000), 0.0));
    }

    #[test]
    fn natural_order() {
        let mut intervals = vec![
            iv("chr10", 0, 5),
            iv("chr2", 10, 20),
            iv("chr2", 5, 30),
            iv("chr2", 5, 10),
            iv("chrX", 0, 1),
        ];
        intervals.sort();
        let order: Vec<(&str, u32, u32)> = intervals
            .iter()
            .map(|i| (i.chr(), i.start(), i.end()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("chr2", 5, 10),
                ("chr2", 5, 30),
                ("chr2", 10, 20),
                ("chr10", 0, 5),
                ("chrX", 0, 1)
            ]
        );
    }
}

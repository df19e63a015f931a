use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt::Debug;

use tracing::warn;

use crate::genomic::{chromosome_key, GenomicRecord, Interval};

/// Position of a record inside its chromosome partition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Slot {
    start: u32,
    end: u32,
    name: String,
}

impl Slot {
    fn of<T: GenomicRecord>(record: &T) -> Self {
        Slot {
            start: record.start(),
            end: record.end(),
            name: record.name().to_string(),
        }
    }
}

/// All records of a single chromosome, sorted by `(start, end, name)`
///
/// `max_len` is the length of the longest record in the partition. It bounds
/// how far left of a query start an overlapping record can begin, which
/// allows a binary search for the first candidate.
#[derive(Debug, Clone, Default)]
struct Partition {
    slots: Vec<Slot>,
    max_len: u32,
}

impl Partition {
    /// Sorts the slots once, for bulk construction
    fn from_slots(mut slots: Vec<Slot>) -> Self {
        slots.sort_unstable();
        let max_len = slots.iter().map(|s| s.end - s.start).max().unwrap_or(0);
        Partition { slots, max_len }
    }

    fn insert(&mut self, slot: Slot) {
        self.max_len = self.max_len.max(slot.end - slot.start);
        let idx = self.slots.partition_point(|s| s < &slot);
        self.slots.insert(idx, slot);
    }

    fn remove(&mut self, slot: &Slot) {
        if let Ok(idx) = self.slots.binary_search(slot) {
            self.slots.remove(idx);
        }
        // `max_len` is left untouched: an upper bound is sufficient
    }

    /// Slots with `slot.start < end && start < slot.end`
    fn any_overlap(&self, start: u32, end: u32) -> impl Iterator<Item = &Slot> {
        let first = self
            .slots
            .partition_point(|s| s.start.saturating_add(self.max_len) <= start);
        self.slots[first..]
            .iter()
            .take_while(move |s| s.start < end)
            .filter(move |s| start < s.end)
    }

    /// Slots with `start <= slot.start && slot.end <= end`
    fn complete_overlap(&self, start: u32, end: u32) -> impl Iterator<Item = &Slot> {
        let first = self.slots.partition_point(|s| s.start < start);
        self.slots[first..]
            .iter()
            .take_while(move |s| s.start <= end)
            .filter(move |s| s.end <= end)
    }
}

/// A keyed, chromosome-partitioned index of genomic records
///
/// Each record is identified by its unique name. Records are grouped by
/// chromosome and every partition is kept sorted, so that overlap queries
/// only scan the matching chromosome and, within it, only the candidate
/// range found by binary search.
///
/// Inserting a record with a name that is already present replaces the
/// previous record (last write wins) and logs a warning.
///
/// All queries return records in natural order (see [`Interval`]).
///
/// # Examples
///
/// ```
/// use phenomatch::{GenomicIndex, Interval};
///
/// let genes: GenomicIndex<Interval> = vec![
///     Interval::new("chr1", 1000, 2000, "BRCA1").unwrap(),
///     Interval::new("chr1", 5000, 6000, "TP53").unwrap(),
///     Interval::new("chr2", 1000, 3000, "EGFR").unwrap(),
/// ]
/// .into_iter()
/// .collect();
///
/// let query = Interval::new("chr1", 1500, 5500, "query").unwrap();
///
/// let hits: Vec<&str> = genes.find_any_overlap(&query).iter().map(|g| g.name()).collect();
/// assert_eq!(hits, vec!["BRCA1", "TP53"]);
///
/// assert!(genes.find_complete_overlap(&query).is_empty());
/// ```
#[derive(Clone)]
pub struct GenomicIndex<T> {
    records: HashMap<String, T>,
    partitions: HashMap<String, Partition>,
}

impl<T> Default for GenomicIndex<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            partitions: HashMap::new(),
        }
    }
}

impl<T: GenomicRecord> Debug for GenomicIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.values().map(GenomicRecord::interval))
            .finish()
    }
}

impl<T: GenomicRecord> PartialEq for GenomicIndex<T> {
    /// Two indices are equal if they contain records at the same locations
    /// with the same names
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .values()
                .zip(other.values())
                .all(|(a, b)| a.interval() == b.interval())
    }
}

impl<T: GenomicRecord> GenomicIndex<T> {
    /// Constructs a new, empty [`GenomicIndex`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the index contains no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds the record, keyed by its name
    ///
    /// If a record with the same name exists, it is replaced and returned.
    ///
    /// Each insert shifts the sorted partition of the record's chromosome.
    /// Use [`GenomicIndex::extend`] or `collect` to add many records at once.
    pub fn insert(&mut self, record: T) -> Option<T> {
        let slot = Slot::of(&record);
        let chr = record.chr().to_string();

        let previous = self.put(record);
        if let Some(old) = &previous {
            if let Some(partition) = self.partitions.get_mut(old.chr()) {
                partition.remove(&Slot::of(old));
            }
        }

        self.partitions.entry(chr).or_default().insert(slot);
        previous
    }

    /// Stores the record without touching the partitions
    fn put(&mut self, record: T) -> Option<T> {
        match self.records.entry(record.name().to_string()) {
            MapEntry::Occupied(mut entry) => {
                warn!(
                    "Duplicate record name {}, replacing {}",
                    entry.key(),
                    entry.get().interval()
                );
                Some(entry.insert(record))
            }
            MapEntry::Vacant(entry) => {
                entry.insert(record);
                None
            }
        }
    }

    /// Builds all partitions from scratch, sorting each one once
    fn rebuild_partitions(&mut self) {
        let mut slots: HashMap<String, Vec<Slot>> = HashMap::new();
        for record in self.records.values() {
            slots
                .entry(record.chr().to_string())
                .or_default()
                .push(Slot::of(record));
        }
        self.partitions = slots
            .into_iter()
            .map(|(chr, slots)| (chr, Partition::from_slots(slots)))
            .collect();
    }

    /// Returns the record with the given name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.records.get(name)
    }

    /// Returns a mutable reference to the record with the given name
    ///
    /// The location of a record is immutable, so changing a record
    /// through this reference does not affect the index.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.records.get_mut(name)
    }

    /// Returns `true` if a record with this name is present
    pub fn contains_key(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Returns the names of all records in natural order
    pub fn keys(&self) -> Vec<&str> {
        self.values().map(GenomicRecord::name).collect()
    }

    /// Iterates all records in natural order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        let mut chromosomes: Vec<&String> = self.partitions.keys().collect();
        chromosomes.sort_by_key(|chr| chromosome_key(chr));
        chromosomes
            .into_iter()
            .filter_map(|chr| self.partitions.get(chr))
            .flat_map(|partition| partition.slots.iter())
            .filter_map(|slot| self.records.get(&slot.name))
    }

    /// Iterates mutable references to all records in arbitrary order
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.records.values_mut()
    }

    /// Returns all records on the query's chromosome that share at least
    /// one base with the query
    ///
    /// A record `r` is returned if `r.start < query.end && query.start < r.end`.
    pub fn find_any_overlap(&self, query: &Interval) -> Vec<&T> {
        match self.partitions.get(query.chr()) {
            Some(partition) => partition
                .any_overlap(query.start(), query.end())
                .filter_map(|slot| self.records.get(&slot.name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns all records that lie completely within the query
    ///
    /// A record `r` is returned if `query.start <= r.start && r.end <= query.end`.
    pub fn find_complete_overlap(&self, query: &Interval) -> Vec<&T> {
        match self.partitions.get(query.chr()) {
            Some(partition) => partition
                .complete_overlap(query.start(), query.end())
                .filter_map(|slot| self.records.get(&slot.name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns all records that reciprocally overlap the query by at least
    /// `fraction` of both lengths
    ///
    /// See [`Interval::reciprocal_overlap`]
    pub fn find_reciprocal_overlap(&self, query: &Interval, fraction: f64) -> Vec<&T> {
        self.find_any_overlap(query)
            .into_iter()
            .filter(|record| record.interval().reciprocal_overlap(query, fraction))
            .collect()
    }

    /// Keeps only the records for which `keep` returns `true`
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.records.retain(|_, record| keep(record));
        self.rebuild_partitions();
    }
}

impl<T: GenomicRecord + Clone> GenomicIndex<T> {
    /// Returns a new index of all records overlapping the query
    ///
    /// See [`GenomicIndex::find_any_overlap`]
    pub fn any_overlap(&self, query: &Interval) -> Self {
        self.find_any_overlap(query).into_iter().cloned().collect()
    }

    /// Returns a new index of all records completely within the query
    ///
    /// See [`GenomicIndex::find_complete_overlap`]
    pub fn complete_overlap(&self, query: &Interval) -> Self {
        self.find_complete_overlap(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns a new index of all records reciprocally overlapping the query
    ///
    /// See [`GenomicIndex::find_reciprocal_overlap`]
    pub fn reciprocal_overlap(&self, query: &Interval, fraction: f64) -> Self {
        self.find_reciprocal_overlap(query, fraction)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl<T: GenomicRecord> FromIterator<T> for GenomicIndex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut index = GenomicIndex::new();
        index.extend(iter);
        index
    }
}

/// Adds all records and sorts every partition once
///
/// Duplicate names follow [`GenomicIndex::insert`]: the last record wins.
impl<T: GenomicRecord> Extend<T> for GenomicIndex<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut added = false;
        for record in iter {
            self.put(record);
            added = true;
        }
        if added {
            self.rebuild_partitions();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn iv(chr: &str, start: i64, end: i64, name: &str) -> Interval {
        Interval::new(chr, start, end, name).unwrap()
    }

    fn index() -> GenomicIndex<Interval> {
        vec![
            iv("chr1", 0, 10, "a"),
            iv("chr1", 5, 8, "b"),
            iv("chr1", 12, 40, "c"),
            iv("chr1", 38, 39, "d"),
            iv("chr1", 41, 41, "e"),
            iv("chr2", 0, 100, "f"),
        ]
        .into_iter()
        .collect()
    }

    fn brute_force_any<'a>(index: &'a GenomicIndex<Interval>, q: &Interval) -> Vec<&'a str> {
        index
            .values()
            .filter(|r| r.chr() == q.chr() && r.start() < q.end() && q.start() < r.end())
            .map(|r| r.name())
            .collect()
    }

    #[test]
    fn any_overlap_matches_brute_force() {
        let index = index();
        for start in 0..45 {
            for end in start..46 {
                let q = iv("chr1", start, end, "q");
                let found: Vec<&str> = index
                    .find_any_overlap(&q)
                    .iter()
                    .map(|r| r.name())
                    .collect();
                assert_eq!(found, brute_force_any(&index, &q), "query {q}");
            }
        }
    }

    #[test]
    fn complete_overlap_matches_brute_force() {
        let index = index();
        for start in 0..45 {
            for end in start..46 {
                let q = iv("chr1", start, end, "q");
                let found: Vec<&str> = index
                    .find_complete_overlap(&q)
                    .iter()
                    .map(|r| r.name())
                    .collect();
                let expected: Vec<&str> = index
                    .values()
                    .filter(|r| {
                        r.chr() == "chr1" && start as u32 <= r.start() && r.end() <= end as u32
                    })
                    .map(|r| r.name())
                    .collect();
                assert_eq!(found, expected, "query {q}");
            }
        }
    }

    #[test]
    fn other_chromosomes_never_match() {
        let index = index();
        let q = iv("chr3", 0, 1000, "q");
        assert!(index.find_any_overlap(&q).is_empty());
        assert!(index.find_complete_overlap(&q).is_empty());

        let q = iv("chr2", 5, 6, "q");
        let found: Vec<&str> = index.find_any_overlap(&q).iter().map(|r| r.name()).collect();
        assert_eq!(found, vec!["f"]);
    }

    #[test]
    fn duplicate_names_overwrite() {
        let mut index = index();
        let previous = index.insert(iv("chr2", 500, 600, "a"));
        assert_eq!(previous, Some(iv("chr1", 0, 10, "a")));
        assert_eq!(index.len(), 6);

        let q = iv("chr1", 0, 10, "q");
        let found: Vec<&str> = index.find_any_overlap(&q).iter().map(|r| r.name()).collect();
        assert_eq!(found, vec!["b"]);
        assert_eq!(index.get("a").unwrap().chr(), "chr2");
    }

    #[test]
    fn values_in_natural_order() {
        let index: GenomicIndex<Interval> = vec![
            iv("chr10", 0, 10, "x"),
            iv("chr2", 7, 10, "y"),
            iv("chr2", 3, 10, "z"),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.keys(), vec!["z", "y", "x"]);
    }

    #[test]
    fn bulk_build_matches_single_inserts() {
        let records = vec![
            iv("chr1", 12, 40, "c"),
            iv("chr2", 0, 100, "f"),
            iv("chr1", 0, 10, "a"),
            iv("chr1", 0, 500, "long"),
            iv("chr1", 41, 41, "e"),
            iv("chr1", 5, 8, "b"),
            // replaces the long record, so the partition bound shrinks
            iv("chr1", 38, 39, "long"),
        ];

        let mut single = GenomicIndex::new();
        for record in records.clone() {
            single.insert(record);
        }
        let bulk: GenomicIndex<Interval> = records.into_iter().collect();

        assert_eq!(bulk, single);
        assert_eq!(bulk.len(), 6);
        assert_eq!(bulk.partitions["chr1"].max_len, 28);
        for start in 0..45 {
            for end in start..46 {
                let q = iv("chr1", start, end, "q");
                let names = |index: &GenomicIndex<Interval>| -> Vec<String> {
                    index
                        .find_any_overlap(&q)
                        .iter()
                        .map(|r| r.name().to_string())
                        .collect()
                };
                assert_eq!(names(&bulk), names(&single), "query {q}");
                assert_eq!(names(&bulk), brute_force_any(&bulk, &q), "query {q}");
            }
        }
    }

    #[test]
    fn extend_keeps_existing_records() {
        let mut index = index();
        index.extend(vec![iv("chr1", 2, 3, "g"), iv("chrX", 0, 1, "a")]);
        assert_eq!(index.len(), 7);
        assert_eq!(index.get("a").unwrap().chr(), "chrX");
        let found: Vec<&str> = index
            .find_any_overlap(&iv("chr1", 0, 4, "q"))
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(found, vec!["g"]);
    }

    #[test]
    fn retain_rebuilds_partitions() {
        let mut index = index();
        index.retain(|r| r.chr() == "chr2");
        assert_eq!(index.keys(), vec!["f"]);
        assert!(index.find_any_overlap(&iv("chr1", 0, 100, "q")).is_empty());
    }

    #[test]
    fn reciprocal_overlap_query() {
        let index = index();
        let q = iv("chr1", 10, 40, "q");
        let found: Vec<&str> = index
            .find_reciprocal_overlap(&q, 0.9)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(found, vec!["c"]);
    }

    #[test]
    fn owned_subsets() {
        let index = index();
        let subset = index.complete_overlap(&iv("chr1", 0, 12, "q"));
        assert_eq!(subset.keys(), vec!["a", "b"]);
        assert_eq!(subset, index.any_overlap(&iv("chr1", 0, 12, "q")));
    }
}

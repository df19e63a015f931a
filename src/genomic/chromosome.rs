//! Natural ordering of chromosome names
use std::cmp::Ordering;

const RANK_X: u32 = u32::MAX - 3;
const RANK_Y: u32 = u32::MAX - 2;
const RANK_MITO: u32 = u32::MAX - 1;
const RANK_OTHER: u32 = u32::MAX;

/// Sort key of a chromosome name
///
/// Numbered chromosomes come first in numerical order, followed by
/// `X`, `Y` and the mitochondrial chromosome. All other names (contigs,
/// alternative haplotypes) sort last, lexicographically.
/// The `chr` prefix is optional and ignored for ranking.
///
/// The raw name is part of the key, so two different spellings of the
/// same chromosome (`chr1` and `1`) are never considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromosomeKey<'a> {
    rank: u32,
    name: &'a str,
}

impl PartialOrd for ChromosomeKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChromosomeKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.name.cmp(other.name))
    }
}

/// Returns the [`ChromosomeKey`] used to order chromosomes naturally
///
/// # Examples
///
/// ```
/// use phenomatch::genomic::chromosome_key;
///
/// let mut chroms = vec!["chrX", "chr10", "chr2", "chrM", "chr1", "chrUn_gl000220"];
/// chroms.sort_by_key(|chr| chromosome_key(chr));
/// assert_eq!(chroms, vec!["chr1", "chr2", "chr10", "chrX", "chrM", "chrUn_gl000220"]);
/// ```
pub fn chromosome_key(chr: &str) -> ChromosomeKey<'_> {
    let stripped = chr
        .strip_prefix("chr")
        .or_else(|| chr.strip_prefix("Chr"))
        .or_else(|| chr.strip_prefix("CHR"))
        .unwrap_or(chr);

    let rank = match stripped {
        "X" | "x" => RANK_X,
        "Y" | "y" => RANK_Y,
        "M" | "m" | "MT" | "Mt" => RANK_MITO,
        other => other
            .parse::<u32>()
            .ok()
            .filter(|n| *n < RANK_X)
            .unwrap_or(RANK_OTHER),
    };
    ChromosomeKey { rank, name: chr }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn numeric_before_sex_chromosomes() {
        assert!(chromosome_key("chr2") < chromosome_key("chr10"));
        assert!(chromosome_key("chr22") < chromosome_key("chrX"));
        assert!(chromosome_key("chrX") < chromosome_key("chrY"));
        assert!(chromosome_key("chrY") < chromosome_key("chrM"));
    }

    #[test]
    fn prefix_is_optional() {
        assert!(chromosome_key("9") < chromosome_key("chr10"));
        assert!(chromosome_key("X") > chromosome_key("chr21"));
    }

    #[test]
    fn unknown_contigs_sort_last() {
        assert!(chromosome_key("chrM") < chromosome_key("chr1_random"));
        assert!(chromosome_key("GL000192.1") < chromosome_key("chr1_random"));
    }

    #[test]
    fn spelling_is_kept_apart() {
        assert_ne!(chromosome_key("chr1"), chromosome_key("1"));
        assert_eq!(chromosome_key("chr1"), chromosome_key("chr1"));
    }
}

//! Pairs-of-values histogram.

/// Observed counts for one value pair `(2k, 2k+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairBucket {
    /// Even base value `2k`.
    pub base: u8,
    /// Occurrences of `2k`.
    pub n0: u64,
    /// Occurrences of `2k + 1`.
    pub n1: u64,
}

impl PairBucket {
    /// Combined count of both values.
    #[inline]
    pub fn total(&self) -> u64 {
        self.n0 + self.n1
    }

    /// Expected count of each value if the pair were equalized.
    #[inline]
    pub fn expected(&self) -> f64 {
        self.total() as f64 / 2.0
    }
}

/// Value histogram grouped into the 128 adjacent pairs of the 8-bit range.
#[derive(Clone)]
pub struct PairHistogram {
    counts: [u64; 256],
    sample_size: usize,
}

impl PairHistogram {
    /// Counts every sample.
    pub fn from_samples(samples: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &v in samples {
            counts[v as usize] += 1;
        }
        Self {
            counts,
            sample_size: samples.len(),
        }
    }

    /// Builds a histogram from an iterator of samples.
    pub fn from_iter_samples(samples: impl IntoIterator<Item = u8>) -> Self {
        let mut counts = [0u64; 256];
        let mut sample_size = 0;
        for v in samples {
            counts[v as usize] += 1;
            sample_size += 1;
        }
        Self {
            counts,
            sample_size,
        }
    }

    /// Number of samples counted.
    #[inline]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Count for a single value.
    #[inline]
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Number of distinct values observed.
    pub fn distinct_values(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Iterates over all 128 pair buckets, including empty ones.
    pub fn buckets(&self) -> impl Iterator<Item = PairBucket> + '_ {
        self.counts.chunks_exact(2).enumerate().map(|(k, pair)| PairBucket {
            base: (k * 2) as u8,
            n0: pair[0],
            n1: pair[1],
        })
    }
}

impl std::fmt::Debug for PairHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairHistogram")
            .field("sample_size", &self.sample_size)
            .field("distinct_values", &self.distinct_values())
            .finish()
    }
}

//! Binary flipping masks.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::fmt;
use thiserror::Error;

/// Default mask height.
pub const DEFAULT_MASK_ROWS: usize = 8;
/// Default mask width.
pub const DEFAULT_MASK_COLS: usize = 8;

/// Mask construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// A dimension is zero.
    #[error("mask has zero rows or columns")]
    Empty,
    /// An entry is neither 0 nor 1.
    #[error("mask entry {value} at ({row}, {col}) is not 0 or 1")]
    InvalidEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
        /// Offending value.
        value: u8,
    },
    /// Rows of different lengths.
    #[error("mask row {row} has {got} entries, expected {expected}")]
    Ragged {
        /// First row whose length differs from row 0.
        row: usize,
        /// Its length.
        got: usize,
        /// Length of row 0.
        expected: usize,
    },
    /// A flat bit buffer that does not match `rows × cols`.
    #[error("mask buffer holds {got} entries, expected {expected}")]
    BitCount {
        /// Entries supplied.
        got: usize,
        /// `rows × cols`.
        expected: usize,
    },
}

/// A binary grid selecting which pixels of a block are flipped.
///
/// Entries set to `true` are flipped by the positive flip function; the
/// negative flip function uses the complement.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// Creates a mask from row-major bits.
    pub fn new(rows: usize, cols: usize, bits: Vec<bool>) -> Result<Self, MaskError> {
        if rows == 0 || cols == 0 {
            return Err(MaskError::Empty);
        }
        if bits.len() != rows * cols {
            return Err(MaskError::BitCount {
                got: bits.len(),
                expected: rows * cols,
            });
        }
        Ok(Self { rows, cols, bits })
    }

    /// Creates a mask from rows of `0`/`1` entries.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, MaskError> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut bits = Vec::with_capacity(rows.len() * cols);
        for (row, entries) in rows.iter().enumerate() {
            let entries = entries.as_ref();
            if entries.len() != cols {
                return Err(MaskError::Ragged {
                    row,
                    got: entries.len(),
                    expected: cols,
                });
            }
            for (col, &value) in entries.iter().enumerate() {
                match value {
                    0 => bits.push(false),
                    1 => bits.push(true),
                    _ => return Err(MaskError::InvalidEntry { row, col, value }),
                }
            }
        }
        Self::new(rows.len(), cols, bits)
    }

    /// Parses rows written as `0`/`1` characters, the format of [`fmt::Display`].
    pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MaskError> {
        let rows: Vec<Vec<u8>> = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .trim()
                    .bytes()
                    .map(|b| match b {
                        b'0' | b'1' => b - b'0',
                        other => other,
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// Creates a mask with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: bool) -> Result<Self, MaskError> {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    /// Draws each entry uniformly from `{0, 1}`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, MaskError> {
        let bits = (0..rows * cols).map(|_| rng.gen::<bool>()).collect();
        Self::new(rows, cols, bits)
    }

    /// Draws a random mask from a seed, or from OS entropy when `seed` is `None`.
    pub fn seeded(rows: usize, cols: usize, seed: Option<u64>) -> Result<Self, MaskError> {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mask = Self::random(rows, cols, &mut rng)?;
        tracing::debug!(rows, cols, seed = ?seed, ones = mask.ones(), "Generated flipping mask");
        Ok(mask)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major bits.
    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Entry at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.cols + col]
    }

    /// Number of entries set to 1.
    pub fn ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Bitwise complement.
    pub fn negated(&self) -> Mask {
        Mask {
            rows: self.rows,
            cols: self.cols,
            bits: self.bits.iter().map(|&b| !b).collect(),
        }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ones", &self.ones())
            .finish()
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.bits.chunks(self.cols) {
            let line: String = row.iter().map(|&b| if b { '1' } else { '0' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

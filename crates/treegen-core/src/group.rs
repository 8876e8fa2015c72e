use crate::{Result, TreeError};
use std::fmt;

/// Categories handled inline by a small group split.
pub const SMALL_GROUP_BITS: u32 = 32;

/// Widest span a large group split may cover (2 MiB of packed bits).
pub const MAX_GROUP_BITS: u32 = 1 << 24;

/// Packed bitset of categorical levels tested by a group split.
///
/// Bit `i` of the set stands for category `bitoff + i`; bits are packed
/// little-end first into bytes, the same layout the generated code reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSet {
    bits: Vec<u8>,
    nbits: u32,
    bitoff: u32,
}

fn check_span(nbits: u32) -> Result<()> {
    if nbits > MAX_GROUP_BITS {
        return Err(TreeError::InvalidGroupSet(format!(
            "{} bits exceed the limit of {}",
            nbits, MAX_GROUP_BITS
        )));
    }
    Ok(())
}

impl GroupSet {
    pub fn from_raw(bits: Vec<u8>, nbits: u32, bitoff: u32) -> Result<Self> {
        check_span(nbits)?;
        let expected = bytes_for(nbits);
        if bits.len() != expected {
            return Err(TreeError::InvalidGroupSet(format!(
                "{} bits need {} bytes, got {}",
                nbits,
                expected,
                bits.len()
            )));
        }
        Ok(Self {
            bits,
            nbits,
            bitoff,
        })
    }

    /// Build a set from category indices.
    ///
    /// A small set always covers categories `0..32`; a large one spans exactly
    /// from the smallest to the largest member.
    pub fn from_categories(categories: &[u32], small: bool) -> Result<Self> {
        let (bitoff, nbits) = if small {
            if let Some(&too_big) = categories.iter().find(|&&c| c >= SMALL_GROUP_BITS) {
                return Err(TreeError::InvalidGroupSet(format!(
                    "category {} does not fit a small group split",
                    too_big
                )));
            }
            (0, SMALL_GROUP_BITS)
        } else {
            let min = categories
                .iter()
                .copied()
                .min()
                .ok_or_else(|| TreeError::InvalidGroupSet("no categories".into()))?;
            let max = categories.iter().copied().max().unwrap_or(min);
            if min > u32::from(u16::MAX) {
                return Err(TreeError::InvalidGroupSet(format!(
                    "bit offset {} exceeds 16 bits",
                    min
                )));
            }
            let nbits = (max - min).checked_add(1).ok_or_else(|| {
                TreeError::InvalidGroupSet(format!("categories {}..={} span too many bits", min, max))
            })?;
            check_span(nbits)?;
            (min, nbits)
        };

        let mut set = Self {
            bits: vec![0; bytes_for(nbits)],
            nbits,
            bitoff,
        };
        for &category in categories {
            let idx = (category - bitoff) as usize;
            set.bits[idx >> 3] |= 1 << (idx & 7);
        }
        Ok(set)
    }

    pub fn is_small(&self) -> bool {
        self.bitoff == 0 && self.nbits == SMALL_GROUP_BITS
    }

    pub fn nbits(&self) -> u32 {
        self.nbits
    }

    pub fn bitoff(&self) -> u32 {
        self.bitoff
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn num_bytes(&self) -> usize {
        self.bits.len()
    }

    /// Packed bytes in the order they are declared in a byte-array literal.
    pub fn to_byte_literal(&self) -> Vec<u8> {
        self.bits.clone()
    }

    pub fn contains(&self, category: u32) -> bool {
        if category < self.bitoff {
            return false;
        }
        let idx = category - self.bitoff;
        if idx >= self.nbits {
            return false;
        }
        let idx = idx as usize;
        self.bits[idx >> 3] & (1 << (idx & 7)) != 0
    }

    /// Membership of a raw feature value, truncated toward zero. NaN and
    /// values outside the covered range are never members.
    pub fn contains_value(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let category = value.trunc();
        if category < 0.0 || category > f64::from(u32::MAX) {
            return false;
        }
        self.contains(category as u32)
    }

    pub fn categories(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.nbits)
            .filter(move |&i| self.bits[(i >> 3) as usize] & (1 << (i & 7)) != 0)
            .map(move |i| i + self.bitoff)
    }

    /// Write the membership test for `data[col]` against the byte array held
    /// in `field_name`.
    pub fn render_test<W: fmt::Write>(
        &self,
        out: &mut W,
        field_name: &str,
        col: usize,
        col_label: &str,
    ) -> fmt::Result {
        write!(
            out,
            "bitSetContains({}, {}, {}, data[{}] /*{}*/)",
            field_name, self.nbits, self.bitoff, col, col_label
        )
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self
            .categories()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", members)
    }
}

pub(crate) fn bytes_for(nbits: u32) -> usize {
    ((nbits as usize) + 7) / 8
}

//! Compressed binary tree format.
//!
//! Nodes are laid out in pre-order, little-endian:
//!
//! ```text
//! node    := 0x00 value:f32
//!          | 0x01 mode:u8 na:u8 col:u16 payload left_len:u32 left right
//! payload := threshold:f32                     numeric splits
//!          | bits:[u8; 4]                      small group split (categories 0..32)
//!          | bitoff:u16 nbits:u32 bits:[u8]    large group split
//! ```
//!
//! `left_len` is the encoded size of the left subtree so a scorer can jump
//! over it.

use crate::group::bytes_for;
use crate::{DecisionNode, EqualMode, GroupSet, NaSplitDir, Result, TreeCursor, TreeError};
use serde::{Deserialize, Serialize};

pub const LEAF_TAG: u8 = 0x00;
pub const SPLIT_TAG: u8 = 0x01;

/// Owned tree description, the input side of the compressed format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f32,
    },
    Split {
        col: u16,
        #[serde(default)]
        threshold: f32,
        #[serde(default = "default_equal")]
        equal: EqualMode,
        #[serde(default = "default_na")]
        na: NaSplitDir,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        categories: Option<Vec<u32>>,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

fn default_equal() -> EqualMode {
    EqualMode::NumericLt
}

fn default_na() -> NaSplitDir {
    NaSplitDir::Right
}

impl TreeNode {
    pub fn leaf(value: f32) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn numeric(
        col: u16,
        threshold: f32,
        equal: EqualMode,
        na: NaSplitDir,
        left: TreeNode,
        right: TreeNode,
    ) -> Self {
        TreeNode::Split {
            col,
            threshold,
            equal,
            na,
            categories: None,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn group(
        col: u16,
        categories: Vec<u32>,
        small: bool,
        na: NaSplitDir,
        left: TreeNode,
        right: TreeNode,
    ) -> Self {
        TreeNode::Split {
            col,
            threshold: 0.0,
            equal: if small {
                EqualMode::GroupSmall
            } else {
                EqualMode::GroupLarge
            },
            na,
            categories: Some(categories),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TreeError::Description(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TreeError::Description(e.to_string()))
    }

    pub fn internal_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => {
                1 + left.internal_nodes() + right.internal_nodes()
            }
        }
    }

    /// Largest column index referenced by any split, if there is one.
    pub fn max_column(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                col, left, right, ..
            } => [Some(*col as usize), left.max_column(), right.max_column()]
                .into_iter()
                .flatten()
                .max(),
        }
    }

    pub fn compress(&self) -> Result<CompressedTree> {
        let mut bytes = Vec::new();
        self.encode_into(&mut bytes)?;
        Ok(CompressedTree { bytes })
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            TreeNode::Leaf { value } => {
                out.push(LEAF_TAG);
                out.extend_from_slice(&value.to_le_bytes());
            }
            TreeNode::Split {
                col,
                threshold,
                equal,
                na,
                categories,
                left,
                right,
            } => {
                out.push(SPLIT_TAG);
                out.push(equal.code());
                out.push(na.code());
                out.extend_from_slice(&col.to_le_bytes());

                let group = |small: bool| -> Result<GroupSet> {
                    let categories = categories
                        .as_deref()
                        .ok_or(TreeError::MissingGroupSet(*col as usize))?;
                    GroupSet::from_categories(categories, small)
                };
                match equal {
                    EqualMode::NumericLt | EqualMode::NumericNe => {
                        out.extend_from_slice(&threshold.to_le_bytes());
                    }
                    EqualMode::GroupSmall => {
                        out.extend_from_slice(group(true)?.bytes());
                    }
                    EqualMode::GroupLarge => {
                        let set = group(false)?;
                        // from_categories keeps the offset within 16 bits
                        out.extend_from_slice(&(set.bitoff() as u16).to_le_bytes());
                        out.extend_from_slice(&set.nbits().to_le_bytes());
                        out.extend_from_slice(set.bytes());
                    }
                }

                let len_at = out.len();
                out.extend_from_slice(&[0; 4]);
                let start = out.len();
                left.encode_into(out)?;
                let left_len = u32::try_from(out.len() - start).map_err(|_| {
                    TreeError::Description("left subtree exceeds 4 GiB".to_string())
                })?;
                out[len_at..start].copy_from_slice(&left_len.to_le_bytes());
                right.encode_into(out)?;
            }
        }
        Ok(())
    }
}

/// A tree in its compressed byte form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedTree {
    bytes: Vec<u8>,
}

impl CompressedTree {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cursor(&self) -> TreeCursor<'_> {
        TreeCursor::new(&self.bytes)
    }

    /// Score one row by walking the bytes from the root, skipping every left
    /// subtree that is not taken.
    pub fn score(&self, row: &[f64]) -> Result<f64> {
        let mut reader = Reader::new(&self.bytes);
        loop {
            let offset = reader.position();
            match reader.u8()? {
                LEAF_TAG => return Ok(f64::from(reader.f32()?)),
                SPLIT_TAG => {
                    let node = reader.decision()?;
                    let left_len = reader.u32()? as usize;
                    let value = *row.get(node.col).ok_or(TreeError::ColumnOutOfRange {
                        col: node.col,
                        len: row.len(),
                    })?;
                    if !node.goes_left(value)? {
                        reader.take(left_len)?;
                    }
                }
                tag => return Err(TreeError::UnknownNodeTag { tag, offset }),
            }
        }
    }
}

pub(crate) struct Reader<'t> {
    bytes: &'t [u8],
    pos: usize,
}

impl<'t> Reader<'t> {
    pub(crate) fn new(bytes: &'t [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'t [u8]> {
        if self.remaining() < n {
            return Err(TreeError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// Decode the split header and payload that follow a split tag.
    pub(crate) fn decision(&mut self) -> Result<DecisionNode> {
        let equal_mode = EqualMode::from_code(self.u8()?)?;
        let na_dir = NaSplitDir::from_code(self.u8()?)?;
        let col = self.u16()? as usize;

        let (threshold, group_set) = match equal_mode {
            EqualMode::NumericLt | EqualMode::NumericNe => (self.f32()?, None),
            EqualMode::GroupSmall => {
                let bits = self.take(bytes_for(crate::group::SMALL_GROUP_BITS))?;
                let set = GroupSet::from_raw(bits.to_vec(), crate::group::SMALL_GROUP_BITS, 0)?;
                (0.0, Some(set))
            }
            EqualMode::GroupLarge => {
                let bitoff = u32::from(self.u16()?);
                let nbits = self.u32()?;
                let bits = self.take(bytes_for(nbits))?;
                (0.0, Some(GroupSet::from_raw(bits.to_vec(), nbits, bitoff)?))
            }
        };

        Ok(DecisionNode {
            col,
            threshold,
            equal_mode,
            group_set,
            na_dir,
        })
    }
}

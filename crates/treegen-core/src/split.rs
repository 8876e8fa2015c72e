use crate::{GroupSet, Result, TreeError};
use serde::{Deserialize, Serialize};

/// How a decision node compares the feature against its split value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualMode {
    NumericLt,
    NumericNe,
    GroupSmall,
    GroupLarge,
}

impl EqualMode {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::NumericLt),
            1 => Ok(Self::NumericNe),
            2 => Ok(Self::GroupSmall),
            3 => Ok(Self::GroupLarge),
            other => Err(TreeError::UnknownEqualMode(other)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::NumericLt => 0,
            Self::NumericNe => 1,
            Self::GroupSmall => 2,
            Self::GroupLarge => 3,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::GroupSmall | Self::GroupLarge)
    }

    /// Comparison operator of a numeric split, `None` for group splits.
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Self::NumericLt => Some("<"),
            Self::NumericNe => Some("!="),
            Self::GroupSmall | Self::GroupLarge => None,
        }
    }
}

/// Where rows with a missing (NaN) feature go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaSplitDir {
    NaLeft,
    Left,
    Right,
    NaVsRest,
}

impl NaSplitDir {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::NaLeft),
            3 => Ok(Self::Left),
            4 => Ok(Self::Right),
            5 => Ok(Self::NaVsRest),
            other => Err(TreeError::UnknownNaDir(other)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::NaLeft => 1,
            Self::Left => 3,
            Self::Right => 4,
            Self::NaVsRest => 5,
        }
    }

    pub fn nas_go_left(&self) -> bool {
        matches!(self, Self::NaLeft | Self::Left)
    }
}

/// An internal node as handed to visitor callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub col: usize,
    pub threshold: f32,
    pub equal_mode: EqualMode,
    pub group_set: Option<GroupSet>,
    pub na_dir: NaSplitDir,
}

impl DecisionNode {
    pub fn numeric(col: usize, threshold: f32, equal_mode: EqualMode, na_dir: NaSplitDir) -> Self {
        Self {
            col,
            threshold,
            equal_mode,
            group_set: None,
            na_dir,
        }
    }

    pub fn group(col: usize, group_set: GroupSet, na_dir: NaSplitDir) -> Self {
        let equal_mode = if group_set.is_small() {
            EqualMode::GroupSmall
        } else {
            EqualMode::GroupLarge
        };
        Self {
            col,
            threshold: 0.0,
            equal_mode,
            group_set: Some(group_set),
            na_dir,
        }
    }

    /// The group set of a group split, or an error if the node lacks one.
    pub fn required_group_set(&self) -> Result<&GroupSet> {
        self.group_set
            .as_ref()
            .ok_or(TreeError::MissingGroupSet(self.col))
    }

    /// True when a row holding `value` in this node's column takes the left branch.
    ///
    /// Emitted code renders exactly this predicate as the ternary test, so the
    /// then-branch of the generated expression is the left child.
    pub fn goes_left(&self, value: f64) -> Result<bool> {
        let is_na = value.is_nan();
        if self.na_dir == NaSplitDir::NaVsRest {
            return Ok(!is_na);
        }
        let cmp = match self.equal_mode {
            EqualMode::NumericLt => value < f64::from(self.threshold),
            EqualMode::NumericNe => value != f64::from(self.threshold),
            EqualMode::GroupSmall | EqualMode::GroupLarge => {
                self.required_group_set()?.contains_value(value)
            }
        };
        Ok(match self.na_dir {
            NaSplitDir::NaLeft | NaSplitDir::Left => is_na || cmp,
            NaSplitDir::Right => !is_na && cmp,
            NaSplitDir::NaVsRest => !is_na,
        })
    }
}

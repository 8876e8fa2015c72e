use crate::{EmitError, EmitResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub limits: Limits,
    pub indent_style: IndentStyle,
}

impl EmitterConfig {
    pub fn from_json(text: &str) -> EmitResult<Self> {
        serde_json::from_str(text).map_err(|e| EmitError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> EmitResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EmitError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Budgets of one emitted class.
///
/// The `max_*` caps are soft: a frame above any of them is split at the next
/// decision node. The optional ceilings are absolute. A frame that crosses one
/// while writing a leaf cannot be rescued. None are set by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_nodes: usize,
    pub max_cp: usize,
    pub max_static_init: usize,
    pub cp_ceiling: Option<usize>,
    pub static_init_ceiling: Option<usize>,
}

impl Limits {
    pub const MAX_NODES: usize = (1 << 12) / 4;
    pub const MAX_CP: usize = (1 << 16) - 4096;
    pub const MAX_STATIC_INIT: usize = (1 << 16) - 4096;
    /// Constant pool and static initialiser limit of a JVM class file.
    pub const CEILING: usize = (1 << 16) - 1;

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_max_cp(mut self, max_cp: usize) -> Self {
        self.max_cp = max_cp;
        self
    }

    pub fn with_max_static_init(mut self, max_static_init: usize) -> Self {
        self.max_static_init = max_static_init;
        self
    }

    pub fn with_ceilings(mut self, cp_ceiling: usize, static_init_ceiling: usize) -> Self {
        self.cp_ceiling = Some(cp_ceiling);
        self.static_init_ceiling = Some(static_init_ceiling);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: Self::MAX_NODES,
            max_cp: Self::MAX_CP,
            max_static_init: Self::MAX_STATIC_INIT,
            cp_ceiling: None,
            static_init_ceiling: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(2)
    }
}

use crate::buffer::FrameBuffer;
use crate::config::{IndentStyle, Limits};
use std::fmt;

/// Emission state of one generated class: its entry-method body and the
/// running estimates of what the class costs the target compiler.
#[derive(Debug, Clone)]
pub struct EmitFrame {
    pub class_name: String,
    pub body: FrameBuffer,
    pub nodes_count: usize,
    pub cp_size: usize,
    pub static_init_size: usize,
    pub group_split_count: usize,
    /// Depth at which the frame was suspended; meaningful only while stacked.
    pub suspend_depth: usize,
}

impl EmitFrame {
    pub fn new(class_name: impl Into<String>, indent_style: &IndentStyle) -> Self {
        let mut body = FrameBuffer::with_indent(indent_style);
        body.indent_write("double pred = ");
        Self {
            class_name: class_name.into(),
            body,
            nodes_count: 0,
            cp_size: 0,
            static_init_size: 0,
            group_split_count: 0,
            suspend_depth: 0,
        }
    }

    /// True once any soft cap is exceeded; the next decision moves to a new class.
    pub fn is_over_budget(&self, limits: &Limits) -> bool {
        self.nodes_count > limits.max_nodes
            || self.cp_size > limits.max_cp
            || self.static_init_size > limits.max_static_init
    }

    /// True once a configured ceiling is exceeded. Without ceilings this never fires.
    pub fn is_past_ceiling(&self, limits: &Limits) -> bool {
        limits.cp_ceiling.is_some_and(|ceiling| self.cp_size > ceiling)
            || limits
                .static_init_ceiling
                .is_some_and(|ceiling| self.static_init_size > ceiling)
    }

    /// Reserve the next `GRPSPLIT` field name of this class.
    pub fn next_group_field(&mut self) -> String {
        let name = format!("GRPSPLIT{}", self.group_split_count);
        self.group_split_count += 1;
        name
    }

    /// A wide float constant takes two constant-pool slots.
    pub fn charge_float(&mut self) {
        self.cp_size += 2;
    }

    /// Byte-array field: the bytes, a field ref, its name and a NameAndType in
    /// the pool; `newarray` plus dup/bipush/bipush/bastore per byte in the
    /// static initialiser.
    pub fn charge_group_field(&mut self, num_bytes: usize) {
        self.cp_size += num_bytes + 3;
        self.static_init_size += 6 + 6 * num_bytes;
    }
}

impl fmt::Display for EmitFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={}, group_splits={}, cp_size={}, static_init_size={}B",
            self.nodes_count, self.group_split_count, self.cp_size, self.static_init_size
        )
    }
}

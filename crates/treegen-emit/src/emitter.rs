use crate::config::EmitterConfig;
use crate::frame::EmitFrame;
use crate::shape::ExprShape;
use crate::sink::{ClassSink, ClassSpec, FieldSpec, MethodSpec, StagedSink, ENTRY_METHOD};
use crate::{EmitError, EmitResult};
use tracing::{debug, trace};
use treegen_core::{ColumnNames, DecisionNode, EqualMode, NaSplitDir, TreeVisitor, TreeWalk};

/// What one successful [`TreeEmitter::build`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub classes: Vec<String>,
    pub splits: usize,
    pub group_fields: usize,
}

fn no_open_frame() -> EmitError {
    EmitError::MalformedTree("callback outside of an open class frame".to_string())
}

/// Callback half of the tree emitter.
///
/// Writes one ternary expression per tree into the active frame and, when the
/// frame outgrows its budget at a decision node, leaves a forward call in its
/// place and continues the subtree in a fresh sibling class. Suspended frames
/// wait on a stack and resume when the walk climbs back to the depth at which
/// they were suspended. All sink traffic is staged until [`EmitVisitor::finish`].
pub struct EmitVisitor<'a> {
    columns: &'a ColumnNames,
    config: EmitterConfig,
    base_class_name: String,
    active: Option<EmitFrame>,
    suspended: Vec<EmitFrame>,
    next_subtree: usize,
    staged: StagedSink,
    shape: ExprShape,
    classes: Vec<String>,
    splits: usize,
    group_fields: usize,
}

impl<'a> EmitVisitor<'a> {
    pub fn new(
        columns: &'a ColumnNames,
        base_class_name: impl Into<String>,
        config: EmitterConfig,
    ) -> Self {
        Self {
            columns,
            config,
            base_class_name: base_class_name.into(),
            active: None,
            suspended: Vec::new(),
            next_subtree: 0,
            staged: StagedSink::new(),
            shape: ExprShape::default(),
            classes: Vec::new(),
            splits: 0,
            group_fields: 0,
        }
    }

    pub fn class_name(&self, subtree: usize) -> String {
        if subtree == 0 {
            self.base_class_name.clone()
        } else {
            format!("{}_{}", self.base_class_name, subtree)
        }
    }

    /// Open the root frame. Must precede the first callback.
    pub fn begin(&mut self) -> EmitResult<()> {
        if self.next_subtree != 0 {
            return Err(EmitError::MalformedTree(
                "emission already started".to_string(),
            ));
        }
        let subtree = self.next_subtree;
        self.next_subtree += 1;
        self.enter(subtree, 0)
    }

    /// Close the root frame and hand back the staged sink operations.
    pub fn finish(mut self) -> EmitResult<(StagedSink, BuildSummary)> {
        self.shape.finish()?;
        self.leave()?;
        if self.active.is_some() || !self.suspended.is_empty() {
            return Err(EmitError::MalformedTree(format!(
                "{} class frames still open after the root closed",
                self.suspended.len() + usize::from(self.active.is_some())
            )));
        }
        let summary = BuildSummary {
            classes: self.classes,
            splits: self.splits,
            group_fields: self.group_fields,
        };
        Ok((self.staged, summary))
    }

    pub fn active_frame(&self) -> Option<&EmitFrame> {
        self.active.as_ref()
    }

    pub fn suspended_frames(&self) -> usize {
        self.suspended.len()
    }

    fn enter(&mut self, subtree: usize, depth: usize) -> EmitResult<()> {
        if let Some(mut frame) = self.active.take() {
            frame.suspend_depth = depth;
            self.suspended.push(frame);
        }
        let name = self.class_name(subtree);
        self.staged.add_class(ClassSpec::new(name.clone()))?;
        self.classes.push(name.clone());
        self.active = Some(EmitFrame::new(name, &self.config.indent_style));
        Ok(())
    }

    fn leave(&mut self) -> EmitResult<()> {
        let mut frame = self.active.take().ok_or_else(no_open_frame)?;
        frame.body.write(";").newline();
        let diagnostics = frame.to_string();
        frame
            .body
            .indent_write("return pred; // ")
            .write(&diagnostics)
            .newline()
            .close();
        debug!(class = %frame.class_name, %diagnostics, "closing class");

        self.staged.install_method(
            &frame.class_name,
            MethodSpec {
                name: ENTRY_METHOD.to_string(),
                body: frame.body.into_string(),
            },
        )?;
        self.active = self.suspended.pop();
        Ok(())
    }

    fn is_exit_point(&self, depth: usize) -> bool {
        self.suspended
            .last()
            .map_or(false, |frame| frame.suspend_depth == depth)
    }

    fn column_label(&self, col: usize) -> EmitResult<String> {
        self.columns
            .name_of(col)
            .map(|name| name.replace("*/", "*\\/"))
            .ok_or_else(|| {
                EmitError::UnsupportedDecision(format!(
                    "column {} out of range for {} columns",
                    col,
                    self.columns.len()
                ))
            })
    }

    fn split_if_over_budget(&mut self, depth: usize) -> EmitResult<()> {
        let limits = self.config.limits;
        let over_budget = self
            .active
            .as_ref()
            .ok_or_else(no_open_frame)?
            .is_over_budget(&limits);
        if !over_budget {
            return Ok(());
        }

        let subtree = self.next_subtree;
        self.next_subtree += 1;
        let callee = self.class_name(subtree);

        let frame = self.active.as_mut().ok_or_else(no_open_frame)?;
        debug!(from = %frame.class_name, to = %callee, depth, stats = %frame, "splitting class");
        frame
            .body
            .write(&callee)
            .write(".")
            .write(ENTRY_METHOD)
            .write("(data)");
        self.splits += 1;
        self.enter(subtree, depth)
    }
}

impl TreeVisitor for EmitVisitor<'_> {
    type Error = EmitError;

    fn pre(&mut self, depth: usize, node: &DecisionNode) -> EmitResult<()> {
        trace!(depth, col = node.col, "pre");
        self.shape.pre(depth)?;
        let label = self.column_label(node.col)?;
        let group_set = if node.equal_mode.is_group() {
            Some(node.required_group_set()?)
        } else {
            None
        };

        self.split_if_over_budget(depth)?;

        let frame = self.active.as_mut().ok_or_else(no_open_frame)?;
        frame.body.indent_write(" (");
        let col = node.col;
        match (group_set, node.na_dir) {
            (_, NaSplitDir::NaVsRest) => {
                frame.body.write(&format!("!isNaN(data[{}])", col));
            }
            (None, na_dir) => {
                let op = match node.equal_mode {
                    EqualMode::NumericNe => "!=",
                    _ => "<",
                };
                if na_dir.nas_go_left() {
                    frame.body.write(&format!("isNaN(data[{}]) || ", col));
                } else if node.equal_mode == EqualMode::NumericNe {
                    frame.body.write(&format!("!isNaN(data[{}]) && ", col));
                }
                frame
                    .body
                    .write(&format!("data[{}] /*{}*/ {} ", col, label, op))
                    .write_float(node.threshold);
                frame.charge_float();
            }
            (Some(set), na_dir) => {
                if na_dir.nas_go_left() {
                    frame.body.write(&format!("isNaN(data[{}]) || ", col));
                }
                let field_name = frame.next_group_field();
                self.staged.add_field(
                    &frame.class_name,
                    FieldSpec {
                        name: field_name.clone(),
                        comment: set.to_string(),
                        value: set.to_byte_literal(),
                    },
                )?;
                frame.charge_group_field(set.num_bytes());
                self.group_fields += 1;
                set.render_test(&mut frame.body, &field_name, col, &label)
                    .map_err(|_| {
                        EmitError::UnsupportedDecision(format!(
                            "group test on column {} could not be rendered",
                            col
                        ))
                    })?;
            }
        }
        frame.body.write(" ? ").open().newline();
        frame.nodes_count += 1;
        Ok(())
    }

    fn mid(&mut self, depth: usize, _node: &DecisionNode) -> EmitResult<()> {
        trace!(depth, "mid");
        self.shape.mid(depth)?;
        let frame = self.active.as_mut().ok_or_else(no_open_frame)?;
        frame.body.write(" : ").newline();
        Ok(())
    }

    fn post(&mut self, depth: usize, _node: &DecisionNode) -> EmitResult<()> {
        trace!(depth, "post");
        self.shape.post(depth)?;
        let frame = self.active.as_mut().ok_or_else(no_open_frame)?;
        frame.body.write(")").close();
        if self.is_exit_point(depth) {
            self.leave()?;
        }
        Ok(())
    }

    fn leaf(&mut self, depth: usize, value: f32) -> EmitResult<()> {
        trace!(depth, value, "leaf");
        self.shape.leaf(depth)?;
        let limits = self.config.limits;
        let frame = self.active.as_mut().ok_or_else(no_open_frame)?;
        frame.body.write_indent().write_float(value);
        frame.charge_float();
        if frame.is_past_ceiling(&limits) {
            return Err(EmitError::OverBudgetAtLeaf {
                class: frame.class_name.clone(),
                cp_size: frame.cp_size,
                static_init_size: frame.static_init_size,
            });
        }
        Ok(())
    }
}

/// Emits one tree as a chain of classes whose `score0` methods together
/// compute the tree's prediction.
///
/// Classes reach the sink only after the whole tree was emitted without error.
pub struct TreeEmitter<'a, W, S: ?Sized> {
    cursor: W,
    sink: &'a mut S,
    visitor: EmitVisitor<'a>,
}

impl<'a, W, S> TreeEmitter<'a, W, S>
where
    W: TreeWalk,
    S: ClassSink + ?Sized,
{
    pub fn new(
        columns: &'a ColumnNames,
        cursor: W,
        sink: &'a mut S,
        base_class_name: impl Into<String>,
    ) -> Self {
        Self {
            cursor,
            sink,
            visitor: EmitVisitor::new(columns, base_class_name, EmitterConfig::default()),
        }
    }

    pub fn with_config(mut self, config: EmitterConfig) -> Self {
        self.visitor.config = config;
        self
    }

    pub fn build(self) -> EmitResult<BuildSummary> {
        let TreeEmitter {
            mut cursor,
            sink,
            mut visitor,
        } = self;

        visitor.begin()?;
        cursor.walk(&mut visitor)?;
        let (staged, summary) = visitor.finish()?;
        staged.commit_into(sink)?;

        debug!(
            classes = summary.classes.len(),
            splits = summary.splits,
            group_fields = summary.group_fields,
            "tree emitted"
        );
        Ok(summary)
    }
}

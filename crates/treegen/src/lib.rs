/*! Decision trees as size-bounded Java scoring classes.
 *
 * Single import for the whole pipeline: decode a compressed tree, emit it as one or more classes
 * that each stay under the target compiler's limits, render them as source, and read the source
 * back to check it scores rows exactly as the tree does.
 */

pub use treegen_core as core;
pub use treegen_emit as emit;
pub use treegen_parser as parser;

pub use treegen_core::{
    ColumnNames, CompressedTree, DecisionNode, EqualMode, GroupSet, NaSplitDir, TreeCursor,
    TreeError, TreeNode, TreeVisitor, TreeWalk,
};

pub use treegen_emit::{
    BuildSummary, ClassContainer, ClassSink, EmitError, EmitterConfig, JavaRenderer, Limits,
    RenderOptions, TreeEmitter, ENTRY_METHOD,
};

pub use treegen_parser::{parse_unit, CompilationUnit, Interpreter};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Parse(#[from] treegen_parser::ParseError),
    #[error(transparent)]
    Eval(#[from] treegen_parser::EvalError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Emit `tree` into `sink` under the default limits.
pub fn emit_tree<S: ClassSink + ?Sized>(
    tree: &CompressedTree,
    columns: &ColumnNames,
    base_class_name: &str,
    sink: &mut S,
) -> treegen_emit::EmitResult<BuildSummary> {
    emit_tree_with_config(tree, columns, base_class_name, sink, EmitterConfig::default())
}

pub fn emit_tree_with_config<S: ClassSink + ?Sized>(
    tree: &CompressedTree,
    columns: &ColumnNames,
    base_class_name: &str,
    sink: &mut S,
    config: EmitterConfig,
) -> treegen_emit::EmitResult<BuildSummary> {
    TreeEmitter::new(columns, tree.cursor(), sink, base_class_name)
        .with_config(config)
        .build()
}

/// Emit and render in one step, returning the source of every class.
pub fn emit_java(
    tree: &CompressedTree,
    columns: &ColumnNames,
    base_class_name: &str,
    config: EmitterConfig,
    options: RenderOptions,
) -> Result<(String, BuildSummary)> {
    let mut container = ClassContainer::new();
    let summary = emit_tree_with_config(tree, columns, base_class_name, &mut container, config)?;
    let source = JavaRenderer::new(options).render_unit(&container);
    Ok((source, summary))
}

/// A row on which emitted source and tree disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub row: usize,
    pub expected: f64,
    pub actual: f64,
}

/// Score every row through the tree and through the parsed source starting
/// at `entry_class`, collecting the rows where they differ.
pub fn compare_scores(
    tree: &CompressedTree,
    unit: &CompilationUnit,
    entry_class: &str,
    rows: &[Vec<f64>],
) -> Result<Vec<Mismatch>> {
    let interp = Interpreter::new(unit);
    let mut mismatches = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let expected = tree.score(row)?;
        let actual = interp.score(entry_class, ENTRY_METHOD, row)?;
        let same = expected == actual || (expected.is_nan() && actual.is_nan());
        if !same {
            mismatches.push(Mismatch {
                row: index,
                expected,
                actual,
            });
        }
    }
    Ok(mismatches)
}

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use treegen_core::{ColumnNames, CompressedTree, DecisionNode, TreeError, TreeNode, TreeVisitor};

/// Load a tree from its JSON description (`.json`) or compressed bytes.
pub fn load_tree(path: &Path) -> Result<CompressedTree> {
    if path.extension().map_or(false, |ext| ext == "json") {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let tree = TreeNode::from_json(&text)
            .with_context(|| format!("Invalid tree description in {}", path.display()))?;
        Ok(tree.compress()?)
    } else {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(CompressedTree::from_bytes(bytes))
    }
}

#[derive(Default)]
struct ColumnScan {
    max_col: Option<usize>,
}

impl TreeVisitor for ColumnScan {
    type Error = TreeError;

    fn pre(&mut self, _depth: usize, node: &DecisionNode) -> Result<(), TreeError> {
        self.max_col = self.max_col.max(Some(node.col));
        Ok(())
    }

    fn mid(&mut self, _depth: usize, _node: &DecisionNode) -> Result<(), TreeError> {
        Ok(())
    }

    fn post(&mut self, _depth: usize, _node: &DecisionNode) -> Result<(), TreeError> {
        Ok(())
    }

    fn leaf(&mut self, _depth: usize, _value: f32) -> Result<(), TreeError> {
        Ok(())
    }
}

/// Column labels from `--columns`, or `x0..xN` covering every column the
/// tree reads.
pub fn column_names(tree: &CompressedTree, names: Option<Vec<String>>) -> Result<ColumnNames> {
    if let Some(names) = names {
        return Ok(ColumnNames::new(names));
    }
    let mut scan = ColumnScan::default();
    tree.cursor().visit(&mut scan)?;
    Ok(ColumnNames::numbered(scan.max_col.map_or(0, |col| col + 1)))
}

/// Parse a comma-separated feature row. `NaN`, `NA` and empty cells are missing.
pub fn parse_row(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(i, cell)| match cell {
            "" | "NA" | "na" | "NaN" | "nan" => Ok(f64::NAN),
            _ => cell
                .parse::<f64>()
                .with_context(|| format!("Feature {} is not a number: {:?}", i, cell)),
        })
        .collect()
}

pub fn ensure_row_covers(row: &[f64], columns: &ColumnNames) -> Result<()> {
    if row.len() < columns.len() {
        bail!(
            "Row has {} features but the tree reads {} columns",
            row.len(),
            columns.len()
        );
    }
    Ok(())
}

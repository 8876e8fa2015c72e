use treegen::{
    compare_scores, emit_java, parse_unit, ColumnNames, EmitterConfig, EqualMode, Limits,
    NaSplitDir, RenderOptions, TreeNode,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tree = TreeNode::numeric(
        0,
        30.0,
        EqualMode::NumericLt,
        NaSplitDir::NaLeft,
        TreeNode::leaf(0.1),
        TreeNode::group(
            1,
            vec![2, 5, 11],
            true,
            NaSplitDir::Right,
            TreeNode::leaf(0.7),
            TreeNode::leaf(0.4),
        ),
    )
    .compress()?;

    let columns = ColumnNames::new(["age", "region"]);
    let config = EmitterConfig::default().with_limits(Limits::default().with_max_nodes(1));
    let (source, summary) = emit_java(&tree, &columns, "Risk", config, RenderOptions::default())?;
    println!("{}", source);
    println!("// {} class(es), {} forward call(s)", summary.classes.len(), summary.splits);

    let unit = parse_unit(&source)?;
    let rows = vec![vec![25.0, 5.0], vec![40.0, 5.0], vec![40.0, f64::NAN]];
    let mismatches = compare_scores(&tree, &unit, "Risk", &rows)?;
    println!("// {} mismatching row(s)", mismatches.len());
    Ok(())
}

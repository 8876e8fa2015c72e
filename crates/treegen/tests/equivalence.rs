//! Emitted source, read back and interpreted, must score every row exactly as
//! the compressed tree does, however the tree was split across classes.

use pretty_assertions::assert_eq;
use treegen::{
    compare_scores, emit_java, parse_unit, ColumnNames, CompressedTree, EmitterConfig, EqualMode,
    Limits, NaSplitDir, RenderOptions, TreeNode,
};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn below(&mut self, n: u32) -> u32 {
        self.next() % n
    }
}

const COLUMNS: usize = 4;
const NA_DIRS: [NaSplitDir; 4] = [
    NaSplitDir::NaLeft,
    NaSplitDir::Left,
    NaSplitDir::Right,
    NaSplitDir::NaVsRest,
];

fn random_tree(rng: &mut Lcg, depth: usize) -> TreeNode {
    if depth == 0 || rng.below(5) == 0 {
        return TreeNode::leaf(rng.below(2000) as f32 / 8.0 - 100.0);
    }
    let col = rng.below(COLUMNS as u32) as u16;
    let na = NA_DIRS[rng.below(4) as usize];
    let left = random_tree(rng, depth - 1);
    let right = random_tree(rng, depth - 1);
    match rng.below(4) {
        0 => {
            let threshold = rng.below(100) as f32 / 10.0 - 5.0;
            TreeNode::numeric(col, threshold, EqualMode::NumericLt, na, left, right)
        }
        1 => {
            let threshold = rng.below(5) as f32;
            TreeNode::numeric(col, threshold, EqualMode::NumericNe, na, left, right)
        }
        2 => {
            let count = 1 + rng.below(6);
            let categories = (0..count).map(|_| rng.below(32)).collect();
            TreeNode::group(col, categories, true, na, left, right)
        }
        _ => {
            let low = 40 + rng.below(20);
            let span = 1 + rng.below(200);
            let mut categories = vec![low, low + span];
            categories.extend((0..rng.below(8)).map(|_| low + rng.below(span)));
            TreeNode::group(col, categories, false, na, left, right)
        }
    }
}

fn random_rows(rng: &mut Lcg, count: usize) -> Vec<Vec<f64>> {
    (0..count)
        .map(|_| {
            (0..COLUMNS)
                .map(|_| match rng.below(10) {
                    0 => f64::NAN,
                    1 | 2 => f64::from(rng.below(6)),
                    _ => f64::from(rng.below(2600)) / 10.0 - 5.0,
                })
                .collect()
        })
        .collect()
}

fn assert_equivalent(tree: &CompressedTree, config: EmitterConfig, rows: &[Vec<f64>]) -> usize {
    let columns = ColumnNames::numbered(COLUMNS);
    let (source, summary) =
        emit_java(tree, &columns, "Model", config, RenderOptions::default()).unwrap();

    let unit = parse_unit(&source).unwrap_or_else(|e| panic!("{}\n{}", e, source));
    assert_eq!(
        unit.classes.keys().cloned().collect::<Vec<_>>(),
        summary.classes
    );
    assert!(unit.unresolved().is_empty(), "{:?}", unit.unresolved());

    let mismatches = compare_scores(tree, &unit, "Model", rows).unwrap();
    assert!(mismatches.is_empty(), "{:?}\n{}", mismatches, source);
    summary.splits
}

#[test]
fn test_random_trees_survive_splitting() {
    let mut rng = Lcg(0x5eed);
    let config = EmitterConfig::default().with_limits(
        Limits::default()
            .with_max_nodes(3)
            .with_max_cp(40)
            .with_max_static_init(120),
    );

    let mut total_splits = 0;
    for _ in 0..60 {
        let tree = random_tree(&mut rng, 8).compress().unwrap();
        let rows = random_rows(&mut rng, 40);
        total_splits += assert_equivalent(&tree, config.clone(), &rows);
    }
    assert!(total_splits > 0);
}

#[test]
fn test_random_trees_without_splitting() {
    let mut rng = Lcg(42);
    for _ in 0..30 {
        let tree = random_tree(&mut rng, 6).compress().unwrap();
        let rows = random_rows(&mut rng, 40);
        assert_eq!(assert_equivalent(&tree, EmitterConfig::default(), &rows), 0);
    }
}

#[test]
fn test_every_node_split_off() {
    let mut rng = Lcg(7);
    let config = EmitterConfig::default().with_limits(Limits::default().with_max_nodes(0));
    for _ in 0..20 {
        let node = random_tree(&mut rng, 5);
        let decisions = node.internal_nodes();
        let tree = node.compress().unwrap();
        let rows = random_rows(&mut rng, 30);
        let splits = assert_equivalent(&tree, config.clone(), &rows);
        // every decision but the root's opens a class of its own
        assert_eq!(splits, decisions.saturating_sub(1));
    }
}

#[test]
fn test_forced_split_round_trips() {
    fn balanced(n: usize, next: &mut f32) -> TreeNode {
        if n == 0 {
            *next += 0.5;
            return TreeNode::leaf(*next);
        }
        let left_n = (n - 1) / 2;
        let left = balanced(left_n, next);
        let right = balanced(n - 1 - left_n, next);
        TreeNode::numeric(
            (n % COLUMNS) as u16,
            n as f32 / 4.0,
            EqualMode::NumericLt,
            NaSplitDir::NaLeft,
            left,
            right,
        )
    }

    let tree = balanced(Limits::MAX_NODES + 2, &mut 0.0).compress().unwrap();
    let mut rng = Lcg(99);
    let rows = random_rows(&mut rng, 200);
    assert_eq!(assert_equivalent(&tree, EmitterConfig::default(), &rows), 1);
}

#[test]
fn test_emission_is_deterministic() {
    let mut rng = Lcg(2024);
    let tree = random_tree(&mut rng, 7).compress().unwrap();
    let columns = ColumnNames::numbered(COLUMNS);
    let config = EmitterConfig::default().with_limits(Limits::default().with_max_nodes(2));
    let first = emit_java(&tree, &columns, "M", config.clone(), RenderOptions::default()).unwrap();
    let second = emit_java(&tree, &columns, "M", config, RenderOptions::default()).unwrap();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

use treegen_core::{DecisionNode, EqualMode, NaSplitDir, TreeError, TreeVisitor};

/// Records the callback sequence a tree walk produces, one line per callback.
#[derive(Default)]
pub struct CallbackTrace {
    pub lines: Vec<String>,
}

pub fn describe(node: &DecisionNode) -> String {
    let test = match (&node.group_set, node.equal_mode) {
        (Some(set), _) => format!("data[{}] in {}", node.col, set),
        (None, EqualMode::NumericNe) => format!("data[{}] != {}", node.col, node.threshold),
        (None, _) => format!("data[{}] < {}", node.col, node.threshold),
    };
    let na = match node.na_dir {
        NaSplitDir::NaLeft => "na_left",
        NaSplitDir::Left => "left",
        NaSplitDir::Right => "right",
        NaSplitDir::NaVsRest => "na_vs_rest",
    };
    format!("{} [{}]", test, na)
}

impl CallbackTrace {
    fn push(&mut self, depth: usize, text: String) {
        self.lines.push(format!("{}{}", "  ".repeat(depth), text));
    }
}

impl TreeVisitor for CallbackTrace {
    type Error = TreeError;

    fn pre(&mut self, depth: usize, node: &DecisionNode) -> Result<(), TreeError> {
        self.push(depth, format!("pre  {} {}", depth, describe(node)));
        Ok(())
    }

    fn mid(&mut self, depth: usize, _node: &DecisionNode) -> Result<(), TreeError> {
        self.push(depth, format!("mid  {}", depth));
        Ok(())
    }

    fn post(&mut self, depth: usize, _node: &DecisionNode) -> Result<(), TreeError> {
        self.push(depth, format!("post {}", depth));
        Ok(())
    }

    fn leaf(&mut self, depth: usize, value: f32) -> Result<(), TreeError> {
        self.push(depth, format!("leaf {} {}", depth, value));
        Ok(())
    }
}

/// Human readable labels of the feature columns, indexed by column number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnNames {
    names: Vec<String>,
}

impl ColumnNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// `x0`, `x1`, ... for trees that arrive without a header.
    pub fn numbered(count: usize) -> Self {
        Self::new((0..count).map(|i| format!("x{}", i)))
    }

    pub fn name_of(&self, col: usize) -> Option<&str> {
        self.names.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

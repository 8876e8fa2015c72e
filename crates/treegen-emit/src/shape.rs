use crate::{EmitError, EmitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    WaitLeft,
    WaitSep,
    WaitRight,
    Closed,
}

/// Tracks which expression slot the next callback fills, so a callback
/// sequence that does not describe a well-formed tree is caught as it happens.
#[derive(Debug, Default)]
pub(crate) struct ExprShape {
    open: Vec<Decision>,
    root_filled: bool,
}

impl ExprShape {
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    fn expect_depth(&self, callback: &str, expected: usize, depth: usize) -> EmitResult<()> {
        if expected != depth {
            return Err(EmitError::MalformedTree(format!(
                "{} reported depth {} but the tree is at depth {}",
                callback, depth, expected
            )));
        }
        Ok(())
    }

    fn fill_slot(&mut self, callback: &str) -> EmitResult<()> {
        match self.open.last_mut() {
            None if !self.root_filled => {
                self.root_filled = true;
                Ok(())
            }
            Some(state) if *state == Decision::WaitLeft => {
                *state = Decision::WaitSep;
                Ok(())
            }
            Some(state) if *state == Decision::WaitRight => {
                *state = Decision::Closed;
                Ok(())
            }
            _ => Err(EmitError::MalformedTree(format!(
                "{} with no open expression slot",
                callback
            ))),
        }
    }

    pub(crate) fn pre(&mut self, depth: usize) -> EmitResult<()> {
        self.expect_depth("pre", self.open.len(), depth)?;
        self.fill_slot("pre")?;
        self.open.push(Decision::WaitLeft);
        Ok(())
    }

    pub(crate) fn leaf(&mut self, depth: usize) -> EmitResult<()> {
        self.expect_depth("leaf", self.open.len(), depth)?;
        self.fill_slot("leaf")
    }

    pub(crate) fn mid(&mut self, depth: usize) -> EmitResult<()> {
        self.expect_depth("mid", self.open.len(), depth)?;
        match self.open.last_mut() {
            Some(state) if *state == Decision::WaitSep => {
                *state = Decision::WaitRight;
                Ok(())
            }
            _ => Err(EmitError::MalformedTree(
                "mid before the left branch was complete".to_string(),
            )),
        }
    }

    pub(crate) fn post(&mut self, depth: usize) -> EmitResult<()> {
        self.expect_depth("post", self.open.len().saturating_sub(1), depth)?;
        match self.open.last() {
            Some(Decision::Closed) => {
                self.open.pop();
                Ok(())
            }
            _ => Err(EmitError::MalformedTree(
                "post before the right branch was complete".to_string(),
            )),
        }
    }

    /// The whole tree has been seen: one root expression and nothing open.
    pub(crate) fn finish(&self) -> EmitResult<()> {
        if !self.root_filled {
            return Err(EmitError::MalformedTree("empty tree".to_string()));
        }
        if !self.open.is_empty() {
            return Err(EmitError::MalformedTree(format!(
                "{} decisions left open",
                self.open.len()
            )));
        }
        Ok(())
    }
}

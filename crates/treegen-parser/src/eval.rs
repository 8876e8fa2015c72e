//! Direct evaluation of parsed scoring classes.

use crate::ast::{ClassDecl, CompilationUnit, Cond, Expr};
use crate::error::{EvalError, EvalResult};
use treegen_core::GroupSet;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Evaluates `score0`-style methods the way the JVM would, following forward
/// calls into sibling classes.
pub struct Interpreter<'u> {
    unit: &'u CompilationUnit,
    max_call_depth: usize,
}

impl<'u> Interpreter<'u> {
    pub fn new(unit: &'u CompilationUnit) -> Self {
        Self {
            unit,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn score(&self, class: &str, method: &str, row: &[f64]) -> EvalResult<f64> {
        self.call(class, method, row, 0)
    }

    fn call(&self, class: &str, method: &str, row: &[f64], depth: usize) -> EvalResult<f64> {
        if depth >= self.max_call_depth {
            return Err(EvalError::CallDepthExceeded(self.max_call_depth));
        }
        let decl = self
            .unit
            .class(class)
            .ok_or_else(|| EvalError::UnknownClass(class.to_string()))?;
        let body = decl
            .method(method)
            .map(|m| &m.body)
            .ok_or_else(|| EvalError::UnknownMethod {
                class: class.to_string(),
                method: method.to_string(),
            })?;
        self.eval(decl, body, row, depth)
    }

    fn eval(&self, class: &ClassDecl, expr: &Expr, row: &[f64], depth: usize) -> EvalResult<f64> {
        let mut expr = expr;
        loop {
            match expr {
                Expr::Const { value } => return Ok(f64::from(*value)),
                Expr::Call {
                    class: callee,
                    method,
                } => return self.call(callee, method, row, depth + 1),
                Expr::Ternary {
                    test,
                    then,
                    otherwise,
                } => {
                    expr = if self.test(class, test, row)? {
                        then
                    } else {
                        otherwise
                    };
                }
            }
        }
    }

    fn test(&self, class: &ClassDecl, cond: &Cond, row: &[f64]) -> EvalResult<bool> {
        Ok(match cond {
            Cond::IsNaN { col } => read(row, *col)?.is_nan(),
            Cond::Less { col, threshold } => read(row, *col)? < f64::from(*threshold),
            Cond::NotEqual { col, threshold } => read(row, *col)? != f64::from(*threshold),
            Cond::BitSet {
                field,
                nbits,
                bitoff,
                col,
            } => {
                let bytes = class
                    .field(field)
                    .ok_or_else(|| EvalError::UnknownField {
                        class: class.name.clone(),
                        field: field.clone(),
                    })?
                    .bytes
                    .clone();
                let set = GroupSet::from_raw(bytes, *nbits, *bitoff).map_err(|e| {
                    EvalError::BadGroupField {
                        field: field.clone(),
                        message: e.to_string(),
                    }
                })?;
                set.contains_value(read(row, *col)?)
            }
            Cond::Not { inner } => !self.test(class, inner, row)?,
            Cond::Or { left, right } => self.test(class, left, row)? || self.test(class, right, row)?,
            Cond::And { left, right } => {
                self.test(class, left, row)? && self.test(class, right, row)?
            }
        })
    }
}

fn read(row: &[f64], col: usize) -> EvalResult<f64> {
    row.get(col).copied().ok_or(EvalError::ColumnOutOfRange {
        col,
        len: row.len(),
    })
}

/*! Parse emitted scoring classes back into structured data.
 *
 * Generated source is only useful if the Java compiler accepts it and it scores rows the way the
 * tree does. This crate reads emitted classes back (one unit or a directory of per-class files)
 * and evaluates their entry methods, forward calls included, so both properties can be checked
 * without a JVM.
 */

use pest::Parser;
use pest_derive::Parser;
use std::path::Path;
use walkdir::WalkDir;

pub mod ast;
mod builder;
pub mod error;
pub mod eval;

pub use ast::{ByteField, ClassDecl, CompilationUnit, Cond, Expr, Import, ScoreMethod};
pub use error::{EvalError, EvalResult, ParseError, ParseResult};
pub use eval::{Interpreter, DEFAULT_MAX_CALL_DEPTH};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct TreeSourceParser;

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    TreeSourceParser::parse(Rule::unit, input).map_err(|e| ParseError::Syntax(Box::new(e)))
}

pub fn parse_unit(input: &str) -> ParseResult<CompilationUnit> {
    let unit = parse(input)?
        .next()
        .ok_or_else(|| ParseError::Structure("empty parse".to_string()))?;
    builder::build_unit(unit)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<CompilationUnit> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_unit(&text)
}

/// Parse every `.java` file under `dir`, in path order, into one unit.
pub fn parse_dir<P: AsRef<Path>>(dir: P) -> ParseResult<CompilationUnit> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ParseError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "java")
        {
            files.push(entry.into_path());
        }
    }

    let mut unit = CompilationUnit::default();
    for file in files {
        unit.merge(parse_file(&file)?)?;
    }
    Ok(unit)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STUMP: &str = r"
package models.trees;

import static java.lang.Double.isNaN;

class Tree {
  /** {1, 9, 20} */
  public static final byte[] GRPSPLIT0 = new byte[] {1, 1, 8};
  public static double score0(double[] data) {
    double pred =  (isNaN(data[0]) || bitSetContains(GRPSPLIT0, 20, 1, data[0] /*color*/) ?
      1.0f :
      2.0f);
    return pred; // nodes=1, group_splits=1, cp_size=10, static_init_size=24B
  }
}
";

    #[test]
    fn test_empty_unit() {
        assert!(check(""));
        assert_eq!(parse_unit("").unwrap(), CompilationUnit::default());
    }

    #[test]
    fn test_parse_group_stump() {
        let unit = parse_unit(STUMP).unwrap();
        assert_eq!(unit.package.as_deref(), Some("models.trees"));
        assert_eq!(
            unit.imports,
            vec![Import {
                path: "java.lang.Double.isNaN".into(),
                is_static: true
            }]
        );

        let class = unit.class("Tree").unwrap();
        assert_eq!(class.field("GRPSPLIT0").unwrap().bytes, vec![1, 1, 8]);
        let body = &class.method("score0").unwrap().body;
        assert_eq!(body.decisions(), 1);
        assert_eq!(body.fields(), vec!["GRPSPLIT0"]);
        assert!(unit.unresolved().is_empty());
    }

    #[test]
    fn test_negative_byte_literals() {
        let unit = parse_unit("class T { byte[] F = new byte[] {-128, 127, 0}; }").unwrap();
        assert_eq!(unit.class("T").unwrap().fields[0].bytes, vec![0x80, 0x7f, 0]);
    }

    #[test]
    fn test_score_group_stump() {
        let unit = parse_unit(STUMP).unwrap();
        let interp = Interpreter::new(&unit);
        assert_eq!(interp.score("Tree", "score0", &[9.0]).unwrap(), 1.0);
        assert_eq!(interp.score("Tree", "score0", &[f64::NAN]).unwrap(), 1.0);
        assert_eq!(interp.score("Tree", "score0", &[10.0]).unwrap(), 2.0);
        assert_eq!(interp.score("Tree", "score0", &[20.7]).unwrap(), 1.0);
        assert_eq!(interp.score("Tree", "score0", &[0.0]).unwrap(), 2.0);
        assert_eq!(
            interp.score("Tree", "score0", &[]),
            Err(EvalError::ColumnOutOfRange { col: 0, len: 0 })
        );
    }

    #[test]
    fn test_forward_call_in_else_slot() {
        let source = r"
class T {
  public static double score0(double[] data) {
    double pred =  (data[0] /*x0*/ < 1.0f ?
      10.0f :
T_1.score0(data));
    return pred; // nodes=1
  }
}
class T_1 {
  public static double score0(double[] data) {
    double pred =  (!isNaN(data[1]) && data[1] /*x1*/ != -2.5f ?
      Float.NaN :
      1e20f);
    return pred;
  }
}
";
        let unit = parse_unit(source).unwrap();
        let interp = Interpreter::new(&unit);
        assert_eq!(interp.score("T", "score0", &[0.0, 0.0]).unwrap(), 10.0);
        assert!(interp.score("T", "score0", &[2.0, 0.0]).unwrap().is_nan());
        assert_eq!(
            interp.score("T", "score0", &[2.0, -2.5]).unwrap(),
            f64::from(1e20f32)
        );
        assert_eq!(
            interp.score("T", "score0", &[2.0, f64::NAN]).unwrap(),
            f64::from(1e20f32)
        );
    }

    #[test]
    fn test_not_nan_test() {
        let source = "class T { public static double score0(double[] data) { \
                      double pred = (!isNaN(data[3]) ? 1.0f : 2.0f); return pred; } }";
        let unit = parse_unit(source).unwrap();
        let interp = Interpreter::new(&unit);
        assert_eq!(interp.score("T", "score0", &[0.0, 0.0, 0.0, 5.0]).unwrap(), 1.0);
        assert_eq!(
            interp.score("T", "score0", &[0.0, 0.0, 0.0, f64::NAN]).unwrap(),
            2.0
        );
    }

    #[test]
    fn test_call_depth_guard() {
        let source = "class Loop { static double score0(double[] data) { \
                      double pred = Loop.score0(data); return pred; } }";
        let unit = parse_unit(source).unwrap();
        let interp = Interpreter::new(&unit).with_max_call_depth(8);
        assert_eq!(
            interp.score("Loop", "score0", &[]),
            Err(EvalError::CallDepthExceeded(8))
        );
    }

    #[test]
    fn test_unresolved_references() {
        let source = "class T { static double score0(double[] data) { \
                      double pred = (bitSetContains(GRPSPLIT3, 32, 0, data[0]) ? U.score0(data) : 1.0f); \
                      return pred; } }";
        let unit = parse_unit(source).unwrap();
        assert_eq!(
            unit.unresolved(),
            vec![
                "T.score0 calls unknown class U".to_string(),
                "T.score0 reads unknown field GRPSPLIT3".to_string(),
            ]
        );
        assert!(matches!(
            Interpreter::new(&unit).score("T", "score0", &[1.0]),
            Err(EvalError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_source() {
        assert!(!check("class T { double score0(double[] data) { double pred = (data[0] < 1.0f ? 1.0f); return pred; } }"));
        assert!(!check("class T { double score0(double[] data) { double pred = 1.0; return pred; } }"));
        assert!(matches!(
            parse_unit("class T { double score0(double[] data) { double pred = 1.0f; return other; } }"),
            Err(ParseError::Structure(_))
        ));
        assert!(matches!(
            parse_unit("class T { } class T { }"),
            Err(ParseError::DuplicateClass(_))
        ));
        assert!(matches!(
            parse_unit("class T { byte[] F = new byte[] {300}; }"),
            Err(ParseError::Structure(_))
        ));
    }
}

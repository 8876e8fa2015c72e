use crate::ast::{ByteField, ClassDecl, CompilationUnit, Cond, Expr, Import, ScoreMethod};
use crate::error::{ParseError, ParseResult};
use crate::Rule;
use pest::iterators::{Pair, Pairs};

fn structure(message: impl Into<String>) -> ParseError {
    ParseError::Structure(message.into())
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| structure(format!("missing {}", what)))
}

fn unexpected(pair: &Pair<Rule>) -> ParseError {
    let (line, col) = pair.line_col();
    structure(format!(
        "unexpected {:?} at {}:{}",
        pair.as_rule(),
        line,
        col
    ))
}

pub(crate) fn build_unit(unit: Pair<Rule>) -> ParseResult<CompilationUnit> {
    let mut out = CompilationUnit::default();
    for item in unit.into_inner() {
        match item.as_rule() {
            Rule::package_decl => {
                let name = next(&mut item.into_inner(), "package name")?;
                out.package = Some(name.as_str().to_string());
            }
            Rule::import_decl => {
                let mut is_static = false;
                let mut path = None;
                for part in item.into_inner() {
                    match part.as_rule() {
                        Rule::static_kw => is_static = true,
                        Rule::qualified_name => path = Some(part.as_str().to_string()),
                        _ => return Err(unexpected(&part)),
                    }
                }
                let path = path.ok_or_else(|| structure("import without a name"))?;
                out.imports.push(Import { path, is_static });
            }
            Rule::class_decl => out.add_class(build_class(item)?)?,
            Rule::EOI => {}
            _ => return Err(unexpected(&item)),
        }
    }
    Ok(out)
}

fn build_class(pair: Pair<Rule>) -> ParseResult<ClassDecl> {
    let mut inner = pair.into_inner();
    let name = next(&mut inner, "class name")?.as_str().to_string();
    let mut class = ClassDecl {
        name,
        fields: Vec::new(),
        methods: Vec::new(),
    };

    for member in inner {
        match member.as_rule() {
            Rule::field_decl => {
                let field = build_field(member)?;
                if class.field(&field.name).is_some() {
                    return Err(structure(format!(
                        "field {}.{} declared twice",
                        class.name, field.name
                    )));
                }
                class.fields.push(field);
            }
            Rule::method_decl => {
                let method = build_method(member)?;
                if class.method(&method.name).is_some() {
                    return Err(structure(format!(
                        "method {}.{} declared twice",
                        class.name, method.name
                    )));
                }
                class.methods.push(method);
            }
            _ => return Err(unexpected(&member)),
        }
    }
    Ok(class)
}

fn build_field(pair: Pair<Rule>) -> ParseResult<ByteField> {
    let mut inner = pair.into_inner();
    let name = next(&mut inner, "field name")?.as_str().to_string();
    let bytes = inner
        .map(|lit| {
            let value: i32 = lit
                .as_str()
                .parse()
                .map_err(|_| structure(format!("bad byte literal {}", lit.as_str())))?;
            i8::try_from(value)
                .map(|b| b as u8)
                .map_err(|_| structure(format!("{} does not fit a byte", value)))
        })
        .collect::<ParseResult<Vec<u8>>>()?;
    Ok(ByteField { name, bytes })
}

fn build_method(pair: Pair<Rule>) -> ParseResult<ScoreMethod> {
    let mut inner = pair.into_inner();
    let name = next(&mut inner, "method name")?.as_str().to_string();
    let local = next(&mut inner, "local variable")?.as_str().to_string();
    let body = build_expr(next(&mut inner, "method body")?)?;
    let returned = next(&mut inner, "return value")?;
    if returned.as_str() != local {
        return Err(structure(format!(
            "{} returns {} instead of {}",
            name,
            returned.as_str(),
            local
        )));
    }
    Ok(ScoreMethod { name, body })
}

fn build_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let inner = next(&mut pair.into_inner(), "expression")?;
    match inner.as_rule() {
        Rule::float_lit => Ok(Expr::Const {
            value: parse_float(inner.as_str())?,
        }),
        Rule::forward_call => {
            let mut parts = inner.into_inner();
            let class = next(&mut parts, "callee class")?.as_str().to_string();
            let method = next(&mut parts, "callee method")?.as_str().to_string();
            Ok(Expr::Call { class, method })
        }
        Rule::ternary => {
            let mut parts = inner.into_inner();
            let test = build_test(next(&mut parts, "condition")?)?;
            let then = build_expr(next(&mut parts, "then branch")?)?;
            let otherwise = build_expr(next(&mut parts, "else branch")?)?;
            Ok(Expr::Ternary {
                test,
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            })
        }
        _ => Err(unexpected(&inner)),
    }
}

fn build_test(pair: Pair<Rule>) -> ParseResult<Cond> {
    let inner = next(&mut pair.into_inner(), "condition")?;
    match inner.as_rule() {
        Rule::na_or => {
            let mut parts = inner.into_inner();
            let nan = build_is_nan(next(&mut parts, "isNaN")?)?;
            let cmp = build_cmp(next(&mut parts, "comparison")?)?;
            Ok(Cond::Or {
                left: Box::new(nan),
                right: Box::new(cmp),
            })
        }
        Rule::na_and => {
            let mut parts = inner.into_inner();
            let nan = build_is_nan(next(&mut parts, "isNaN")?)?;
            let cmp = build_cmp(next(&mut parts, "comparison")?)?;
            Ok(Cond::And {
                left: Box::new(Cond::Not {
                    inner: Box::new(nan),
                }),
                right: Box::new(cmp),
            })
        }
        Rule::not_nan => {
            let nan = build_is_nan(next(&mut inner.into_inner(), "isNaN")?)?;
            Ok(Cond::Not {
                inner: Box::new(nan),
            })
        }
        Rule::cmp => build_cmp(inner),
        _ => Err(unexpected(&inner)),
    }
}

fn build_is_nan(pair: Pair<Rule>) -> ParseResult<Cond> {
    let col = build_data_ref(next(&mut pair.into_inner(), "data reference")?)?;
    Ok(Cond::IsNaN { col })
}

fn build_cmp(pair: Pair<Rule>) -> ParseResult<Cond> {
    let inner = next(&mut pair.into_inner(), "comparison")?;
    let rule = inner.as_rule();
    let mut parts = inner.into_inner();
    match rule {
        Rule::less_test | Rule::not_equal_test => {
            let col = build_data_ref(next(&mut parts, "data reference")?)?;
            let threshold = parse_float(next(&mut parts, "threshold")?.as_str())?;
            if rule == Rule::less_test {
                Ok(Cond::Less { col, threshold })
            } else {
                Ok(Cond::NotEqual { col, threshold })
            }
        }
        Rule::bitset_test => {
            let field = next(&mut parts, "bitset field")?.as_str().to_string();
            let nbits = parse_int(next(&mut parts, "bit count")?.as_str())?;
            let bitoff = parse_int(next(&mut parts, "bit offset")?.as_str())?;
            let col = build_data_ref(next(&mut parts, "data reference")?)?;
            Ok(Cond::BitSet {
                field,
                nbits,
                bitoff,
                col,
            })
        }
        _ => Err(structure(format!("unexpected comparison {:?}", rule))),
    }
}

fn build_data_ref(pair: Pair<Rule>) -> ParseResult<usize> {
    let index = next(&mut pair.into_inner(), "column index")?;
    index
        .as_str()
        .parse()
        .map_err(|_| structure(format!("bad column index {}", index.as_str())))
}

fn parse_int(text: &str) -> ParseResult<u32> {
    text.parse()
        .map_err(|_| structure(format!("bad integer {}", text)))
}

pub(crate) fn parse_float(text: &str) -> ParseResult<f32> {
    match text {
        "Float.NaN" => Ok(f32::NAN),
        "Float.POSITIVE_INFINITY" => Ok(f32::INFINITY),
        "Float.NEGATIVE_INFINITY" => Ok(f32::NEG_INFINITY),
        _ => text
            .strip_suffix('f')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| structure(format!("bad float literal {}", text))),
    }
}

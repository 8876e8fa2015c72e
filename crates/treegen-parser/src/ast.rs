use crate::error::{ParseError, ParseResult};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub classes: IndexMap<String, ClassDecl>,
}

impl CompilationUnit {
    pub fn add_class(&mut self, class: ClassDecl) -> ParseResult<()> {
        if self.classes.contains_key(&class.name) {
            return Err(ParseError::DuplicateClass(class.name));
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    /// Fold another unit in, as when each class was written to its own file.
    pub fn merge(&mut self, other: CompilationUnit) -> ParseResult<()> {
        if self.package.is_none() {
            self.package = other.package;
        }
        for import in other.imports {
            if !self.imports.contains(&import) {
                self.imports.push(import);
            }
        }
        for (_, class) in other.classes {
            self.add_class(class)?;
        }
        Ok(())
    }

    /// Dangling references: forward calls to missing classes or methods and
    /// group tests naming a field their class does not declare.
    pub fn unresolved(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for class in self.classes.values() {
            for method in &class.methods {
                for (callee, callee_method) in method.body.forward_calls() {
                    match self.class(callee) {
                        None => problems.push(format!(
                            "{}.{} calls unknown class {}",
                            class.name, method.name, callee
                        )),
                        Some(target) if target.method(callee_method).is_none() => {
                            problems.push(format!(
                                "{}.{} calls unknown method {}.{}",
                                class.name, method.name, callee, callee_method
                            ))
                        }
                        Some(_) => {}
                    }
                }
                for field in method.body.fields() {
                    if class.field(field).is_none() {
                        problems.push(format!(
                            "{}.{} reads unknown field {}",
                            class.name, method.name, field
                        ));
                    }
                }
            }
        }
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<ByteField>,
    pub methods: Vec<ScoreMethod>,
}

impl ClassDecl {
    pub fn field(&self, name: &str) -> Option<&ByteField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&ScoreMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByteField {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// `double name(double[] data)` whose body is one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMethod {
    pub name: String,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Const {
        value: f32,
    },
    Call {
        class: String,
        method: String,
    },
    Ternary {
        test: Cond,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    /// Number of ternaries in the expression.
    pub fn decisions(&self) -> usize {
        match self {
            Expr::Const { .. } | Expr::Call { .. } => 0,
            Expr::Ternary {
                then, otherwise, ..
            } => 1 + then.decisions() + otherwise.decisions(),
        }
    }

    pub fn forward_calls(&self) -> Vec<(&str, &str)> {
        let mut calls = Vec::new();
        self.collect_calls(&mut calls);
        calls
    }

    fn collect_calls<'e>(&'e self, out: &mut Vec<(&'e str, &'e str)>) {
        match self {
            Expr::Const { .. } => {}
            Expr::Call { class, method } => out.push((class.as_str(), method.as_str())),
            Expr::Ternary {
                then, otherwise, ..
            } => {
                then.collect_calls(out);
                otherwise.collect_calls(out);
            }
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'e>(&'e self, out: &mut Vec<&'e str>) {
        if let Expr::Ternary {
            test,
            then,
            otherwise,
        } = self
        {
            test.collect_fields(out);
            then.collect_fields(out);
            otherwise.collect_fields(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cond {
    IsNaN {
        col: usize,
    },
    Less {
        col: usize,
        threshold: f32,
    },
    NotEqual {
        col: usize,
        threshold: f32,
    },
    BitSet {
        field: String,
        nbits: u32,
        bitoff: u32,
        col: usize,
    },
    Not {
        inner: Box<Cond>,
    },
    Or {
        left: Box<Cond>,
        right: Box<Cond>,
    },
    And {
        left: Box<Cond>,
        right: Box<Cond>,
    },
}

impl Cond {
    fn collect_fields<'c>(&'c self, out: &mut Vec<&'c str>) {
        match self {
            Cond::BitSet { field, .. } => out.push(field.as_str()),
            Cond::Not { inner } => inner.collect_fields(out),
            Cond::Or { left, right } | Cond::And { left, right } => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Cond::IsNaN { .. } | Cond::Less { .. } | Cond::NotEqual { .. } => {}
        }
    }
}

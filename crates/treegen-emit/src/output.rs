use crate::config::IndentStyle;
use crate::sink::{ClassContainer, ClassSpec, ENTRY_METHOD};
use crate::{EmitError, EmitResult};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Java,
    Json,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub package: Option<String>,
    pub header: Option<String>,
    pub static_imports: Vec<String>,
    pub indent_style: IndentStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            package: None,
            header: None,
            static_imports: vec!["java.lang.Double.isNaN".to_string()],
            indent_style: IndentStyle::default(),
        }
    }
}

/// Lays emitted classes out as Java source.
pub struct JavaRenderer {
    options: RenderOptions,
}

impl JavaRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Package line, imports and every class of the container, in sink order.
    pub fn render_unit(&self, container: &ClassContainer) -> String {
        let mut out = self.render_preamble();
        for class in container.classes() {
            out.push('\n');
            out.push_str(&self.render_class(class));
        }
        out
    }

    pub fn render_preamble(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.options.header {
            out.push_str("/*\n");
            for line in header.lines() {
                let _ = writeln!(out, "  {}", line.replace("*/", "* /"));
            }
            out.push_str("*/\n");
        }
        if let Some(package) = &self.options.package {
            let _ = writeln!(out, "package {};", package);
            out.push('\n');
        }
        for import in &self.options.static_imports {
            let _ = writeln!(out, "import static {};", import);
        }
        out
    }

    pub fn render_class(&self, class: &ClassSpec) -> String {
        let unit = self.options.indent_style.unit();
        let mut out = String::new();
        let _ = writeln!(out, "class {} {{", class.name);

        for field in &class.fields {
            let values = field
                .value
                .iter()
                .map(|b| (*b as i8).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{}/** {} */", unit, field.comment);
            let _ = writeln!(
                out,
                "{}public static final byte[] {} = new byte[] {{{}}};",
                unit, field.name, values
            );
        }

        for method in &class.methods {
            let _ = writeln!(
                out,
                "{}public static double {}(double[] data) {{",
                unit, method.name
            );
            for line in method.body.lines() {
                let _ = writeln!(out, "{}{}{}", unit, unit, line);
            }
            let _ = writeln!(out, "{}}}", unit);
        }

        out.push_str("}\n");
        out
    }
}

impl Default for JavaRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Classes as JSON, for tools that post-process emitted bodies.
pub fn render_json(container: &ClassContainer) -> EmitResult<String> {
    serde_json::to_string_pretty(container).map_err(|e| EmitError::Sink(e.to_string()))
}

/// Classes whose entry method was never installed; empty for any container
/// filled by a successful build.
pub fn missing_entry_methods(container: &ClassContainer) -> Vec<String> {
    container
        .classes()
        .filter(|class| class.method(ENTRY_METHOD).is_none())
        .map(|class| class.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ClassSink, FieldSpec, MethodSpec};
    use pretty_assertions::assert_eq;

    fn container() -> ClassContainer {
        let mut container = ClassContainer::new();
        container.add_class(ClassSpec::new("Tree")).unwrap();
        container
            .add_field(
                "Tree",
                FieldSpec {
                    name: "GRPSPLIT0".into(),
                    comment: "{0, 7}".into(),
                    value: vec![0x81],
                },
            )
            .unwrap();
        container
            .install_method(
                "Tree",
                MethodSpec {
                    name: ENTRY_METHOD.into(),
                    body: "double pred = 1.0f;\nreturn pred; // stats\n".into(),
                },
            )
            .unwrap();
        container
    }

    #[test]
    fn test_render_class() {
        let rendered = JavaRenderer::default().render_class(container().get("Tree").unwrap());
        assert_eq!(
            rendered,
            "class Tree {\n\
             \x20 /** {0, 7} */\n\
             \x20 public static final byte[] GRPSPLIT0 = new byte[] {-127};\n\
             \x20 public static double score0(double[] data) {\n\
             \x20   double pred = 1.0f;\n\
             \x20   return pred; // stats\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn test_render_unit_preamble() {
        let renderer = JavaRenderer::new(RenderOptions {
            package: Some("models.trees".into()),
            header: Some("generated".into()),
            ..RenderOptions::default()
        });
        let unit = renderer.render_unit(&container());
        assert!(unit.starts_with("/*\n  generated\n*/\npackage models.trees;\n\n"));
        assert!(unit.contains("import static java.lang.Double.isNaN;\n"));
        assert!(unit.contains("class Tree {"));
    }

    #[test]
    fn test_render_json_and_missing_methods() {
        let json = render_json(&container()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Tree"]["fields"][0]["name"], "GRPSPLIT0");

        let mut partial = container();
        partial.add_class(ClassSpec::new("Tree_1")).unwrap();
        assert_eq!(missing_entry_methods(&partial), vec!["Tree_1"]);
    }
}

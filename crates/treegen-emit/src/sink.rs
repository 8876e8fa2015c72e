use crate::{EmitError, EmitResult};
use indexmap::IndexMap;
use serde::Serialize;

/// Name of the method every emitted class exposes.
pub const ENTRY_METHOD: &str = "score0";

/// A `public static final byte[]` field holding a group split's bitset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub comment: String,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSpec {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn entry_body(&self) -> Option<&str> {
        self.method(ENTRY_METHOD).map(|m| m.body.as_str())
    }
}

/// Receiver of generated classes.
pub trait ClassSink {
    fn add_class(&mut self, class: ClassSpec) -> EmitResult<()>;

    fn add_field(&mut self, class: &str, field: FieldSpec) -> EmitResult<()>;

    fn install_method(&mut self, class: &str, method: MethodSpec) -> EmitResult<()>;
}

/// In-memory sink keeping classes in the order they were added.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClassContainer {
    classes: IndexMap<String, ClassSpec>,
}

impl ClassContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ClassSpec> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassSpec> {
        self.classes.values()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn class_mut(&mut self, name: &str) -> EmitResult<&mut ClassSpec> {
        self.classes
            .get_mut(name)
            .ok_or_else(|| EmitError::Sink(format!("Class {} not found", name)))
    }
}

impl ClassSink for ClassContainer {
    fn add_class(&mut self, class: ClassSpec) -> EmitResult<()> {
        if self.classes.contains_key(&class.name) {
            return Err(EmitError::Sink(format!(
                "Class {} already exists",
                class.name
            )));
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    fn add_field(&mut self, class: &str, field: FieldSpec) -> EmitResult<()> {
        let spec = self.class_mut(class)?;
        if spec.field(&field.name).is_some() {
            return Err(EmitError::Sink(format!(
                "Field {}.{} already exists",
                class, field.name
            )));
        }
        spec.fields.push(field);
        Ok(())
    }

    fn install_method(&mut self, class: &str, method: MethodSpec) -> EmitResult<()> {
        let spec = self.class_mut(class)?;
        if spec.method(&method.name).is_some() {
            return Err(EmitError::Sink(format!(
                "Method {}.{} already installed",
                class, method.name
            )));
        }
        spec.methods.push(method);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    AddClass(ClassSpec),
    AddField { class: String, field: FieldSpec },
    InstallMethod { class: String, method: MethodSpec },
}

/// Journal of sink operations, replayed into the real sink only once a tree
/// has been emitted completely.
#[derive(Debug, Clone, Default)]
pub struct StagedSink {
    events: Vec<SinkEvent>,
}

impl StagedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn commit_into<S: ClassSink + ?Sized>(self, sink: &mut S) -> EmitResult<()> {
        for event in self.events {
            match event {
                SinkEvent::AddClass(class) => sink.add_class(class)?,
                SinkEvent::AddField { class, field } => sink.add_field(&class, field)?,
                SinkEvent::InstallMethod { class, method } => sink.install_method(&class, method)?,
            }
        }
        Ok(())
    }
}

impl ClassSink for StagedSink {
    fn add_class(&mut self, class: ClassSpec) -> EmitResult<()> {
        self.events.push(SinkEvent::AddClass(class));
        Ok(())
    }

    fn add_field(&mut self, class: &str, field: FieldSpec) -> EmitResult<()> {
        self.events.push(SinkEvent::AddField {
            class: class.to_string(),
            field,
        });
        Ok(())
    }

    fn install_method(&mut self, class: &str, method: MethodSpec) -> EmitResult<()> {
        self.events.push(SinkEvent::InstallMethod {
            class: class.to_string(),
            method,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(body: &str) -> MethodSpec {
        MethodSpec {
            name: ENTRY_METHOD.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_container_keeps_insertion_order() {
        let mut container = ClassContainer::new();
        container.add_class(ClassSpec::new("B")).unwrap();
        container.add_class(ClassSpec::new("A")).unwrap();
        assert_eq!(container.class_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_container_rejects_duplicates() {
        let mut container = ClassContainer::new();
        container.add_class(ClassSpec::new("T")).unwrap();
        assert!(container.add_class(ClassSpec::new("T")).is_err());

        container.install_method("T", method("a")).unwrap();
        assert!(container.install_method("T", method("b")).is_err());
        assert!(container.install_method("U", method("c")).is_err());

        let field = FieldSpec {
            name: "GRPSPLIT0".into(),
            comment: "{1}".into(),
            value: vec![2],
        };
        container.add_field("T", field.clone()).unwrap();
        assert!(container.add_field("T", field).is_err());
        assert_eq!(container.get("T").unwrap().entry_body(), Some("a"));
    }

    #[test]
    fn test_staged_sink_replays_in_order() {
        let mut staged = StagedSink::new();
        staged.add_class(ClassSpec::new("T")).unwrap();
        staged.add_class(ClassSpec::new("T_1")).unwrap();
        staged.install_method("T_1", method("1.0f")).unwrap();
        staged.install_method("T", method("T_1.score0(data)")).unwrap();
        assert_eq!(staged.events().len(), 4);

        let mut container = ClassContainer::new();
        staged.commit_into(&mut container).unwrap();
        assert_eq!(container.class_names(), vec!["T", "T_1"]);
        assert_eq!(container.get("T_1").unwrap().entry_body(), Some("1.0f"));
    }
}

use serde_json::Value;

use super::{FieldDescriptor, FieldKind, SchemaDescriptor};

/// DescriptorBuilder helps construct a [`SchemaDescriptor`] incrementally.
///
/// Field order is preserved: it determines both the rendered JSON Schema
/// property order and the walk order during default synthesis.
#[derive(Debug, Default)]
pub struct DescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl DescriptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field with no declared default.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            kind,
            default: None,
        });
        self
    }

    /// Declare a field carrying its own default value. The default is only
    /// consulted by the synthesis steps that name it (empty unions and
    /// `Opaque` kinds).
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        default: Value,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            kind,
            default: Some(default),
        });
        self
    }

    pub fn build(self) -> SchemaDescriptor {
        SchemaDescriptor {
            name: self.name,
            fields: self.fields,
        }
    }
}

mod builder;
pub mod synth;
pub use builder::DescriptorBuilder;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::Result;

/// Classification of a single schema field.
///
/// Every field of a target type is classified exactly once, at
/// registration time, into one of these variants. The classification drives
/// both JSON Schema rendering (for providers with native structured output)
/// and safe-default synthesis (when all retries are exhausted).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// UTF-8 string
    String,
    /// Floating-point number
    Float,
    /// Integer number
    Integer,
    /// Boolean
    Boolean,
    /// Nullable field wrapping another kind (maps to `Option<T>`)
    Optional(Box<FieldKind>),
    /// Closed set of allowed JSON values, e.g. the variants of a unit enum.
    /// The first declared variant doubles as the synthesis default.
    Union(Vec<Value>),
    /// Homogeneous sequence of an element kind (maps to `Vec<T>`)
    Collection(Box<FieldKind>),
    /// String-keyed mapping to a value kind (maps to `HashMap<String, V>`)
    Map(Box<FieldKind>),
    /// Nested object with its own descriptor
    Nested(SchemaDescriptor),
    /// A kind the engine does not introspect. Synthesis falls back to the
    /// field's declared default, else JSON null.
    Opaque,
}

/// A single classified field of a target schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// The field's own declared default, consulted only where the synthesis
    /// precedence rules name it (empty unions and `Opaque` kinds).
    pub default: Option<Value>,
}

/// Ordered field classification of a target result type.
///
/// Descriptors are plain owned data: they cannot form reference cycles, and
/// synthesis additionally enforces a nesting-depth cap so a misdeclared
/// deeply-recursive descriptor fails fast instead of looping.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Create a builder for incremental descriptor construction.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(name)
    }

    /// Render this descriptor as a JSON Schema object suitable for a
    /// provider's native structured-output request.
    ///
    /// Non-optional fields are listed as `required`; `additionalProperties`
    /// is disabled so strict-mode providers reject stray keys.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.name.clone(), kind_to_json_schema(&field.kind));
            if !matches!(field.kind, FieldKind::Optional(_)) {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "title": self.name,
            "properties": Value::Object(properties),
            "required": Value::Array(required),
            "additionalProperties": false,
        })
    }
}

fn kind_to_json_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => json!({"type": "string"}),
        FieldKind::Float => json!({"type": "number"}),
        FieldKind::Integer => json!({"type": "integer"}),
        FieldKind::Boolean => json!({"type": "boolean"}),
        FieldKind::Optional(inner) => {
            json!({"anyOf": [kind_to_json_schema(inner), {"type": "null"}]})
        }
        FieldKind::Union(variants) => json!({"enum": variants}),
        FieldKind::Collection(elem) => {
            json!({"type": "array", "items": kind_to_json_schema(elem)})
        }
        FieldKind::Map(value_kind) => {
            json!({"type": "object", "additionalProperties": kind_to_json_schema(value_kind)})
        }
        FieldKind::Nested(descriptor) => descriptor.to_json_schema(),
        FieldKind::Opaque => json!({}),
    }
}

/// The `Describe` trait ties a result type to its schema descriptor and an
/// optional validation hook.
///
/// Implement `descriptor()` once per type, declaring every field's
/// classification. Override `validate` to apply domain rules beyond what
/// deserialization checks; it runs on every model response and on every
/// synthesized default before either is returned.
///
/// # Example
///
/// ```
/// use surecall::{Describe, DescriptorBuilder, FieldKind, SchemaDescriptor, SurecallError};
/// use serde::{Serialize, Deserialize};
/// use serde_json::json;
///
/// #[derive(Serialize, Deserialize, Debug)]
/// struct Assessment {
///     verdict: String,
///     confidence: f64,
/// }
///
/// impl Describe for Assessment {
///     fn descriptor() -> SchemaDescriptor {
///         DescriptorBuilder::new("Assessment")
///             .field("verdict", FieldKind::String)
///             .field("confidence", FieldKind::Float)
///             .build()
///     }
///
///     fn validate(&self) -> surecall::Result<()> {
///         if !(0.0..=100.0).contains(&self.confidence) {
///             return Err(SurecallError::ConstructionFailure(format!(
///                 "confidence out of range: {}",
///                 self.confidence
///             )));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Describe: DeserializeOwned + Serialize {
    /// The registration-time field classification for this type.
    fn descriptor() -> SchemaDescriptor;

    /// Optional validation logic beyond type checking.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

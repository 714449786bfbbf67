//! Safe-default synthesis.
//!
//! When every invocation attempt is exhausted, the engine still owes its
//! caller a schema-valid value. This module walks a [`SchemaDescriptor`] and
//! assembles one, using distinguishable sentinel values so downstream
//! consumers and tests can detect a degraded result.

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::{Describe, FieldDescriptor, FieldKind, SchemaDescriptor};
use crate::error::{Result, SurecallError};

/// Sentinel assigned to synthesized string fields. Deliberately never an
/// empty string, so real-but-empty model output stays distinguishable from
/// a synthesized default.
pub const SENTINEL_STRING: &str = "Error: Default value";

// Descriptors are owned data and cannot be cyclic, but a misdeclared
// deeply-recursive descriptor must fail fast rather than loop.
const MAX_NESTING_DEPTH: usize = 32;

/// A caller-supplied whole-object factory tried before per-field synthesis.
pub type DefaultFactory<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Build a schema-valid instance of `T` using no external data.
///
/// Precedence:
/// 1. the caller-supplied factory, for the whole object; a factory failure
///    (or factory output failing validation) is logged and falls through to
///    per-field synthesis, never propagated;
/// 2. per-field synthesis over `T::descriptor()`: string → the
///    [`SENTINEL_STRING`] marker, float → 0.0, integer → 0, boolean → false,
///    collection → empty array, map → empty object, union → its first
///    declared variant (a documented heuristic, not a correctness
///    guarantee), nested → recurse, optional → the inner kind's value when
///    derivable, else null.
///
/// # Errors
///
/// [`SurecallError::DefaultSynthesisFailure`] when the assembled object does
/// not deserialize into `T` or fails `T::validate`. That is a fatal
/// schema-configuration error: the engine exists to guarantee a valid value,
/// and here it cannot.
pub fn synthesize_default<T: Describe>(factory: Option<&DefaultFactory<T>>) -> Result<T> {
    if let Some(factory) = factory {
        match factory() {
            Ok(instance) => match instance.validate() {
                Ok(()) => {
                    debug!("default factory produced a valid instance");
                    return Ok(instance);
                }
                Err(e) => warn!(
                    error = %e,
                    "default factory output failed validation, falling back to field synthesis"
                ),
            },
            Err(e) => warn!(
                error = %e,
                "default factory failed, falling back to field synthesis"
            ),
        }
    }

    let descriptor = T::descriptor();
    debug!(schema = %descriptor.name, "synthesizing per-field default");
    let value = synthesize_object(&descriptor, 0)?;

    let instance: T = serde_json::from_value(value).map_err(|e| {
        SurecallError::DefaultSynthesisFailure(format!(
            "synthesized object does not deserialize into {}: {}",
            descriptor.name, e
        ))
    })?;
    instance.validate().map_err(|e| {
        SurecallError::DefaultSynthesisFailure(format!(
            "synthesized {} failed validation: {}",
            descriptor.name, e
        ))
    })?;
    Ok(instance)
}

fn synthesize_object(descriptor: &SchemaDescriptor, depth: usize) -> Result<Value> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SurecallError::DefaultSynthesisFailure(format!(
            "descriptor '{}' exceeds {} nesting levels; recursive descriptors are a configuration error",
            descriptor.name, MAX_NESTING_DEPTH
        )));
    }

    let mut object = Map::new();
    for field in &descriptor.fields {
        let value = synthesize_field(field, depth).map_err(|e| match e {
            SurecallError::DefaultSynthesisFailure(msg) => SurecallError::DefaultSynthesisFailure(
                format!("{}.{}: {}", descriptor.name, field.name, msg),
            ),
            other => other,
        })?;
        object.insert(field.name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn synthesize_field(field: &FieldDescriptor, depth: usize) -> Result<Value> {
    synthesize_kind(&field.kind, field.default.as_ref(), depth)
}

fn synthesize_kind(kind: &FieldKind, declared: Option<&Value>, depth: usize) -> Result<Value> {
    match kind {
        FieldKind::String => Ok(json!(SENTINEL_STRING)),
        FieldKind::Float => Ok(json!(0.0)),
        FieldKind::Integer => Ok(json!(0)),
        FieldKind::Boolean => Ok(json!(false)),
        // Prefer the inner kind's non-null value; resolve to null only when
        // none is derivable. Null is always legal here, so inner synthesis
        // failures degrade instead of propagating.
        FieldKind::Optional(inner) => {
            Ok(synthesize_kind(inner, declared, depth).unwrap_or(Value::Null))
        }
        FieldKind::Union(variants) => match variants.first() {
            Some(first) => Ok(first.clone()),
            None => declared.cloned().ok_or_else(|| {
                SurecallError::DefaultSynthesisFailure(
                    "union has no variants and no declared default".to_string(),
                )
            }),
        },
        FieldKind::Collection(_) => Ok(json!([])),
        FieldKind::Map(_) => Ok(json!({})),
        FieldKind::Nested(descriptor) => synthesize_object(descriptor, depth + 1),
        FieldKind::Opaque => Ok(declared.cloned().unwrap_or(Value::Null)),
    }
}

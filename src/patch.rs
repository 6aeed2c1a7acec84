//! Partial updates.
//!
//! A patch document is a list of single-field operations in the JSON Patch shape:
//!
//! ```json
//! [
//!   { "op": "replace", "path": "/DESCRIPTION", "value": "East wing" },
//!   { "op": "remove", "path": "/MANAGER_GUID" }
//! ]
//! ```
//!
//! Operations run in order against the stored entity's serialized form, and the result
//! must read back as a valid model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::core::{CrudResource, EntityMetadata};
use crate::errors::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Set the field; same effect as `replace`
    Add {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
    Replace {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
    /// Set the field to null
    Remove { path: String },
}

impl PatchOperation {
    #[must_use]
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Replace {
            path: path.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Replace { path, .. } | Self::Remove { path } => path,
        }
    }
}

/// Apply `operations` to a copy of `model`.
///
/// # Errors
///
/// - Configuration error for a path that does not name a field of `R`
/// - Validation error for a patch of the identifier, or a result that is not a valid model
pub fn apply_patch<R: CrudResource>(
    model: &R::Model,
    operations: &[PatchOperation],
) -> Result<R::Model, ApiError> {
    let serialization_error = |e: serde_json::Error| {
        ApiError::internal(
            format!("Failed to read {}", R::RESOURCE_NAME_SINGULAR),
            Some(e.to_string()),
        )
    };

    let Value::Object(mut document) = serde_json::to_value(model).map_err(serialization_error)?
    else {
        return Err(ApiError::internal(
            format!("Failed to read {}", R::RESOURCE_NAME_SINGULAR),
            Some("entity did not serialize to an object".to_string()),
        ));
    };

    apply_operations(&mut document, operations, R::metadata())?;

    serde_json::from_value(Value::Object(document)).map_err(|e| {
        ApiError::validation(format!(
            "invalid patch for {}: {e}",
            R::RESOURCE_NAME_SINGULAR
        ))
    })
}

/// Apply `operations` in order to a serialized entity.
///
/// # Errors
///
/// See [`apply_patch`].
pub fn apply_operations<C: sea_orm::ColumnTrait>(
    document: &mut Map<String, Value>,
    operations: &[PatchOperation],
    metadata: &EntityMetadata<C>,
) -> Result<(), ApiError> {
    for operation in operations {
        let name = field_name(operation.path())?;
        if metadata.field(&name).is_none() {
            return Err(ApiError::configuration(format!(
                "invalid patch path '{}'",
                operation.path()
            )));
        }
        if name == metadata.id_field() {
            return Err(ApiError::validation(format!(
                "'{name}' cannot be patched"
            )));
        }

        let value = match operation {
            PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
                value.clone()
            }
            PatchOperation::Remove { .. } => Value::Null,
        };
        document.insert(name, value);
    }
    Ok(())
}

/// Field named by a single-segment pointer such as `/DESCRIPTION`.
fn field_name(path: &str) -> Result<String, ApiError> {
    path.strip_prefix('/')
        .filter(|segment| !segment.is_empty() && !segment.contains('/'))
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .ok_or_else(|| ApiError::configuration(format!("invalid patch path '{path}'")))
}

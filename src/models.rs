use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Hierarchy definition
///
/// Held as the JSON the service sent; nothing is validated or dropped, so a
/// listed hierarchy can be written back unchanged. The accessors read the
/// well-known fields when they have the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hierarchy(Value);

impl Hierarchy {
    /// Build a hierarchy over the given instance fields, in order
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self(json!({
            "id": id.into(),
            "name": name.into(),
            "source": { "instanceFieldNames": fields },
        }))
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// `source.instanceFieldNames`, skipping entries that are not strings
    pub fn instance_field_names(&self) -> Vec<&str> {
        self.0
            .pointer("/source/instanceFieldNames")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Hierarchy {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Hierarchy> for Value {
    fn from(hierarchy: Hierarchy) -> Self {
        hierarchy.0
    }
}

/// Hierarchies collection, possibly one page of it
///
/// Top-level keys other than `hierarchies` and `continuationToken` are kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyListResult {
    pub hierarchies: Vec<Hierarchy>,
    #[serde(
        rename = "continuationToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continuation_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw page as received; `hierarchies` is checked before use
#[derive(Debug, Deserialize)]
pub(crate) struct HierarchyPage {
    pub hierarchies: Option<Vec<Hierarchy>>,
    #[serde(rename = "continuationToken")]
    pub continuation_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hierarchy ids or names, as used by batch get and delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchiesRequestBatchGetDelete {
    #[serde(rename = "hierarchyIds", skip_serializing_if = "Option::is_none")]
    pub hierarchy_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

/// Body of `POST /timeseries/hierarchies/$batch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyBatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<HierarchiesRequestBatchGetDelete>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Vec<Hierarchy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<HierarchiesRequestBatchGetDelete>,
}

/// Result of a hierarchies batch call; one entry per requested item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyBatchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Vec<HierarchyOrError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Vec<HierarchyOrError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<Option<TsiErrorBody>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyOrError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<Hierarchy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TsiErrorBody>,
}

impl HierarchyOrError {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Error object as the TSI service reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TsiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "innerError", default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<Box<TsiErrorBody>>,
}

/// Error response from API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<TsiErrorBody>,
}

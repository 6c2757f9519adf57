//! Message variants and payload types for Vislink's wire format.
//!
//! This module defines every type that travels "on the wire" — the
//! structures that get serialized to JSON, sent over the connection,
//! and deserialized on the other side.
//!
//! Every frame is an envelope `{"action": ..., "data": ...}`. The
//! `action` string is the discriminant: it tells the receiver which
//! payload schema `data` follows. Each body type below owns exactly one
//! action value, declared through [`MessageBody::ACTION`], and the
//! registry's keys agree with those values 1:1.
//!
//! Field names are fixed by the server's wire format: `columns`,
//! `columns_types`, `values`, `path`. Tests pin the exact JSON shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// MessageBody — the contract every variant implements
// ---------------------------------------------------------------------------

/// A concrete message variant's payload.
///
/// Implementing this trait is what makes a type registrable: the
/// registry stores one decode function per `ACTION`, and that function
/// deserializes `data` into the body, runs [`validate`](Self::validate),
/// and wraps the result into [`Message`] via the `Into` bound.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded body
/// owns all its data and doesn't borrow from the input frame — the
/// connection layer drops the raw frame right after decoding.
pub trait MessageBody:
    Serialize + DeserializeOwned + Into<Message>
{
    /// The action string identifying this variant on the wire.
    const ACTION: &'static str;

    /// Checks invariants that survive deserialization.
    ///
    /// Serde only verifies structure (fields present, right JSON
    /// types); this hook rejects payloads that are structurally valid
    /// but semantically broken, such as jagged dataset rows. The
    /// default accepts everything.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedPayload`] naming the
    /// offending field.
    fn validate(&self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Data — the tabular dataset payload
// ---------------------------------------------------------------------------

/// A tabular dataset: named, typed columns and numeric rows.
///
/// Invariant: `columns`, `columns_types`, and every row of `values`
/// all have the same length. A payload violating this is malformed and
/// rejected whole — rows are never silently truncated to fit.
///
/// The consumer boundary (plotting, GPU upload) takes a `Data` and
/// owns everything past it; this layer only guarantees the shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Data {
    /// Column names, in dataset order.
    pub columns: Vec<String>,

    /// Per-column type tags, same order and length as `columns`.
    #[serde(rename = "columns_types")]
    pub columns_types: Vec<String>,

    /// Rows of numeric values; every row as wide as `columns`.
    pub values: Vec<Vec<f64>>,
}

impl Data {
    /// Verifies the column/row length invariant.
    ///
    /// Returns a human-readable description of the first violation,
    /// naming the offending field.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.columns_types.len() != self.columns.len() {
            return Err(format!(
                "`columns_types` has {} entries but `columns` has {}",
                self.columns_types.len(),
                self.columns.len(),
            ));
        }
        for (i, row) in self.values.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(format!(
                    "`values` row {i} has {} entries but `columns` has {}",
                    row.len(),
                    self.columns.len(),
                ));
            }
        }
        Ok(())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

// ---------------------------------------------------------------------------
// Variant bodies
// ---------------------------------------------------------------------------

/// Liveness/handshake marker. No payload; `data` is `{}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hello {}

impl MessageBody for Hello {
    const ACTION: &'static str = "hello";
}

/// Client → server: ask the server to load a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDataset {
    /// Path or identifier of the dataset on the server side.
    pub path: String,
}

impl LoadDataset {
    /// Creates a request for the given server-side path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl MessageBody for LoadDataset {
    const ACTION: &'static str = "load_dataset";
}

/// Server → client: the dataset a [`LoadDataset`] request asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadDatasetResult {
    /// The decoded dataset.
    pub data: Data,
}

impl MessageBody for LoadDatasetResult {
    const ACTION: &'static str = "load_dataset_result";

    fn validate(&self) -> Result<(), ProtocolError> {
        self.data.check_shape().map_err(|detail| {
            ProtocolError::MalformedPayload {
                action: Self::ACTION,
                detail,
            }
        })
    }
}

/// Generic/untyped response: an open mapping of string key to value.
///
/// Used by the server for replies that have no dedicated variant; a
/// catch-all rather than a schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response {
    /// The raw key/value fields of the reply.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl MessageBody for Response {
    const ACTION: &'static str = "response";
}

// ---------------------------------------------------------------------------
// Message — the closed set of decoded variants
// ---------------------------------------------------------------------------

/// A decoded, strongly identified message.
///
/// This is what the connection layer hands the driver once a frame has
/// made it through the codec. The enum is closed: the registry decides
/// at runtime *which* of these a frame becomes, but the set itself is
/// declared here, statically.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Liveness/handshake marker (`hello`).
    Hello(Hello),
    /// Dataset-load request (`load_dataset`).
    LoadDataset(LoadDataset),
    /// Dataset-load result (`load_dataset_result`).
    LoadDatasetResult(LoadDatasetResult),
    /// Generic untyped reply (`response`).
    Response(Response),
}

impl Message {
    /// The action string this message carries on the wire.
    pub fn action(&self) -> &'static str {
        match self {
            Message::Hello(_) => Hello::ACTION,
            Message::LoadDataset(_) => LoadDataset::ACTION,
            Message::LoadDatasetResult(_) => LoadDatasetResult::ACTION,
            Message::Response(_) => Response::ACTION,
        }
    }

    /// Serializes this message's payload — the `data` half of the
    /// envelope — as a JSON value.
    pub(crate) fn payload_value(
        &self,
    ) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Message::Hello(body) => serde_json::to_value(body),
            Message::LoadDataset(body) => serde_json::to_value(body),
            Message::LoadDatasetResult(body) => serde_json::to_value(body),
            Message::Response(body) => serde_json::to_value(body),
        }
    }
}

impl From<Hello> for Message {
    fn from(body: Hello) -> Self {
        Message::Hello(body)
    }
}

impl From<LoadDataset> for Message {
    fn from(body: LoadDataset) -> Self {
        Message::LoadDataset(body)
    }
}

impl From<LoadDatasetResult> for Message {
    fn from(body: LoadDatasetResult) -> Self {
        Message::LoadDatasetResult(body)
    }
}

impl From<Response> for Message {
    fn from(body: Response) -> Self {
        Message::Response(body)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The server's wire format defines exact JSON shapes. These tests
    //! pin them, because a field-name mismatch means the client and
    //! server silently stop understanding each other.

    use super::*;

    // =====================================================================
    // Actions
    // =====================================================================

    #[test]
    fn test_each_variant_owns_its_action() {
        assert_eq!(Hello::ACTION, "hello");
        assert_eq!(LoadDataset::ACTION, "load_dataset");
        assert_eq!(LoadDatasetResult::ACTION, "load_dataset_result");
        assert_eq!(Response::ACTION, "response");
    }

    #[test]
    fn test_message_action_matches_body_action() {
        assert_eq!(Message::Hello(Hello {}).action(), "hello");
        assert_eq!(
            Message::LoadDataset(LoadDataset::new("/tmp/a.csv")).action(),
            "load_dataset"
        );
        assert_eq!(
            Message::LoadDatasetResult(LoadDatasetResult {
                data: Data::default()
            })
            .action(),
            "load_dataset_result"
        );
        assert_eq!(
            Message::Response(Response::default()).action(),
            "response"
        );
    }

    // =====================================================================
    // Wire shapes
    // =====================================================================

    #[test]
    fn test_hello_serializes_as_empty_object() {
        let json = serde_json::to_string(&Hello {}).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_load_dataset_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(LoadDataset::new("/data/a.csv")).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "/data/a.csv" }));
    }

    #[test]
    fn test_data_uses_columns_types_field_name() {
        // The wire field is `columns_types`, not `column_types` —
        // fixed by the server, easy to fat-finger in a rename.
        let data = Data {
            columns: vec!["x".into()],
            columns_types: vec!["float".into()],
            values: vec![vec![1.0]],
        };
        let json: serde_json::Value = serde_json::to_value(&data).unwrap();
        assert!(json.get("columns_types").is_some());
        assert!(json.get("columnsTypes").is_none());
    }

    #[test]
    fn test_load_dataset_result_is_transparent() {
        // `#[serde(transparent)]` means the result body *is* the Data
        // object on the wire, not `{"data": {...}}`.
        let body = LoadDatasetResult {
            data: Data {
                columns: vec!["x".into(), "y".into()],
                columns_types: vec!["float".into(), "float".into()],
                values: vec![vec![1.0, 2.0]],
            },
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["x", "y"]));
        assert_eq!(json["values"], serde_json::json!([[1.0, 2.0]]));
    }

    #[test]
    fn test_response_round_trips_arbitrary_fields() {
        let raw = r#"{"status": "ok", "count": 3, "nested": {"a": true}}"#;
        let body: Response = serde_json::from_str(raw).unwrap();
        assert_eq!(body.fields["status"], "ok");
        assert_eq!(body.fields["count"], 3);

        let back = serde_json::to_value(&body).unwrap();
        let original: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back, original);
    }

    // =====================================================================
    // Data shape invariant
    // =====================================================================

    fn two_column_data() -> Data {
        Data {
            columns: vec!["x".into(), "y".into()],
            columns_types: vec!["float".into(), "float".into()],
            values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        }
    }

    #[test]
    fn test_check_shape_accepts_rectangular_data() {
        assert!(two_column_data().check_shape().is_ok());
    }

    #[test]
    fn test_check_shape_accepts_zero_rows() {
        let mut data = two_column_data();
        data.values.clear();
        assert!(data.check_shape().is_ok());
    }

    #[test]
    fn test_check_shape_rejects_jagged_row_naming_values() {
        let mut data = two_column_data();
        data.values.push(vec![5.0]); // row 2, one entry short
        let detail = data.check_shape().unwrap_err();
        assert!(detail.contains("`values` row 2"), "got: {detail}");
    }

    #[test]
    fn test_check_shape_rejects_type_tag_mismatch() {
        let mut data = two_column_data();
        data.columns_types.pop();
        let detail = data.check_shape().unwrap_err();
        assert!(detail.contains("`columns_types`"), "got: {detail}");
    }

    #[test]
    fn test_validate_maps_jagged_rows_to_malformed_payload() {
        let mut data = two_column_data();
        data.values[1] = vec![9.0, 9.0, 9.0];
        let body = LoadDatasetResult { data };
        let err = body.validate().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedPayload {
                action: "load_dataset_result",
                ..
            }
        ));
    }

    #[test]
    fn test_row_count() {
        assert_eq!(two_column_data().row_count(), 2);
    }
}

//! Open mHealth data point wire format.

use crate::error::Result;
use ohmage_core::StreamRecord;
use serde::{Deserialize, Serialize};

/// Modality recorded for buffered stream data.
pub const SENSED_MODALITY: &str = "sensed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub header: DataPointHeader,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPointHeader {
    pub id: String,
    pub creation_date_time: String,
    pub schema_id: SchemaId,
    pub acquisition_provenance: AcquisitionProvenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaId {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionProvenance {
    pub source_name: String,
    pub modality: String,
}

impl DataPoint {
    /// Build the upload body for a buffered record. Fails if the payload is
    /// not valid JSON.
    pub fn from_record(record: &StreamRecord, source_name: &str) -> Result<Self> {
        let body = serde_json::from_str(&record.payload)?;
        Ok(Self {
            header: DataPointHeader {
                id: record.point_id.clone(),
                creation_date_time: record.created_at.clone(),
                schema_id: SchemaId {
                    namespace: record.stream.namespace.clone(),
                    name: record.stream.name.clone(),
                    version: record.stream.version.clone(),
                },
                acquisition_provenance: AcquisitionProvenance {
                    source_name: source_name.to_string(),
                    modality: SENSED_MODALITY.to_string(),
                },
            },
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohmage_core::StreamId;
    use serde_json::json;

    #[test]
    fn wire_format_matches_omh_header() {
        let record = StreamRecord::new(
            "b1f0",
            StreamId::new("omh", "step-count", "1.0"),
            "alice",
            "2024-05-01T10:00:00Z",
            r#"{"step_count":120}"#,
        );
        let point = DataPoint::from_record(&record, "ohmage").expect("valid payload");
        let value = serde_json::to_value(&point).expect("serialize");

        assert_eq!(
            value,
            json!({
                "header": {
                    "id": "b1f0",
                    "creation_date_time": "2024-05-01T10:00:00Z",
                    "schema_id": {"namespace": "omh", "name": "step-count", "version": "1.0"},
                    "acquisition_provenance": {"source_name": "ohmage", "modality": "sensed"}
                },
                "body": {"step_count": 120}
            })
        );
    }

    #[test]
    fn invalid_payload_is_an_error() {
        let record = StreamRecord::new(
            "b1f0",
            StreamId::new("omh", "step-count", "1.0"),
            "alice",
            "2024-05-01T10:00:00Z",
            "not json",
        );
        assert!(DataPoint::from_record(&record, "ohmage").is_err());
    }
}

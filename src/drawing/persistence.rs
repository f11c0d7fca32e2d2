use serde::{Deserialize, Serialize};

use crate::drawing::DrawingObject;
use crate::error::{ChartError, ChartResult};

pub const DRAWINGS_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingsJsonContractV1 {
    pub schema_version: u32,
    pub objects: Vec<DrawingObject>,
}

pub fn drawings_to_json_contract_v1_pretty(objects: Vec<DrawingObject>) -> ChartResult<String> {
    let payload = DrawingsJsonContractV1 {
        schema_version: DRAWINGS_JSON_SCHEMA_V1,
        objects,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Accepts either the versioned contract or a bare object array.
pub fn drawings_from_json_compat_str(input: &str) -> ChartResult<Vec<DrawingObject>> {
    if let Ok(objects) = serde_json::from_str::<Vec<DrawingObject>>(input) {
        return Ok(objects);
    }
    let payload: DrawingsJsonContractV1 = serde_json::from_str(input)?;
    if payload.schema_version != DRAWINGS_JSON_SCHEMA_V1 {
        return Err(ChartError::InvalidData(format!(
            "unsupported drawings schema version: {}",
            payload.schema_version
        )));
    }
    Ok(payload.objects)
}

#[cfg(test)]
mod tests {
    use super::drawings_from_json_compat_str;
    use crate::error::ChartError;

    #[test]
    fn accepts_bare_array() {
        let input = r#"[{"id":"d1","tool":"HorizontalLine","points":[{"t":3.0,"p":10.5}],"created_at":0}]"#;
        let objects = drawings_from_json_compat_str(input).expect("parse");
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].points[0].p, 10.5);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let input = r#"{"schema_version":9,"objects":[]}"#;
        assert!(matches!(
            drawings_from_json_compat_str(input),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[test]
    fn malformed_input_is_a_serialization_error() {
        assert!(matches!(
            drawings_from_json_compat_str("{not json"),
            Err(ChartError::Serialization(_))
        ));
    }
}

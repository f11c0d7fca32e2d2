use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{ChartEngine, ChartEngineConfig};

pub const ENGINE_CONFIG_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: ChartEngineConfig,
}

impl ChartEngineConfig {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartEngineConfigJsonContractV1 {
            schema_version: ENGINE_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Parses either the bare config object or the versioned contract.
    /// The result is validated.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let payload = match serde_json::from_str::<ChartEngineConfigJsonContractV1>(input) {
            Ok(payload) => payload,
            Err(_) => {
                let config = serde_json::from_str::<ChartEngineConfig>(input)?;
                return config.validate();
            }
        };
        if payload.schema_version != ENGINE_CONFIG_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported engine config schema version: {}",
                payload.schema_version
            )));
        }
        payload.config.validate()
    }
}

impl<R: Renderer> ChartEngine<R> {
    pub fn config_json_contract_v1_pretty(&self) -> ChartResult<String> {
        self.core.config.to_json_contract_v1_pretty()
    }

    /// Serialized drawings in the versioned contract, for external persistence.
    pub fn export_drawings(&self) -> ChartResult<String> {
        self.core.drawings.export_json()
    }

    /// Replaces all drawings from JSON produced by [`Self::export_drawings`]
    /// or a bare object array. The previous set stays reachable via undo.
    pub fn import_drawings(&mut self, input: &str) -> ChartResult<()> {
        self.core.drawings.import_json(input)?;
        self.after_drawings_changed();
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::WorldError;

/// Tunables fixed when a world is created.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it changes:
///
/// ```rust
/// use frontier_world::WorldConfig;
///
/// let config = WorldConfig::from_json(r#"{ "burn_requires_online": false }"#).unwrap();
/// assert!(!config.burn_requires_online);
/// assert_eq!(config.protocol_version, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Name the world id is derived from. Two worlds with different names
    /// never accept each other's capabilities.
    pub world_name: String,

    /// Protocol version requests must be built against.
    pub protocol_version: u64,

    /// Whether burning items out of an assembly requires it to be online.
    pub burn_requires_online: bool,

    /// Upper bound on the auxiliary data a proximity proof may carry.
    pub max_proof_data_len: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_name: "frontier".into(),
            protocol_version: 1,
            burn_requires_online: true,
            max_proof_data_len: 1024,
        }
    }
}

impl WorldConfig {
    /// Parse a configuration from JSON, filling in defaults for missing
    /// fields.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_defaults_every_field() -> TestResult {
        assert_eq!(WorldConfig::from_json("{}")?, WorldConfig::default());
        Ok(())
    }

    #[test]
    fn it_overrides_named_fields() -> TestResult {
        let config = WorldConfig::from_json(r#"{ "protocol_version": 3, "max_proof_data_len": 16 }"#)?;
        assert_eq!(config.protocol_version, 3);
        assert_eq!(config.max_proof_data_len, 16);
        assert!(config.burn_requires_online);
        Ok(())
    }

    #[test]
    fn it_reports_malformed_json() {
        assert!(matches!(
            WorldConfig::from_json("{ protocol_version: }"),
            Err(WorldError::Config(_))
        ));
    }
}

//! Ika network configuration.
//!
//! This crate provides the addressing the dWallet SDK needs to reach an Ika
//! deployment on Sui:
//!
//! - [`IkaConfig`] -- packages, shared objects, and the default IKA fee coin
//! - [`IkaPackageConfig`] / [`IkaObjectsConfig`] -- the `ika_config.json` sections
//! - [`constants`] -- Move module/function names, protocol parameters, polling defaults
//!
//! `ika-config` depends only on [`ika_sdk_core`] and serde. It does **not**
//! depend on the SDK runtime, so it can be used freely as a leaf dependency.

pub mod constants;
pub mod packages;

pub use packages::{IkaObjectsConfig, IkaPackageConfig};

use std::fmt;

use ika_sdk_core::ObjectId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors from loading an [`IkaConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON or misses a required field.
    InvalidDocument(String),

    /// A constant in [`constants`] failed to parse as an object id.
    InvalidConstant(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDocument(detail) => write!(f, "invalid ika config: {detail}"),
            Self::InvalidConstant(name) => write!(f, "invalid built-in constant: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// IkaConfig
// ---------------------------------------------------------------------------

/// Addressing for one Ika deployment.
///
/// Read-only for the lifetime of an SDK instance. Every request the SDK
/// builds targets `packages.ika_dwallet_2pc_mpc_package_id` and the shared
/// coordinator at `objects.ika_dwallet_coordinator_object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkaConfig {
    /// Published packages.
    pub packages: IkaPackageConfig,

    /// Shared objects.
    pub objects: IkaObjectsConfig,

    /// IKA coin used when a caller pays with an explicit SUI coin but omits
    /// the IKA coin. Falls back to [`constants::DEFAULT_IKA_COIN_ID`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ika_coin_id: Option<ObjectId>,
}

impl IkaConfig {
    /// Creates a configuration from the two required package ids and the
    /// coordinator object id.
    pub fn new(
        ika_package_id: ObjectId,
        ika_dwallet_2pc_mpc_package_id: ObjectId,
        ika_dwallet_coordinator_object_id: ObjectId,
    ) -> Self {
        Self {
            packages: IkaPackageConfig {
                ika_package_id,
                ika_common_package_id: None,
                ika_dwallet_2pc_mpc_package_id,
                ika_system_package_id: None,
            },
            objects: IkaObjectsConfig {
                ika_dwallet_coordinator_object_id,
                ika_system_object_id: None,
            },
            default_ika_coin_id: None,
        }
    }

    /// Parses an `ika_config.json` document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidDocument(e.to_string()))
    }

    /// Overrides the default IKA fee coin.
    pub fn with_default_ika_coin(mut self, coin_id: ObjectId) -> Self {
        self.default_ika_coin_id = Some(coin_id);
        self
    }

    /// Package hosting the coordinator entry points.
    pub fn dwallet_package_id(&self) -> ObjectId {
        self.packages.ika_dwallet_2pc_mpc_package_id
    }

    /// The shared coordinator object.
    pub fn coordinator_object_id(&self) -> ObjectId {
        self.objects.ika_dwallet_coordinator_object_id
    }

    /// Fully qualified IKA coin type, e.g. `0x…::ika::IKA`.
    pub fn ika_coin_type(&self) -> String {
        format!(
            "{}::{}::{}",
            self.packages.ika_package_id,
            constants::IKA_COIN_MODULE_NAME,
            constants::IKA_COIN_STRUCT_NAME
        )
    }

    /// IKA coin to use when the caller did not supply one.
    pub fn default_ika_coin_id(&self) -> Result<ObjectId, ConfigError> {
        match self.default_ika_coin_id {
            Some(id) => Ok(id),
            None => ObjectId::from_hex(constants::DEFAULT_IKA_COIN_ID)
                .map_err(|_| ConfigError::InvalidConstant("DEFAULT_IKA_COIN_ID")),
        }
    }

    /// The Sui framework package (`0x2`).
    pub fn sui_framework_package_id(&self) -> Result<ObjectId, ConfigError> {
        ObjectId::from_hex(constants::SUI_FRAMEWORK_PACKAGE_ID)
            .map_err(|_| ConfigError::InvalidConstant("SUI_FRAMEWORK_PACKAGE_ID"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "packages": {
            "ika_package_id": "0x1a",
            "ika_common_package_id": "0x1b",
            "ika_dwallet_2pc_mpc_package_id": "0x1c",
            "ika_system_package_id": "0x1d"
        },
        "objects": {
            "ika_system_object_id": "0x2a",
            "ika_dwallet_coordinator_object_id": "0x2b"
        }
    }"#;

    fn id(s: &str) -> ObjectId {
        ObjectId::from_hex(s).unwrap()
    }

    #[test]
    fn parses_deployment_file() {
        let config = IkaConfig::from_json(CONFIG_JSON).unwrap();
        assert_eq!(config.packages.ika_package_id, id("0x1a"));
        assert_eq!(config.dwallet_package_id(), id("0x1c"));
        assert_eq!(config.coordinator_object_id(), id("0x2b"));
        assert_eq!(config.objects.ika_system_object_id, Some(id("0x2a")));
        assert!(config.default_ika_coin_id.is_none());
    }

    #[test]
    fn missing_coordinator_is_rejected() {
        let json = r#"{
            "packages": { "ika_package_id": "0x1", "ika_dwallet_2pc_mpc_package_id": "0x2" },
            "objects": {}
        }"#;
        assert!(matches!(
            IkaConfig::from_json(json),
            Err(ConfigError::InvalidDocument(_))
        ));
    }

    #[test]
    fn ika_coin_type_uses_ika_package() {
        let config = IkaConfig::new(id("0x1a"), id("0x1c"), id("0x2b"));
        assert_eq!(
            config.ika_coin_type(),
            format!("{}::ika::IKA", id("0x1a"))
        );
    }

    #[test]
    fn default_ika_coin_falls_back_to_constant() {
        let config = IkaConfig::new(id("0x1"), id("0x2"), id("0x3"));
        assert_eq!(
            config.default_ika_coin_id().unwrap(),
            id(constants::DEFAULT_IKA_COIN_ID)
        );
    }

    #[test]
    fn default_ika_coin_override() {
        let config =
            IkaConfig::new(id("0x1"), id("0x2"), id("0x3")).with_default_ika_coin(id("0xf2"));
        assert_eq!(config.default_ika_coin_id().unwrap(), id("0xf2"));
    }

    #[test]
    fn framework_package_is_0x2() {
        let config = IkaConfig::new(id("0x1"), id("0x2"), id("0x3"));
        assert_eq!(config.sui_framework_package_id().unwrap(), id("0x2"));
    }
}

//! Package and shared-object addressing for an Ika deployment.
//!
//! Field names match the `ika_config.json` file published with each
//! deployment so the file can be deserialized directly.

use ika_sdk_core::ObjectId;
use serde::{Deserialize, Serialize};

/// Move packages published by an Ika deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkaPackageConfig {
    /// Package defining the IKA coin type.
    pub ika_package_id: ObjectId,

    /// Package defining shared Ika utilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ika_common_package_id: Option<ObjectId>,

    /// Package hosting the dWallet 2PC-MPC coordinator.
    pub ika_dwallet_2pc_mpc_package_id: ObjectId,

    /// Package hosting the Ika system object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ika_system_package_id: Option<ObjectId>,
}

/// Shared objects created by an Ika deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkaObjectsConfig {
    /// The shared dWallet coordinator object.
    pub ika_dwallet_coordinator_object_id: ObjectId,

    /// The shared Ika system object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ika_system_object_id: Option<ObjectId>,
}

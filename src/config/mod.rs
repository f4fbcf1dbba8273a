//! Versioned offset tables
//!
//! Structural offsets into the target change with every build of the
//! target, so they are data: a JSON document maps a build identifier to the
//! process/module names and the offset table for that build.
//!
//! ```json
//! {
//!   "builds": {
//!     "example-build": {
//!       "process_name": "Game-Win64-Shipping.exe",
//!       "module_name": "Game-Win64-Shipping.exe",
//!       "offsets": { "uworld": "0x739E8F8", "game_instance": "0x1B8", ... }
//!     }
//!   }
//! }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Offsets for one target build
///
/// `uworld` is relative to the main module base; everything else is relative
/// to the object that holds the field. Values may be written as JSON numbers
/// or `"0x…"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    /// Global `UWorld*` (module-relative)
    #[serde(with = "hex")]
    pub uworld: usize,
    /// `UWorld::OwningGameInstance`
    #[serde(with = "hex")]
    pub game_instance: usize,
    /// `UWorld::GameState`
    #[serde(with = "hex")]
    pub game_state: usize,
    /// `UGameInstance::LocalPlayers` (`TArray<ULocalPlayer*>`)
    #[serde(with = "hex")]
    pub local_players: usize,
    /// `UPlayer::PlayerController`
    #[serde(with = "hex")]
    pub player_controller: usize,
    /// `APlayerController::AcknowledgedPawn`
    #[serde(with = "hex")]
    pub local_pawn: usize,
    /// `APlayerController::PlayerCameraManager`
    #[serde(with = "hex")]
    pub player_camera_manager: usize,
    /// `APlayerCameraManager::CameraCachePrivate`
    #[serde(with = "hex")]
    pub camera_cache: usize,
    /// `FCameraCacheEntry::POV`
    #[serde(with = "hex")]
    pub camera_pov: usize,
    /// `AGameStateBase::PlayerArray` (`TArray<APlayerState*>`)
    #[serde(with = "hex")]
    pub player_array: usize,
    /// `APlayerState::PawnPrivate`
    #[serde(with = "hex")]
    pub pawn_private: usize,
    /// `ACharacter::Mesh`
    #[serde(with = "hex")]
    pub mesh: usize,
    /// `USceneComponent::ComponentToWorld`, found with `farsight-calibrate`
    #[serde(with = "hex")]
    pub component_to_world: usize,
    /// Bone transform array on the skeletal mesh component, if known
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub bone_array: Option<usize>,
}

/// Everything needed to attach to one target build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    /// Executable name of the target process
    pub process_name: String,
    /// Module whose base `OffsetTable::uworld` is relative to
    pub module_name: String,
    /// Offsets for this build
    pub offsets: OffsetTable,
}

/// Offset tables keyed by target build identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetConfig {
    /// Profiles keyed by build identifier
    pub builds: BTreeMap<String, TargetProfile>,
}

impl OffsetConfig {
    /// Parse a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;

        tracing::debug!(
            "Loaded {} build profile(s) from {}",
            config.builds.len(),
            path.display()
        );

        Ok(config)
    }

    /// Profile for `build`, or [`Error::UnknownBuild`]
    pub fn for_build(&self, build: &str) -> Result<&TargetProfile> {
        self.builds
            .get(build)
            .ok_or_else(|| Error::UnknownBuild(build.to_string()))
    }

    /// Serialize back to pretty JSON, offsets as hex strings
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse `0x`-prefixed hex or plain decimal
pub fn parse_offset(text: &str) -> std::result::Result<usize, std::num::ParseIntError> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => usize::from_str_radix(digits, 16),
        None => text.parse(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffset {
    Number(u64),
    Text(String),
}

impl RawOffset {
    fn resolve<E: serde::de::Error>(self) -> std::result::Result<usize, E> {
        match self {
            RawOffset::Number(n) => Ok(n as usize),
            RawOffset::Text(s) => {
                parse_offset(&s).map_err(|e| E::custom(format!("invalid offset {:?}: {}", s, e)))
            }
        }
    }
}

mod hex {
    use super::RawOffset;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &usize, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#X}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        RawOffset::deserialize(deserializer)?.resolve()
    }
}

mod hex_opt {
    use super::RawOffset;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::hex::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        Option::<RawOffset>::deserialize(deserializer)?
            .map(RawOffset::resolve)
            .transpose()
    }
}

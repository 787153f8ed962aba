//! Pose & Import Settings
//!
//! Configuration for clip import and pose evaluation.
//!
//! All settings structs implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial JSON document only overrides the fields
//! it names:
//!
//! ```rust,ignore
//! use myth_pose::settings::{Settings, RotationBlend};
//!
//! let settings = Settings::from_json_str(r#"{ "pose": { "rotation_blend": "raw" } }"#)?;
//! assert_eq!(settings.pose.rotation_blend, RotationBlend::Raw);
//! assert_eq!(settings.import.default_ticks_per_second, 25.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Ticks-per-second used when an imported clip does not specify a rate.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Maximum number of bone influences packed per vertex.
pub const MAX_INFLUENCES: usize = 4;

// ---------------------------------------------------------------------------
// RotationBlend
// ---------------------------------------------------------------------------

/// How two rotation keyframes are blended.
///
/// Both modes normalize the endpoints and flip the second one onto the same
/// hemisphere as the first before blending component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationBlend {
    /// Renormalize the blended quaternion so it stays a unit rotation.
    #[default]
    Normalized,
    /// Return the component-wise blend as-is. The result is slightly shorter
    /// than unit length for factors strictly between 0 and 1.
    Raw,
}

// ---------------------------------------------------------------------------
// PoseSettings
// ---------------------------------------------------------------------------

/// Settings consumed by [`Avatar`](crate::Avatar) during pose evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSettings {
    pub rotation_blend: RotationBlend,
}

// ---------------------------------------------------------------------------
// ImportSettings
// ---------------------------------------------------------------------------

/// Settings consumed when converting imported data into clips and influences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Rate substituted when a clip reports `0` ticks per second.
    pub default_ticks_per_second: f32,
    /// Per-vertex influence limit for [`pack_vertex_influences`](crate::skeleton::pack_vertex_influences).
    /// Values above [`MAX_INFLUENCES`] are clamped.
    pub max_influences: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_influences: MAX_INFLUENCES,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Top-level settings document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pose: PoseSettings,
    pub import: ImportSettings,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

use crate::feature::{DlssPerfQualityMode, FeatureId};
use glam::UVec2;

/// State of the upscaler device, as shown in debug overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Unknown,
    /// The native backend library could not be loaded.
    MissingBackend,
    /// The backend is loaded but no device could be opened.
    DeviceCreationFailed,
    Active,
}

/// One row of the per-feature debug table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureDebugInfo {
    pub feature: FeatureId,
    pub valid: bool,
    pub input_resolution: UVec2,
    pub output_resolution: UVec2,
    pub perf_quality: DlssPerfQualityMode,
}

/// Snapshot of device and feature state for debug UIs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugView {
    pub device_state: DeviceState,
    /// Version of the loaded backend library, or `None` if it is not loaded.
    pub backend_version: Option<u32>,
    /// Version of the upscaler API exposed by the opened device.
    pub api_version: Option<u32>,
    pub super_sampling_supported: bool,
    pub features: Vec<FeatureDebugInfo>,
}

impl DebugView {
    /// Forget everything, so nothing refers to a destroyed device.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

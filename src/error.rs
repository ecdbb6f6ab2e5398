use crate::resources::TextureHandle;

/// Errors reported while probing the upscaler backend or creating features.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DlssError {
    #[error("DLSS backend is not loaded")]
    BackendNotLoaded,
    #[error("DLSS backend version mismatch: built against {expected:#x}, found {found:#x}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("GPU vendor {0:#06x} does not support DLSS")]
    UnsupportedVendor(u32),
    #[error("Failed to create DLSS device: {0}")]
    DeviceCreationFailed(String),
    #[error("DLSS super sampling is not available on this device")]
    FeatureUnavailable,
    #[error("Failed to create DLSS feature: {0}")]
    FeatureCreationFailed(String),
    #[error("Render graph texture {0:?} could not be resolved")]
    UnresolvedTexture(TextureHandle),
}

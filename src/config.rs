use crate::feature::DlssFeatureFlags;

/// Number of frames a camera may go without [`crate::DlssPass::begin_frame`] before its state is released.
pub const DEFAULT_EXPIRATION_FRAMES: u64 = 400;

/// Policy constants of a [`crate::DlssPass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DlssConfig {
    /// Idle frames after which a camera's features are destroyed, even if the camera is alive.
    pub expiration_frames: u64,
    /// Flags every feature is created with.
    pub feature_flags: DlssFeatureFlags,
    /// Exposure the color input was scaled by before upscaling.
    pub pre_exposure: f32,
    /// Mirror the on-screen debug indicator horizontally.
    pub invert_x_axis: bool,
    /// Mirror the on-screen debug indicator vertically.
    pub invert_y_axis: bool,
}

impl Default for DlssConfig {
    fn default() -> Self {
        Self {
            expiration_frames: DEFAULT_EXPIRATION_FRAMES,
            feature_flags: DlssFeatureFlags::default(),
            pre_exposure: 1.0,
            invert_x_axis: false,
            invert_y_axis: true,
        }
    }
}

use bitflags::bitflags;
use glam::{UVec2, Vec2};

/// Performance/quality tier the upscaler is created with.
///
/// Discriminants match the native `NVSDK_NGX_PerfQuality_Value` enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum DlssPerfQualityMode {
    MaxPerformance = 0,
    #[default]
    Balanced = 1,
    MaxQuality = 2,
    UltraPerformance = 3,
    UltraQuality = 4,
    /// Anti-aliasing only, input and output resolution are equal.
    Dlaa = 5,
}

impl DlssPerfQualityMode {
    /// Native integer value passed to the backend.
    pub fn as_native(self) -> u32 {
        self as u32
    }

    /// Ratio of render resolution to output resolution for this tier.
    pub fn render_scale(self) -> f32 {
        match self {
            Self::MaxPerformance => 0.5,
            Self::Balanced => 0.58,
            Self::MaxQuality => 0.667,
            Self::UltraPerformance => 0.333,
            Self::UltraQuality => 0.77,
            Self::Dlaa => 1.0,
        }
    }

    /// Recommended resolution to render at before upscaling to `output_resolution`.
    pub fn optimal_render_resolution(self, output_resolution: UVec2) -> UVec2 {
        if self == Self::Dlaa {
            return output_resolution;
        }

        let scaled = (output_resolution.as_vec2() * self.render_scale()).round();
        scaled.as_uvec2().max(UVec2::ONE)
    }
}

bitflags! {
    /// Flags the native feature is created with.
    ///
    /// Bit values match `NVSDK_NGX_DLSS_Feature_Flags`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DlssFeatureFlags: u32 {
        const HighDynamicRange = 1 << 0;
        const LowResolutionMotionVectors = 1 << 1;
        const JitteredMotionVectors = 1 << 2;
        const InvertedDepth = 1 << 3;
        const Sharpening = 1 << 5;
        const AutoExposure = 1 << 6;
    }
}

impl Default for DlssFeatureFlags {
    fn default() -> Self {
        Self::HighDynamicRange
            | Self::LowResolutionMotionVectors
            | Self::InvertedDepth
            | Self::Sharpening
    }
}

/// Identifier of a native feature slot, as referenced by recorded commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u32);

/// Owned handle to a native upscaler feature.
///
/// Not `Clone`: exactly one [`crate::ViewState`] owns a feature, and
/// destroying it consumes the handle.
#[derive(Debug, PartialEq, Eq)]
pub struct FeatureHandle(FeatureId);

impl FeatureHandle {
    /// Wraps a slot id allocated by an [`crate::UpscalerDevice`].
    pub fn new(id: FeatureId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> FeatureId {
        self.0
    }
}

/// Parameters a native feature is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureCreateParams {
    pub input_resolution: UVec2,
    pub output_resolution: UVec2,
    pub perf_quality: DlssPerfQualityMode,
    pub flags: DlssFeatureFlags,
}

/// Per-invocation parameters of an upscale command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluateParams {
    pub sharpness: f32,
    /// Scale applied to motion vectors to bring them into pixel units.
    pub motion_vector_scale: Vec2,
    pub subrect_offset: UVec2,
    pub subrect_size: UVec2,
    pub jitter_offset: Vec2,
    pub pre_exposure: f32,
    pub invert_x_axis: bool,
    pub invert_y_axis: bool,
    /// Discard temporal history.
    pub reset: bool,
}

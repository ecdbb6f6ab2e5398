//! # dlss_pass
//!
//! Per-camera lifecycle management for NVIDIA DLSS (Deep Learning Super Sampling) features.
//!
//! A [`DlssPass`] owns one upscaler feature per camera view. Features are
//! created lazily, recreated when resolution or quality changes, and
//! released when their camera is destroyed, stops upscaling, or has not
//! rendered for [`DlssConfig::expiration_frames`] frames. Stereo cameras
//! rendering both eyes into one array texture are split into per-eye
//! upscales and recomposed.
//!
//! All GPU work is recorded into a [`CommandList`] which the caller replays,
//! e.g. with [`WgpuTexturePool::encode`]. Upscaling is best-effort: when DLSS
//! is unavailable or a feature cannot be created, nothing is recorded and the
//! frame renders without it.
//!
//! ## API Usage
//! ```rust,ignore
//! use dlss_pass::{CameraId, CameraKey, DeviceContext, DlssConfig, DlssPass, RenderParameters};
//!
//! // Once per application
//! let mut context = DeviceContext::new(project_id, native_backend);
//! let Some(mut dlss) = DlssPass::create(&mut context, DlssConfig::default()) else {
//!     // Render without DLSS
//! };
//!
//! // Every frame, for every camera
//! let key = CameraKey::new(CameraId(camera.id), &camera);
//! dlss.begin_frame(&key, camera.dlss_enabled);
//!
//! // While building the render graph
//! let layout = ViewLayout::from_xr(&camera.xr);
//! let handles = dlss_pass::create_camera_resources(&layout, view_handles, &mut pool)?;
//!
//! // While executing it
//! pool.realize();
//! let resources = handles.resolve(&pool)?;
//! let mut commands = CommandList::new();
//! dlss.render(&render_parameters, &resources, &mut commands);
//! pool.encode(&commands, &mut encoder, |command, encoder| native.encode(command, encoder));
//! ```

mod camera;
mod camera_state;
mod command;
mod config;
mod debug_view;
mod device;
mod error;
mod feature;
mod jitter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod pass;
mod resources;
mod view_state;
mod wgpu_resources;

pub use camera::{CameraId, CameraKey, Liveness};
pub use camera_state::{CameraState, ViewLayout, XrSetup};
pub use command::{
    Command, CommandList, FeatureTextures, TextureDesc, TextureId, TextureRef, TextureSlice,
};
pub use config::{DEFAULT_EXPIRATION_FRAMES, DlssConfig};
pub use debug_view::{DebugView, DeviceState, FeatureDebugInfo};
pub use device::{
    DLSS_BACKEND_VERSION, DeviceContext, NVIDIA_VENDOR_ID, UnavailableBackend, UpscalerBackend,
    UpscalerDevice,
};
pub use error::DlssError;
pub use feature::{
    DlssFeatureFlags, DlssPerfQualityMode, EvaluateParams, FeatureCreateParams, FeatureHandle,
    FeatureId,
};
pub use jitter::{suggested_jitter, suggested_mip_bias};
pub use pass::{CameraFeatureInfo, DlssPass, RenderParameters};
pub use resources::{
    CameraResourceHandles, CameraResources, RenderGraph, ResourceResolver, TextureHandle,
    ViewResourceHandles, ViewResources, ViewTextures, create_camera_resources,
};
pub use view_state::{ViewConfiguration, ViewState};
pub use wgpu_resources::WgpuTexturePool;

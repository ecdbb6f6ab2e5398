//! Recording implementations of the backend, device and render graph traits,
//! for testing without a GPU.

use crate::{
    DlssError,
    command::{Command, CommandList, TextureDesc, TextureId, TextureRef},
    debug_view::FeatureDebugInfo,
    device::{DLSS_BACKEND_VERSION, NVIDIA_VENDOR_ID, UpscalerBackend, UpscalerDevice},
    feature::{FeatureCreateParams, FeatureHandle, FeatureId},
    resources::{
        CameraResources, RenderGraph, ResourceResolver, TextureHandle, ViewResources,
        ViewTextures,
    },
};
use glam::UVec2;
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use uuid::Uuid;
use wgpu::TextureFormat;

/// API version reported by [`MockDevice`].
pub const MOCK_API_VERSION: u32 = 0x15;

/// Backend whose probe results are set by its fields.
pub struct MockBackend {
    pub loaded: bool,
    pub version: u32,
    pub vendor_id: u32,
    pub fail_open: bool,
    pub super_sampling_available: bool,
    pub(crate) device: Arc<MockDevice>,
    pub(crate) opened: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            loaded: true,
            version: DLSS_BACKEND_VERSION,
            vendor_id: NVIDIA_VENDOR_ID,
            fail_open: false,
            super_sampling_available: true,
            device: Arc::new(MockDevice::new()),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockBackend {
    /// The device handed out by [`UpscalerBackend::open_device`].
    pub fn device(&self) -> Arc<MockDevice> {
        Arc::clone(&self.device)
    }

    /// Counter of successful [`UpscalerBackend::open_device`] calls.
    pub fn opened_devices(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opened)
    }
}

impl UpscalerBackend for MockBackend {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn adapter_vendor_id(&self) -> u32 {
        self.vendor_id
    }

    fn open_device(&self, _project_id: Uuid) -> Result<Arc<dyn UpscalerDevice>, DlssError> {
        if self.fail_open {
            return Err(DlssError::DeviceCreationFailed("mock device".into()));
        }
        self.device
            .available
            .store(self.super_sampling_available, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        let device: Arc<dyn UpscalerDevice> = self.device.clone();
        Ok(device)
    }
}

#[derive(Default)]
struct MockDeviceState {
    next_feature: u32,
    live: BTreeMap<FeatureId, FeatureCreateParams>,
    fail_creation: bool,
    created: usize,
    destroyed: usize,
    submitted: Vec<CommandList>,
}

/// Device that allocates feature ids and remembers what was done with them.
pub struct MockDevice {
    available: AtomicBool,
    state: Mutex<MockDeviceState>,
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            state: Mutex::new(MockDeviceState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockDeviceState> {
        self.state.lock().expect("mock device lock poisoned")
    }

    /// Make subsequent feature creations fail.
    pub fn set_fail_creation(&self, fail: bool) {
        self.state().fail_creation = fail;
    }

    /// Features created and not yet destroyed.
    pub fn live_features(&self) -> Vec<FeatureId> {
        self.state().live.keys().copied().collect()
    }

    pub fn created_count(&self) -> usize {
        self.state().created
    }

    pub fn destroyed_count(&self) -> usize {
        self.state().destroyed
    }

    /// Command lists passed to [`UpscalerDevice::submit`].
    pub fn submitted(&self) -> Vec<CommandList> {
        self.state().submitted.clone()
    }
}

impl UpscalerDevice for MockDevice {
    fn is_super_sampling_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn api_version(&self) -> u32 {
        MOCK_API_VERSION
    }

    fn create_feature(
        &self,
        commands: &mut CommandList,
        params: &FeatureCreateParams,
    ) -> Result<FeatureHandle, DlssError> {
        let mut state = self.state();
        if state.fail_creation {
            return Err(DlssError::FeatureCreationFailed("mock failure".into()));
        }

        let feature = FeatureId(state.next_feature);
        state.next_feature += 1;
        state.created += 1;
        state.live.insert(feature, *params);
        commands.push(Command::CreateFeature {
            feature,
            params: *params,
        });
        Ok(FeatureHandle::new(feature))
    }

    fn destroy_feature(&self, commands: &mut CommandList, feature: FeatureHandle) {
        let mut state = self.state();
        state.live.remove(&feature.id());
        state.destroyed += 1;
        commands.push(Command::DestroyFeature {
            feature: feature.id(),
        });
    }

    fn submit(&self, commands: CommandList) {
        self.state().submitted.push(commands);
    }

    fn feature_debug_infos(&self) -> Vec<FeatureDebugInfo> {
        self.state()
            .live
            .iter()
            .map(|(&feature, params)| FeatureDebugInfo {
                feature,
                valid: true,
                input_resolution: params.input_resolution,
                output_resolution: params.output_resolution,
                perf_quality: params.perf_quality,
            })
            .collect()
    }
}

/// Render graph that realizes texture `n` as [`TextureId`] `n + 1000`.
#[derive(Debug, Default)]
pub struct MockRenderGraph {
    textures: Vec<(&'static str, TextureDesc)>,
}

impl MockRenderGraph {
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn label(&self, texture: TextureHandle) -> Option<&'static str> {
        self.textures
            .get(texture.0 as usize)
            .map(|(label, _)| *label)
    }
}

impl RenderGraph for MockRenderGraph {
    fn create_texture(&mut self, label: &'static str, desc: TextureDesc) -> TextureHandle {
        self.textures.push((label, desc));
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn texture_desc(&self, texture: TextureHandle) -> Option<TextureDesc> {
        self.textures.get(texture.0 as usize).map(|(_, desc)| *desc)
    }
}

impl ResourceResolver for MockRenderGraph {
    fn resolve(&self, texture: TextureHandle) -> Option<TextureRef> {
        Some(TextureRef {
            id: TextureId(u64::from(texture.0) + 1000),
            desc: self.texture_desc(texture)?,
        })
    }
}

/// Single-layer HDR color texture of the given size.
pub fn test_desc(size: UVec2) -> TextureDesc {
    TextureDesc {
        size,
        layers: 1,
        format: TextureFormat::Rgba16Float,
    }
}

/// 1080p to 2160p textures with `layers` layers, ids starting at `base`.
fn view_textures(base: u64, layers: u32) -> ViewTextures {
    let input = TextureDesc {
        layers,
        ..test_desc(UVec2::new(1920, 1080))
    };
    let output = TextureDesc {
        size: UVec2::new(3840, 2160),
        ..input
    };
    ViewResources {
        source: TextureRef {
            id: TextureId(base),
            desc: input,
        },
        output: TextureRef {
            id: TextureId(base + 1),
            desc: output,
        },
        depth: TextureRef {
            id: TextureId(base + 2),
            desc: TextureDesc {
                format: TextureFormat::Depth32Float,
                ..input
            },
        },
        motion_vectors: TextureRef {
            id: TextureId(base + 3),
            desc: TextureDesc {
                format: TextureFormat::Rg16Float,
                ..input
            },
        },
    }
}

/// Single-layer textures for view `index`.
pub fn test_view_textures(index: u64) -> ViewTextures {
    view_textures(100 + index * 10, 1)
}

/// Shared textures with `layers` layers plus `tmp_views` per-view temporaries.
pub fn test_camera_resources(layers: u32, tmp_views: u64) -> CameraResources {
    CameraResources {
        resources: view_textures(0, layers),
        tmp_views: (0..tmp_views).map(test_view_textures).collect(),
    }
}

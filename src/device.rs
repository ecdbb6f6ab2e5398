use crate::{
    DlssError,
    command::{Command, CommandList, FeatureTextures},
    debug_view::{DebugView, DeviceState, FeatureDebugInfo},
    feature::{EvaluateParams, FeatureCreateParams, FeatureHandle},
};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Backend version this integration is built against.
pub const DLSS_BACKEND_VERSION: u32 = 0x0001_0004;

/// PCI vendor id of the only GPU vendor supporting DLSS.
pub const NVIDIA_VENDOR_ID: u32 = 0x10DE;

/// Entry point of a native upscaler backend.
pub trait UpscalerBackend: Send + Sync {
    /// Whether the native library is loaded.
    fn is_loaded(&self) -> bool;

    /// Version reported by the loaded library.
    fn version(&self) -> u32;

    /// PCI vendor id of the GPU the backend runs on.
    fn adapter_vendor_id(&self) -> u32;

    /// Opens a device. The returned device is shared by every pass created from the same context.
    fn open_device(&self, project_id: Uuid) -> Result<Arc<dyn UpscalerDevice>, DlssError>;
}

/// An opened upscaler device.
///
/// Feature creation allocates the handle immediately and records the native
/// creation into `commands`; the command list is executed later by the caller.
pub trait UpscalerDevice: Send + Sync {
    fn is_super_sampling_available(&self) -> bool;

    /// Version of the upscaler API the device was opened with.
    fn api_version(&self) -> u32;

    fn create_feature(
        &self,
        commands: &mut CommandList,
        params: &FeatureCreateParams,
    ) -> Result<FeatureHandle, DlssError>;

    fn destroy_feature(&self, commands: &mut CommandList, feature: FeatureHandle) {
        commands.push(Command::DestroyFeature {
            feature: feature.id(),
        });
    }

    fn evaluate(
        &self,
        commands: &mut CommandList,
        feature: &FeatureHandle,
        params: &EvaluateParams,
        textures: &FeatureTextures,
    ) {
        commands.push(Command::Evaluate {
            feature: feature.id(),
            params: *params,
            textures: *textures,
        });
    }

    /// Executes `commands` right away, without waiting for the frame's command buffers.
    fn submit(&self, commands: CommandList);

    /// Features currently alive on the device.
    fn feature_debug_infos(&self) -> Vec<FeatureDebugInfo> {
        Vec::new()
    }
}

/// Backend used when no native upscaler is present. Every probe fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableBackend;

impl UpscalerBackend for UnavailableBackend {
    fn is_loaded(&self) -> bool {
        false
    }

    fn version(&self) -> u32 {
        0
    }

    fn adapter_vendor_id(&self) -> u32 {
        0
    }

    fn open_device(&self, _project_id: Uuid) -> Result<Arc<dyn UpscalerDevice>, DlssError> {
        Err(DlssError::BackendNotLoaded)
    }
}

/// Owns the backend, the opened device and its debug view.
///
/// Passed explicitly to [`crate::DlssPass::create`]; independent contexts do not share state.
pub struct DeviceContext {
    project_id: Uuid,
    backend: Box<dyn UpscalerBackend>,
    device: Option<Arc<dyn UpscalerDevice>>,
    debug_view: DebugView,
}

impl DeviceContext {
    pub fn new(project_id: Uuid, backend: impl UpscalerBackend + 'static) -> Self {
        Self {
            project_id,
            backend: Box::new(backend),
            device: None,
            debug_view: DebugView::default(),
        }
    }

    /// A context whose probe always fails.
    pub fn unavailable(project_id: Uuid) -> Self {
        Self::new(project_id, UnavailableBackend)
    }

    /// Checks that DLSS can be used, opening the device if needed.
    ///
    /// Never panics; any failed check is returned as the reason DLSS is unavailable.
    pub fn probe(&mut self) -> Result<Arc<dyn UpscalerDevice>, DlssError> {
        let result = self.probe_inner();
        if let Err(err) = &result {
            info!("DLSS unavailable: {err}");
            self.device = None;
        }
        result
    }

    /// Like [`Self::probe`], discarding the reason.
    pub fn is_available(&mut self) -> bool {
        self.probe().is_ok()
    }

    fn probe_inner(&mut self) -> Result<Arc<dyn UpscalerDevice>, DlssError> {
        if !self.backend.is_loaded() {
            return Err(DlssError::BackendNotLoaded);
        }

        let found = self.backend.version();
        if found != DLSS_BACKEND_VERSION {
            warn!(
                "DLSS backend version {found:#x} does not match expected version {DLSS_BACKEND_VERSION:#x}"
            );
            return Err(DlssError::VersionMismatch {
                expected: DLSS_BACKEND_VERSION,
                found,
            });
        }

        let vendor = self.backend.adapter_vendor_id();
        if vendor != NVIDIA_VENDOR_ID {
            return Err(DlssError::UnsupportedVendor(vendor));
        }

        let device = match &self.device {
            Some(device) => Arc::clone(device),
            None => {
                let device = self.backend.open_device(self.project_id)?;
                self.debug_view.reset();
                self.device = Some(Arc::clone(&device));
                device
            }
        };

        if !device.is_super_sampling_available() {
            return Err(DlssError::FeatureUnavailable);
        }

        Ok(device)
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    /// The device opened by the last successful probe.
    pub fn device(&self) -> Option<&Arc<dyn UpscalerDevice>> {
        self.device.as_ref()
    }

    pub fn debug_view(&self) -> &DebugView {
        &self.debug_view
    }

    /// Refreshes the debug view from the device.
    pub fn update_debug_view(&mut self) {
        self.debug_view.backend_version = self
            .backend
            .is_loaded()
            .then(|| self.backend.version());
        self.debug_view.api_version = self.device.as_ref().map(|device| device.api_version());

        match &self.device {
            Some(device) => {
                self.debug_view.device_state = DeviceState::Active;
                self.debug_view.super_sampling_supported = device.is_super_sampling_available();
                self.debug_view.features = device.feature_debug_infos();
            }
            None => {
                self.debug_view.device_state = if self.backend.is_loaded() {
                    DeviceState::DeviceCreationFailed
                } else {
                    DeviceState::MissingBackend
                };
                self.debug_view.super_sampling_supported = false;
                self.debug_view.features.clear();
            }
        }
    }
}

use crate::{
    DeviceContext, DlssConfig, UpscalerDevice,
    camera::{CameraId, CameraKey},
    camera_state::{CameraState, ViewLayout, XrSetup},
    command::CommandList,
    debug_view::FeatureDebugInfo,
    feature::DlssPerfQualityMode,
    resources::CameraResources,
    view_state::ViewConfiguration,
};
use glam::{UVec2, Vec2};
use log::{debug, trace};
use std::{collections::HashMap, mem, sync::Arc};

/// Per-frame inputs of [`DlssPass::render`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParameters {
    pub camera: CameraId,
    /// Current quality setting of the pipeline.
    pub perf_quality: DlssPerfQualityMode,
    /// Sharpening strength, from 0.0 to 1.0.
    pub sharpness: f32,
    /// Resolution the camera rendered at.
    pub input_resolution: UVec2,
    /// Resolution of the final viewport.
    pub output_resolution: UVec2,
    /// Temporal anti-aliasing jitter applied to the camera projection.
    pub camera_jitter: Vec2,
    /// First frame rendered by this camera, or a camera cut.
    pub first_frame: bool,
    /// Stereo rendering setup of the camera.
    pub xr: XrSetup,
}

/// Debug row for a feature owned by a [`DlssPass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFeatureInfo {
    pub camera: CameraId,
    /// Index of the view within the camera.
    pub view: usize,
    pub info: FeatureDebugInfo,
}

/// Tracks upscaler state for every camera using DLSS.
///
/// Call [`Self::begin_frame`] once per camera per frame, then [`Self::render`]
/// when recording the camera's upscale. State of cameras that are destroyed,
/// stop upscaling, or go unused for [`DlssConfig::expiration_frames`] frames
/// is released.
pub struct DlssPass {
    device: Arc<dyn UpscalerDevice>,
    config: DlssConfig,
    cameras: HashMap<CameraKey, CameraState>,
    /// Cameras that stopped upscaling, released by the next sweep.
    pending_removal: Vec<CameraId>,
    invalid_cameras: Vec<CameraId>,
    frame: u64,
}

impl DlssPass {
    /// Whether DLSS can be used with `context`. Does not create a pass.
    pub fn probe_availability(context: &mut DeviceContext) -> bool {
        context.is_available()
    }

    /// Creates a pass bound to the device of `context`, or `None` if DLSS is unavailable.
    pub fn create(context: &mut DeviceContext, config: DlssConfig) -> Option<Self> {
        let device = context.probe().ok()?;
        Some(Self::new(device, config))
    }

    pub fn new(device: Arc<dyn UpscalerDevice>, config: DlssConfig) -> Self {
        Self {
            device,
            config,
            cameras: HashMap::new(),
            pending_removal: Vec::new(),
            invalid_cameras: Vec::new(),
            frame: 0,
        }
    }

    /// Registers `camera` for this frame and releases state that is no longer needed.
    pub fn begin_frame(&mut self, camera: &CameraKey, upscaling_enabled: bool) {
        let id = camera.id();
        let flagged = mem::take(&mut self.pending_removal);

        // A destroyed camera's id may be reused by a new camera.
        let reused =
            camera.is_alive() && self.cameras.get(&id).is_some_and(|state| !state.is_alive());
        if reused {
            debug!("Camera id {id:?} reused, releasing stale DLSS state");
            self.invalid_cameras.push(id);
            self.cleanup_invalid_cameras();
        }

        if let Some(state) = self.cameras.get_mut(&id) {
            if upscaling_enabled {
                state.last_active_frame = self.frame;
            } else {
                self.pending_removal.push(id);
            }
        } else if upscaling_enabled {
            debug!("Creating DLSS state for camera {id:?}");
            self.cameras.insert(
                camera.clone(),
                CameraState::new(camera.liveness().clone(), self.frame),
            );
        }

        self.invalid_cameras.clear();
        self.invalid_cameras.extend(
            flagged
                .into_iter()
                .filter(|&flagged_id| !(upscaling_enabled && flagged_id == id)),
        );
        let (frame, expiration) = (self.frame, self.config.expiration_frames);
        self.invalid_cameras.extend(
            self.cameras
                .iter()
                .filter(|(_, state)| {
                    !state.is_alive() || has_expired(state, frame, expiration)
                })
                .map(|(key, _)| key.id()),
        );
        self.cleanup_invalid_cameras();
        self.pending_removal
            .retain(|pending| self.cameras.contains_key(pending));

        self.frame += 1;
    }

    fn cleanup_invalid_cameras(&mut self) {
        if self.invalid_cameras.is_empty() {
            return;
        }

        let mut commands = CommandList::new();
        for id in self.invalid_cameras.drain(..) {
            let Some(mut state) = self.cameras.remove(&id) else {
                continue;
            };
            debug!("Releasing DLSS state for camera {id:?}");
            state.cleanup(&*self.device, &mut commands);
        }
        if !commands.is_empty() {
            self.device.submit(commands);
        }
    }

    /// Records the upscale of the camera in `parameters`.
    ///
    /// Does nothing for cameras that were not registered by [`Self::begin_frame`].
    pub fn render(
        &mut self,
        parameters: &RenderParameters,
        resources: &CameraResources,
        commands: &mut CommandList,
    ) {
        let Some(state) = self.cameras.get_mut(&parameters.camera) else {
            return;
        };

        let config = ViewConfiguration {
            perf_quality: parameters.perf_quality,
            input_resolution: parameters.input_resolution,
            output_resolution: parameters.output_resolution,
            sharpness: parameters.sharpness,
            jitter_offset: -parameters.camera_jitter,
            reset: parameters.first_frame,
        };
        let layout = ViewLayout::from_xr(&parameters.xr);
        trace!(
            "DLSS render camera {:?}: {:?}, {:?}",
            parameters.camera, config, layout
        );

        state.submit(
            &*self.device,
            &self.config,
            &layout,
            &config,
            resources,
            commands,
        );
    }

    /// Number of `begin_frame` calls so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &DlssConfig {
        &self.config
    }

    /// The device every feature of this pass lives on.
    pub fn device(&self) -> &Arc<dyn UpscalerDevice> {
        &self.device
    }

    /// Number of cameras with upscaler state.
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn camera_state(&self, camera: CameraId) -> Option<&CameraState> {
        self.cameras.get(&camera)
    }

    /// Whether `camera` stopped upscaling and will be released by the next sweep.
    pub fn is_pending_removal(&self, camera: CameraId) -> bool {
        self.pending_removal.contains(&camera)
    }

    /// One row per live feature, sorted by camera and view.
    pub fn feature_debug_infos(&self) -> Vec<CameraFeatureInfo> {
        let mut infos: Vec<_> = self
            .cameras
            .iter()
            .flat_map(|(key, state)| {
                state
                    .views()
                    .iter()
                    .enumerate()
                    .filter_map(move |(view, view_state)| {
                        Some(CameraFeatureInfo {
                            camera: key.id(),
                            view,
                            info: view_state.debug_info()?,
                        })
                    })
            })
            .collect();
        infos.sort_by_key(|info| (info.camera, info.view));
        infos
    }
}

fn has_expired(state: &CameraState, frame: u64, expiration_frames: u64) -> bool {
    frame.saturating_sub(state.last_active_frame) >= expiration_frames
}

impl Drop for DlssPass {
    fn drop(&mut self) {
        let mut commands = CommandList::new();
        for state in self.cameras.values_mut() {
            state.cleanup(&*self.device, &mut commands);
        }
        if !commands.is_empty() {
            self.device.submit(commands);
        }
    }
}

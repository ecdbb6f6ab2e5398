use crate::{
    DlssConfig, UpscalerDevice,
    camera::Liveness,
    command::{CommandList, TextureDesc},
    resources::CameraResources,
    view_state::{ViewConfiguration, ViewState},
};
use log::warn;

/// Stereo/XR configuration of a camera for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct XrSetup {
    pub enabled: bool,
    /// Views are rendered into slices of one array texture in a single pass.
    pub single_pass: bool,
    pub view_count: u32,
    /// View rendered by the current pass, in multi-pass mode.
    pub pass_index: u32,
}

impl XrSetup {
    pub fn single_pass(view_count: u32) -> Self {
        Self {
            enabled: true,
            single_pass: true,
            view_count,
            pass_index: 0,
        }
    }

    pub fn multi_pass(view_count: u32, pass_index: u32) -> Self {
        Self {
            enabled: true,
            single_pass: false,
            view_count,
            pass_index,
        }
    }
}

/// How many views a camera has, and which of them the current pass renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewLayout {
    pub view_count: usize,
    pub active_view: usize,
    pub single_pass: bool,
}

impl ViewLayout {
    pub fn from_xr(xr: &XrSetup) -> Self {
        if !xr.enabled {
            return Self {
                view_count: 1,
                active_view: 0,
                single_pass: false,
            };
        }

        let view_count = xr.view_count.max(1) as usize;
        if xr.single_pass {
            Self {
                view_count,
                active_view: 0,
                single_pass: true,
            }
        } else {
            Self {
                view_count,
                active_view: xr.pass_index as usize,
                single_pass: false,
            }
        }
    }

    /// The upscaler only works on 2D textures, so array slices must be copied out per view.
    pub fn requires_view_copies(&self, source: &TextureDesc) -> bool {
        self.single_pass && self.view_count > 1 && source.is_array()
    }
}

/// Upscaler state of one camera: one [`ViewState`] per view.
#[derive(Debug)]
pub struct CameraState {
    liveness: Liveness,
    views: Vec<ViewState>,
    pub(crate) last_active_frame: u64,
}

impl CameraState {
    pub fn new(liveness: Liveness, frame: u64) -> Self {
        Self {
            liveness,
            views: Vec::new(),
            last_active_frame: frame,
        }
    }

    /// Whether the camera this state belongs to still exists.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    pub fn last_active_frame(&self) -> u64 {
        self.last_active_frame
    }

    pub fn views(&self) -> &[ViewState] {
        &self.views
    }

    /// Records the upscale of the views rendered this pass.
    ///
    /// When views live in slices of array textures, every slice is first
    /// copied into per-view temporaries, all views are upscaled, and the
    /// results are copied back. Copies are recorded before any upscale so
    /// the GPU can overlap them.
    pub fn submit(
        &mut self,
        device: &dyn UpscalerDevice,
        settings: &DlssConfig,
        layout: &ViewLayout,
        config: &ViewConfiguration,
        resources: &CameraResources,
        commands: &mut CommandList,
    ) {
        if self.views.len() != layout.view_count {
            self.cleanup(device, commands);
            self.views = (0..layout.view_count).map(|_| ViewState::new()).collect();
        }

        if !layout.requires_view_copies(&resources.resources.source.desc) {
            let Some(view) = self.views.get_mut(layout.active_view) else {
                warn!(
                    "DLSS view {} is out of range for {} views",
                    layout.active_view, layout.view_count
                );
                return;
            };
            view.update(device, settings, config, commands);
            view.submit(device, settings, &resources.resources, commands);
            return;
        }

        if resources.tmp_views.len() < self.views.len() {
            warn!(
                "DLSS needs {} temporary views but only {} were allocated",
                self.views.len(),
                resources.tmp_views.len()
            );
            return;
        }

        let shared = &resources.resources;
        let tmp_views = &resources.tmp_views[..self.views.len()];

        for (layer, tmp) in (0u32..).zip(tmp_views) {
            commands.copy_texture(
                shared.source.slice(layer),
                tmp.source.slice(0),
                tmp.source.desc.size,
            );
            commands.copy_texture(
                shared.depth.slice(layer),
                tmp.depth.slice(0),
                tmp.depth.desc.size,
            );
            commands.copy_texture(
                shared.motion_vectors.slice(layer),
                tmp.motion_vectors.slice(0),
                tmp.motion_vectors.desc.size,
            );
        }

        for (view, tmp) in self.views.iter_mut().zip(tmp_views) {
            view.update(device, settings, config, commands);
            view.submit(device, settings, tmp, commands);
        }

        // Views without a feature keep their original output.
        for ((layer, tmp), view) in (0u32..).zip(tmp_views).zip(&self.views) {
            if view.has_feature() {
                commands.copy_texture(
                    tmp.output.slice(0),
                    shared.output.slice(layer),
                    tmp.output.desc.size,
                );
            }
        }
    }

    /// Destroys every view's feature and drops the views.
    pub fn cleanup(&mut self, device: &dyn UpscalerDevice, commands: &mut CommandList) {
        for view in &mut self.views {
            view.cleanup(device, commands);
        }
        self.views.clear();
    }
}

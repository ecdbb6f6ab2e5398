use crate::{
    DlssConfig, UpscalerDevice,
    command::{CommandList, FeatureTextures},
    debug_view::FeatureDebugInfo,
    feature::{
        DlssPerfQualityMode, EvaluateParams, FeatureCreateParams, FeatureHandle, FeatureId,
    },
    resources::ViewTextures,
};
use glam::{UVec2, Vec2};
use log::{debug, warn};

/// Per-frame settings of one upscaled view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfiguration {
    pub perf_quality: DlssPerfQualityMode,
    /// Resolution of the color, depth and motion vector inputs.
    pub input_resolution: UVec2,
    /// Resolution of the upscaled output.
    pub output_resolution: UVec2,
    /// Sharpening strength, from 0.0 to 1.0.
    pub sharpness: f32,
    /// Subpixel jitter to undo, in input pixels.
    pub jitter_offset: Vec2,
    /// Discard temporal history this frame, e.g. after a camera cut.
    pub reset: bool,
}

impl ViewConfiguration {
    /// Whether a feature created for `self` can be reused for `other`.
    fn same_feature(&self, other: &Self) -> bool {
        self.input_resolution == other.input_resolution
            && self.output_resolution == other.output_resolution
            && self.perf_quality == other.perf_quality
    }
}

/// One upscaler feature bound to one view of one camera.
///
/// The feature is recreated whenever resolution or quality changes.
#[derive(Debug, Default)]
pub struct ViewState {
    feature: Option<FeatureHandle>,
    config: Option<ViewConfiguration>,
    reset: bool,
    /// Parameters of the last failed creation, reported once.
    failed_creation: Option<FeatureCreateParams>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `config`, recreating the native feature if needed.
    ///
    /// A failed creation leaves the view without a feature; the next update retries.
    pub fn update(
        &mut self,
        device: &dyn UpscalerDevice,
        settings: &DlssConfig,
        config: &ViewConfiguration,
        commands: &mut CommandList,
    ) {
        let reusable = self.feature.is_some()
            && self
                .config
                .is_some_and(|current| current.same_feature(config));

        let mut is_new = false;
        if !reusable {
            is_new = true;
            if let Some(feature) = self.feature.take() {
                device.destroy_feature(commands, feature);
            }

            let params = FeatureCreateParams {
                input_resolution: config.input_resolution,
                output_resolution: config.output_resolution,
                perf_quality: config.perf_quality,
                flags: settings.feature_flags,
            };
            match device.create_feature(commands, &params) {
                Ok(feature) => {
                    debug!(
                        "Created DLSS feature {:?}: {} -> {} ({:?})",
                        feature.id(),
                        config.input_resolution,
                        config.output_resolution,
                        config.perf_quality,
                    );
                    self.feature = Some(feature);
                    self.failed_creation = None;
                }
                Err(err) if self.failed_creation == Some(params) => {
                    debug!("Retried DLSS feature creation: {err}");
                }
                Err(err) => {
                    warn!("{err}");
                    self.failed_creation = Some(params);
                }
            }
        }

        self.config = Some(*config);
        self.reset = is_new || config.reset;
    }

    /// Records the upscale command. Does nothing if no feature exists.
    pub fn submit(
        &self,
        device: &dyn UpscalerDevice,
        settings: &DlssConfig,
        textures: &ViewTextures,
        commands: &mut CommandList,
    ) {
        let (Some(feature), Some(config)) = (&self.feature, &self.config) else {
            return;
        };

        // Motion vectors are in negated UV units; the subrect always covers the whole input.
        let params = EvaluateParams {
            sharpness: config.sharpness,
            motion_vector_scale: -config.input_resolution.as_vec2(),
            subrect_offset: UVec2::ZERO,
            subrect_size: config.input_resolution,
            jitter_offset: config.jitter_offset,
            pre_exposure: settings.pre_exposure,
            invert_x_axis: settings.invert_x_axis,
            invert_y_axis: settings.invert_y_axis,
            reset: self.reset,
        };
        let textures = FeatureTextures {
            color_input: textures.source.id,
            color_output: textures.output.id,
            depth: textures.depth.id,
            motion_vectors: textures.motion_vectors.id,
        };

        device.evaluate(commands, feature, &params, &textures);
    }

    /// Destroys the feature, if any.
    pub fn cleanup(&mut self, device: &dyn UpscalerDevice, commands: &mut CommandList) {
        if let Some(feature) = self.feature.take() {
            device.destroy_feature(commands, feature);
        }
    }

    /// Id of the current feature, if creation succeeded.
    pub fn feature_id(&self) -> Option<FeatureId> {
        self.feature.as_ref().map(FeatureHandle::id)
    }

    /// Whether the view owns a feature.
    pub fn has_feature(&self) -> bool {
        self.feature.is_some()
    }

    /// The configuration applied by the last [`Self::update`].
    pub fn configuration(&self) -> Option<&ViewConfiguration> {
        self.config.as_ref()
    }

    /// Whether the next upscale discards temporal history.
    pub fn reset(&self) -> bool {
        self.reset
    }

    /// Debug table row for the current feature.
    pub fn debug_info(&self) -> Option<FeatureDebugInfo> {
        let feature = self.feature.as_ref()?;
        let config = self.config.as_ref()?;
        Some(FeatureDebugInfo {
            feature: feature.id(),
            valid: true,
            input_resolution: config.input_resolution,
            output_resolution: config.output_resolution,
            perf_quality: config.perf_quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::Command,
        mock::{MockDevice, test_view_textures},
    };

    fn config(input: UVec2, output: UVec2) -> ViewConfiguration {
        ViewConfiguration {
            perf_quality: DlssPerfQualityMode::Balanced,
            input_resolution: input,
            output_resolution: output,
            sharpness: 0.5,
            jitter_offset: Vec2::new(0.25, -0.25),
            reset: false,
        }
    }

    fn count(commands: &CommandList, f: impl Fn(&Command) -> bool) -> usize {
        commands.iter().filter(|command| f(command)).count()
    }

    #[test]
    fn first_update_creates_feature_with_reset() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();

        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));
        view.update(&device, &settings, &cfg, &mut commands);

        assert!(view.has_feature());
        assert!(view.reset());
        assert_eq!(
            commands.commands(),
            &[Command::CreateFeature {
                feature: view.feature_id().unwrap(),
                params: FeatureCreateParams {
                    input_resolution: cfg.input_resolution,
                    output_resolution: cfg.output_resolution,
                    perf_quality: DlssPerfQualityMode::Balanced,
                    flags: settings.feature_flags,
                },
            }]
        );
    }

    #[test]
    fn update_is_idempotent() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();

        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));
        view.update(&device, &settings, &cfg, &mut commands);
        let feature = view.feature_id();
        commands.clear();

        view.update(&device, &settings, &cfg, &mut commands);
        assert!(commands.is_empty());
        assert_eq!(view.feature_id(), feature);
        assert!(!view.reset());

        view.update(
            &device,
            &settings,
            &ViewConfiguration { reset: true, ..cfg },
            &mut commands,
        );
        assert!(commands.is_empty());
        assert!(view.reset());
    }

    #[test]
    fn output_resolution_change_recreates_once() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();

        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));
        view.update(&device, &settings, &cfg, &mut commands);
        view.update(&device, &settings, &cfg, &mut commands);
        let old = view.feature_id().unwrap();
        commands.clear();

        let resized = ViewConfiguration {
            output_resolution: UVec2::new(2560, 1440),
            ..cfg
        };
        view.update(&device, &settings, &resized, &mut commands);

        assert_eq!(
            count(&commands, |c| matches!(c, Command::DestroyFeature { feature } if *feature == old)),
            1
        );
        assert_eq!(
            count(&commands, |c| matches!(c, Command::CreateFeature { .. })),
            1
        );
        assert!(view.reset());

        commands.clear();
        view.submit(&device, &settings, &test_view_textures(0), &mut commands);
        assert!(matches!(
            commands.commands(),
            [Command::Evaluate { params, .. }] if params.reset
        ));
    }

    #[test]
    fn quality_change_recreates() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();

        let cfg = config(UVec2::new(1280, 720), UVec2::new(1920, 1080));
        view.update(&device, &settings, &cfg, &mut commands);
        view.update(
            &device,
            &settings,
            &ViewConfiguration {
                perf_quality: DlssPerfQualityMode::MaxQuality,
                ..cfg
            },
            &mut commands,
        );
        assert_eq!(device.created_count(), 2);
        assert_eq!(device.destroyed_count(), 1);
    }

    #[test]
    fn submit_parameters() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();
        let textures = test_view_textures(0);

        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));
        view.update(&device, &settings, &cfg, &mut commands);
        commands.clear();
        view.submit(&device, &settings, &textures, &mut commands);

        let [
            Command::Evaluate {
                feature,
                params,
                textures: bound,
            },
        ] = commands.commands()
        else {
            panic!("expected a single evaluate command, got {commands:?}");
        };
        assert_eq!(Some(*feature), view.feature_id());
        assert_eq!(params.motion_vector_scale, Vec2::new(-1920.0, -1080.0));
        assert_eq!(params.subrect_offset, UVec2::ZERO);
        assert_eq!(params.subrect_size, UVec2::new(1920, 1080));
        assert_eq!(params.jitter_offset, Vec2::new(0.25, -0.25));
        assert_eq!(params.sharpness, 0.5);
        assert_eq!(params.pre_exposure, 1.0);
        assert!(params.invert_y_axis);
        assert!(!params.invert_x_axis);
        assert!(params.reset);
        assert_eq!(bound.color_input, textures.source.id);
        assert_eq!(bound.color_output, textures.output.id);
        assert_eq!(bound.depth, textures.depth.id);
        assert_eq!(bound.motion_vectors, textures.motion_vectors.id);
    }

    #[test]
    fn creation_failure_skips_submit_and_retries() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();
        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));

        device.set_fail_creation(true);
        view.update(&device, &settings, &cfg, &mut commands);
        assert!(!view.has_feature());
        view.submit(&device, &settings, &test_view_textures(0), &mut commands);
        assert!(commands.is_empty());

        device.set_fail_creation(false);
        view.update(&device, &settings, &cfg, &mut commands);
        assert!(view.has_feature());
        assert!(view.reset());
    }

    #[test]
    fn repeated_creation_failure_is_reported_once() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();
        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));

        device.set_fail_creation(true);
        view.update(&device, &settings, &cfg, &mut commands);
        let failed = view.failed_creation;
        assert!(failed.is_some());

        view.update(&device, &settings, &cfg, &mut commands);
        assert_eq!(view.failed_creation, failed);

        let resized = ViewConfiguration {
            output_resolution: UVec2::new(2560, 1440),
            ..cfg
        };
        view.update(&device, &settings, &resized, &mut commands);
        assert_ne!(view.failed_creation, failed);
        assert_eq!(
            view.failed_creation.map(|params| params.output_resolution),
            Some(UVec2::new(2560, 1440))
        );

        device.set_fail_creation(false);
        view.update(&device, &settings, &resized, &mut commands);
        assert!(view.has_feature());
        assert_eq!(view.failed_creation, None);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let device = MockDevice::new();
        let settings = DlssConfig::default();
        let mut commands = CommandList::new();
        let mut view = ViewState::new();

        view.cleanup(&device, &mut commands);
        assert!(commands.is_empty());

        let cfg = config(UVec2::new(1920, 1080), UVec2::new(3840, 2160));
        view.update(&device, &settings, &cfg, &mut commands);
        commands.clear();

        view.cleanup(&device, &mut commands);
        view.cleanup(&device, &mut commands);
        assert_eq!(commands.len(), 1);
        assert!(!view.has_feature());
        assert!(device.live_features().is_empty());
    }
}

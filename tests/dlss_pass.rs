use dlss_pass::{
    CameraId, CameraKey, Command, CommandList, DeviceContext, DlssConfig, DlssPass,
    DlssPerfQualityMode, RenderGraph, RenderParameters, ViewLayout, ViewResources, XrSetup,
    create_camera_resources,
    mock::{MockBackend, MockRenderGraph, test_desc},
};
use glam::{UVec2, Vec2};
use std::sync::Arc;
use uuid::Uuid;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parameters(camera: CameraId, xr: XrSetup) -> RenderParameters {
    RenderParameters {
        camera,
        perf_quality: DlssPerfQualityMode::MaxQuality,
        sharpness: 0.0,
        input_resolution: UVec2::new(1920, 1080),
        output_resolution: UVec2::new(3840, 2160),
        camera_jitter: Vec2::new(0.125, 0.375),
        first_frame: false,
        xr,
    }
}

fn count(commands: &CommandList, f: impl Fn(&Command) -> bool) -> usize {
    commands.iter().filter(|command| f(command)).count()
}

#[test]
fn unavailable_backend_creates_no_pass() {
    init_logger();
    let mut context = DeviceContext::unavailable(Uuid::nil());
    assert!(!DlssPass::probe_availability(&mut context));
    assert!(DlssPass::create(&mut context, DlssConfig::default()).is_none());
}

#[test]
fn camera_lifecycle() {
    init_logger();
    let backend = MockBackend::default();
    let device = backend.device();
    let mut context = DeviceContext::new(Uuid::nil(), backend);
    let mut pass = DlssPass::create(&mut context, DlssConfig::default()).unwrap();

    let camera = Arc::new("main camera");
    let key = CameraKey::new(CameraId(42), &camera);

    let mut graph = MockRenderGraph::default();
    let input = test_desc(UVec2::new(1920, 1080));
    let handles = ViewResources {
        source: graph.create_texture("color", input),
        output: graph.create_texture("upscaled", test_desc(UVec2::new(3840, 2160))),
        depth: graph.create_texture("depth", input),
        motion_vectors: graph.create_texture("motion_vectors", input),
    };
    let layout = ViewLayout::from_xr(&XrSetup::default());
    let resources = create_camera_resources(&layout, handles, &mut graph)
        .unwrap()
        .resolve(&graph)
        .unwrap();

    // Disabled: nothing is tracked.
    pass.begin_frame(&key, false);
    assert!(pass.camera_state(key.id()).is_none());

    // Enabled: state is created at the current frame.
    let frame = pass.frame();
    pass.begin_frame(&key, true);
    assert_eq!(pass.camera_state(key.id()).unwrap().last_active_frame(), frame);

    // First render creates the feature and resets history.
    let mut commands = CommandList::new();
    pass.render(&parameters(key.id(), XrSetup::default()), &resources, &mut commands);
    let Some(Command::CreateFeature { params, .. }) = commands.commands().first() else {
        panic!("expected feature creation, got {commands:?}");
    };
    assert_eq!(params.input_resolution, UVec2::new(1920, 1080));
    assert_eq!(params.output_resolution, UVec2::new(3840, 2160));
    assert!(matches!(
        commands.commands().last(),
        Some(Command::Evaluate { params, .. }) if params.reset
    ));

    // Unchanged render reuses the feature.
    commands.clear();
    pass.render(&parameters(key.id(), XrSetup::default()), &resources, &mut commands);
    assert!(matches!(
        commands.commands(),
        [Command::Evaluate { params, .. }] if !params.reset && params.jitter_offset == Vec2::new(-0.125, -0.375)
    ));
    assert_eq!(device.created_count(), 1);

    let infos = pass.feature_debug_infos();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].camera, key.id());
    assert_eq!(infos[0].info.perf_quality, DlssPerfQualityMode::MaxQuality);
    context.update_debug_view();
    assert_eq!(context.debug_view().features.len(), 1);

    // Disabling flags the camera, the next sweep releases it.
    pass.begin_frame(&key, false);
    assert!(pass.is_pending_removal(key.id()));
    assert_eq!(device.live_features().len(), 1);

    pass.begin_frame(&key, false);
    assert!(pass.camera_state(key.id()).is_none());
    assert!(device.live_features().is_empty());
    let submitted = device.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        count(&submitted[0], |c| matches!(c, Command::DestroyFeature { .. })),
        1
    );
}

#[test]
fn single_pass_stereo_fan_out() {
    init_logger();
    let backend = MockBackend::default();
    let device = backend.device();
    let mut context = DeviceContext::new(Uuid::nil(), backend);
    let mut pass = DlssPass::create(&mut context, DlssConfig::default()).unwrap();

    let camera = Arc::new(());
    let key = CameraKey::new(CameraId(1), &camera);
    let xr = XrSetup::single_pass(2);

    let mut graph = MockRenderGraph::default();
    let input = dlss_pass::TextureDesc {
        layers: 2,
        ..test_desc(UVec2::new(1920, 1080))
    };
    let handles = ViewResources {
        source: graph.create_texture("color", input),
        output: graph.create_texture(
            "upscaled",
            dlss_pass::TextureDesc {
                size: UVec2::new(3840, 2160),
                ..input
            },
        ),
        depth: graph.create_texture("depth", input),
        motion_vectors: graph.create_texture("motion_vectors", input),
    };
    let camera_handles =
        create_camera_resources(&ViewLayout::from_xr(&xr), handles, &mut graph).unwrap();
    assert_eq!(camera_handles.tmp_views.len(), 2);
    assert_eq!(graph.label(camera_handles.tmp_views[1].depth), Some("dlss_tmp_depth"));
    let resources = camera_handles.resolve(&graph).unwrap();

    pass.begin_frame(&key, true);
    let mut commands = CommandList::new();
    pass.render(&parameters(key.id(), xr), &resources, &mut commands);

    assert_eq!(device.created_count(), 2);
    let evaluates: Vec<_> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Command::Evaluate { .. }))
        .map(|(i, _)| i)
        .collect();
    let copies_out: Vec<_> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            matches!(c, Command::CopyTexture { destination, .. }
                if destination.texture == resources.resources.output.id)
        })
        .map(|(i, _)| i)
        .collect();
    let copies_in: Vec<_> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            matches!(c, Command::CopyTexture { source, .. }
                if [
                    resources.resources.source.id,
                    resources.resources.depth.id,
                    resources.resources.motion_vectors.id,
                ]
                .contains(&source.texture))
        })
        .map(|(i, _)| i)
        .collect();

    assert_eq!(evaluates.len(), 2);
    assert_eq!(copies_out.len(), 2);
    assert_eq!(copies_in.len(), 6);
    assert!(copies_in.iter().all(|i| i < &evaluates[0]));
    assert!(copies_out.iter().all(|i| i > &evaluates[1]));
}

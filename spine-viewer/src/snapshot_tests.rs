use crate::test_support::{FakeSkeleton, FakeSurface, assert_approx, fake_scene};
use crate::{
    Bounds, ClearColor, LoadGeneration, PlayState, SnapshotFormat, SnapshotOptions, SnapshotPlan,
    SurfaceSize, ViewOptions, Viewer, ViewerConfig, ViewerError, snapshot_file_name,
};

fn loaded_viewer(surface: &FakeSurface) -> Viewer<crate::test_support::FakeRig, String> {
    let mut viewer = Viewer::new(&ViewerConfig::default(), surface.size);
    let ticket = LoadGeneration::default().begin();
    let scene = fake_scene(FakeSkeleton {
        animations: vec!["idle".to_string()],
        skins: vec!["default".to_string()],
        bounds: Some([-100.0, 0.0, 200.0, 400.0]),
    });
    viewer.install(&ticket, scene).unwrap();
    viewer
}

#[test]
fn plan_scales_long_side_and_adds_padding() {
    let bounds = Bounds {
        offset: [-100.0, 0.0],
        size: [200.0, 400.0],
    };
    let options = SnapshotOptions {
        padding_px: 50,
        target_long_side: 1000,
        format: SnapshotFormat::Png,
    };
    let plan = SnapshotPlan::new(bounds, &options);

    assert_approx(plan.scale, 2.5);
    assert_eq!(plan.size, SurfaceSize::new(600, 1100));
    assert_approx(plan.camera.zoom, 0.4);
    assert_approx(plan.camera.center[0], 0.0);
    assert_approx(plan.camera.center[1], 200.0);
}

#[test]
fn plan_for_empty_content_uses_unit_scale() {
    let bounds = Bounds {
        offset: [0.0, 0.0],
        size: [0.0, 0.0],
    };
    let plan = SnapshotPlan::new(bounds, &SnapshotOptions::default());
    assert_approx(plan.scale, 1.0);
    assert_eq!(plan.size, SurfaceSize::new(100, 100));
}

#[test]
fn file_name_embeds_dimensions() {
    assert_eq!(
        snapshot_file_name(SurfaceSize::new(600, 1100), SnapshotFormat::Webp),
        "spine_snapshot_600x1100.webp"
    );
}

fn export_restores_state(start: PlayState) {
    let mut surface = FakeSurface::new(800, 600);
    let mut viewer = loaded_viewer(&surface);
    if start == PlayState::Paused {
        viewer.toggle_play();
    }
    let camera_before = viewer.camera();

    let options = SnapshotOptions {
        padding_px: 10,
        target_long_side: 800,
        format: SnapshotFormat::Png,
    };
    let view = ViewOptions {
        premultiplied_alpha: true,
        ..ViewOptions::default()
    };
    let snapshot = viewer.export_snapshot(&mut surface, &options, &view).unwrap();

    assert_eq!(snapshot.size, SurfaceSize::new(420, 820));
    assert_eq!(snapshot.file_name, "spine_snapshot_420x820.png");

    let draw = surface.draws.last().unwrap();
    assert_eq!(draw.size, SurfaceSize::new(420, 820));
    assert_eq!(draw.options.clear_color, ClearColor::TRANSPARENT);
    assert!(draw.options.premultiplied_alpha);
    assert_approx(draw.camera.zoom, 0.5);

    assert_eq!(surface.size, SurfaceSize::new(800, 600));
    assert_eq!(viewer.play_state(), start);
    assert_eq!(viewer.camera(), camera_before);
}

#[test]
fn export_restores_size_camera_and_state_when_playing() {
    export_restores_state(PlayState::Playing);
}

#[test]
fn export_restores_size_camera_and_state_when_paused() {
    export_restores_state(PlayState::Paused);
}

#[test]
fn export_poses_without_advancing_time() {
    let mut surface = FakeSurface::new(800, 600);
    let mut viewer = loaded_viewer(&surface);
    viewer
        .export_snapshot(&mut surface, &SnapshotOptions::default(), &ViewOptions::default())
        .unwrap();

    let rig = &viewer.scene().unwrap().rig;
    assert!(rig.calls.contains(&"apply"));
    assert!(!rig.calls.contains(&"advance"));
    assert_approx(rig.time, 0.0);
}

#[test]
fn failed_export_still_restores_state() {
    let mut surface = FakeSurface::new(800, 600);
    let mut viewer = loaded_viewer(&surface);
    surface.fail_draw = true;

    let result = viewer.export_snapshot(&mut surface, &SnapshotOptions::default(), &ViewOptions::default());
    assert!(result.is_err());
    assert_eq!(surface.size, SurfaceSize::new(800, 600));
    assert_eq!(viewer.play_state(), PlayState::Playing);
}

#[test]
fn unsupported_webp_falls_back_to_png_name() {
    let mut surface = FakeSurface::new(800, 600);
    surface.webp_supported = false;
    let mut viewer = loaded_viewer(&surface);
    let options = SnapshotOptions {
        format: SnapshotFormat::Webp,
        ..SnapshotOptions::default()
    };

    let snapshot = viewer
        .export_snapshot(&mut surface, &options, &ViewOptions::default())
        .unwrap();
    assert_eq!(snapshot.format, SnapshotFormat::Png);
    assert!(snapshot.file_name.ends_with(".png"));
    assert_eq!(snapshot.data.mime(), "image/png");
}

#[test]
fn export_without_scene_is_an_error() {
    let mut surface = FakeSurface::new(800, 600);
    let mut viewer: Viewer<crate::test_support::FakeRig, String> =
        Viewer::new(&ViewerConfig::default(), surface.size);
    let err = viewer
        .export_snapshot(&mut surface, &SnapshotOptions::default(), &ViewOptions::default())
        .unwrap_err();
    assert!(matches!(err, ViewerError::NoScene));
    assert!(surface.resizes.is_empty());
}

#[test]
fn plan_shrinks_content_to_fit_limit() {
    let bounds = Bounds {
        offset: [-100.0, 0.0],
        size: [200.0, 400.0],
    };
    let options = SnapshotOptions {
        padding_px: 96,
        target_long_side: 40_000,
        format: SnapshotFormat::Png,
    };

    let plan = SnapshotPlan::fit_within(bounds, &options, SurfaceSize::new(8192, 8192)).unwrap();
    assert_approx(plan.scale, 20.0);
    assert_eq!(plan.size, SurfaceSize::new(4192, 8192));
    assert_approx(plan.camera.zoom, 0.05);

    let roomy = SnapshotPlan::fit_within(bounds, &options, SurfaceSize::new(30_000, 50_000)).unwrap();
    assert_eq!(roomy, SnapshotPlan::new(bounds, &options));

    let cramped = SnapshotOptions {
        padding_px: 5000,
        ..options
    };
    assert!(SnapshotPlan::fit_within(bounds, &cramped, SurfaceSize::new(8192, 8192)).is_none());
}

#[test]
fn export_on_limited_surface_reports_drawn_size() {
    let mut surface = FakeSurface::new(800, 600);
    surface.max_dimension = 8192;
    let mut viewer = loaded_viewer(&surface);
    let options = SnapshotOptions {
        padding_px: 96,
        target_long_side: 40_000,
        format: SnapshotFormat::Png,
    };

    let snapshot = viewer
        .export_snapshot(&mut surface, &options, &ViewOptions::default())
        .unwrap();

    let draw = surface.draws.last().unwrap();
    assert_eq!(draw.size, SurfaceSize::new(4192, 8192));
    assert_eq!(snapshot.size, draw.size);
    assert_eq!(snapshot.file_name, "spine_snapshot_4192x8192.png");
    assert_approx(draw.camera.zoom, 0.05);
    assert_eq!(surface.size, SurfaceSize::new(800, 600));
}

#[test]
fn export_fails_when_padding_exceeds_surface_limit() {
    let mut surface = FakeSurface::new(800, 600);
    surface.max_dimension = 8192;
    let mut viewer = loaded_viewer(&surface);
    let camera_before = viewer.camera();
    let options = SnapshotOptions {
        padding_px: 5000,
        ..SnapshotOptions::default()
    };

    let err = viewer
        .export_snapshot(&mut surface, &options, &ViewOptions::default())
        .unwrap_err();
    assert!(matches!(err, ViewerError::Snapshot { .. }));
    assert!(surface.draws.is_empty());
    assert_eq!(surface.size, SurfaceSize::new(800, 600));
    assert_eq!(viewer.camera(), camera_before);
    assert_eq!(viewer.play_state(), PlayState::Playing);
}

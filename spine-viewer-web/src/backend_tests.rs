use spine2d::DrawList;
use spine_viewer::{LoadedAsset, Rig, SpineRuntime, ViewerError};

use crate::{
    DEBUG_TEXTURE, DeclaredOrder, ParsedSkeleton, SpineBackend, SpineRig, append_bone_overlay,
};

const SKELETON_JSON: &str = r#"
{
  "skeleton": { "spine": "4.3.00" },
  "bones": [ { "name": "root" }, { "name": "arm", "parent": "root", "x": 100 } ],
  "slots": [ { "name": "slot0", "bone": "root", "attachment": "mesh0" } ],
  "skins": [
    {
      "name": "default",
      "attachments": {
        "slot0": {
          "mesh0": {
            "type": "mesh",
            "path": "mesh0",
            "uvs": [0,0, 1,0, 1,1, 0,1],
            "vertices": [-128,-128, 128,-128, 128,128, -128,128],
            "triangles": [0,1,2, 2,3,0]
          }
        }
      }
    },
    { "name": "zeta" },
    { "name": "alpha" }
  ],
  "animations": {
    "spin": {
      "bones": {
        "root": {
          "rotate": [
            { "time": 0, "angle": 0 },
            { "time": 1, "angle": 360 }
          ]
        }
      }
    },
    "idle": {}
  }
}
"#;

const ATLAS: &str = r#"
page.png
size: 64,64

mesh0
  rotate: false
  xy: 0, 0
  size: 64, 64
"#;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(diff <= 0.01, "expected {expected}, got {actual} (diff {diff})");
}

fn rig() -> SpineRig {
    let backend = SpineBackend;
    let atlas = backend.parse_atlas(ATLAS).unwrap();
    let data = backend
        .parse_skeleton(&atlas, LoadedAsset::Text(SKELETON_JSON.to_string()))
        .unwrap();
    let mut rig = backend.instantiate(atlas, data);
    rig.set_to_setup_pose();
    rig.update_world_transform();
    rig
}

#[test]
fn atlas_pages_are_listed_in_order() {
    let backend = SpineBackend;
    let atlas = backend
        .parse_atlas("a.png\nsize: 4,4\n\nr\n  xy: 0, 0\n  size: 4, 4\n\nb.png\nsize: 4,4\n\ns\n  xy: 0, 0\n  size: 4, 4\n")
        .unwrap();
    assert_eq!(backend.atlas_page_names(&atlas), vec!["a.png", "b.png"]);
}

#[test]
fn names_follow_the_export() {
    let rig = rig();
    assert_eq!(rig.animation_names(), vec!["spin", "idle"]);
    assert_eq!(rig.skin_names(), vec!["default", "zeta", "alpha"]);
}

#[test]
fn declared_order_reads_both_json_layouts() {
    let order = DeclaredOrder::from_json(
        r#"{"skins":[{"name":"b"},{"name":"a"}],"animations":{"walk":{},"run":{}}}"#,
    );
    assert_eq!(order.skins, vec!["b", "a"]);
    assert_eq!(order.animations, vec!["walk", "run"]);

    let order = DeclaredOrder::from_json(r#"{"skins":{"zz":{},"default":{},"aa":{}}}"#);
    assert_eq!(order.skins, vec!["zz", "default", "aa"]);
    assert!(order.animations.is_empty());

    assert_eq!(DeclaredOrder::from_json("not json"), DeclaredOrder::default());
    assert_eq!(DeclaredOrder::from_json("{}"), DeclaredOrder::default());
}

#[test]
fn setup_pose_bounds_cover_the_mesh() {
    let bounds = rig().bounds().unwrap();
    assert_approx(bounds.offset[0], -128.0);
    assert_approx(bounds.offset[1], -128.0);
    assert_approx(bounds.size[0], 256.0);
    assert_approx(bounds.size[1], 256.0);
}

#[test]
fn unknown_names_map_to_viewer_errors() {
    let mut rig = rig();
    assert!(matches!(
        rig.set_animation("fly", true),
        Err(ViewerError::UnknownAnimation { ref name }) if name == "fly"
    ));
    assert!(matches!(
        rig.set_skin("nope"),
        Err(ViewerError::UnknownSkin { ref name }) if name == "nope"
    ));
    rig.set_skin("zeta").unwrap();
    rig.set_animation("spin", true).unwrap();
    rig.update(0.25);
    assert!(rig.skeleton().bones.len() == 2);
}

#[test]
fn malformed_skeleton_is_a_parse_error() {
    let backend = SpineBackend;
    let atlas = backend.parse_atlas(ATLAS).unwrap();
    let err = backend
        .parse_skeleton(&atlas, LoadedAsset::Text("{ not json".to_string()))
        .unwrap_err();
    assert!(matches!(err, ViewerError::Parse { what: "skeleton", .. }));
}

#[test]
fn undeclared_skins_fall_back_to_default_then_name() {
    let data = spine2d::SkeletonData::from_json_str(SKELETON_JSON).unwrap();
    let parsed = ParsedSkeleton::new(data, DeclaredOrder::default());
    assert_eq!(parsed.skin_order, vec!["default", "alpha", "zeta"]);
    assert_eq!(parsed.animation_order.len(), 2);
}

#[test]
fn update_poses_the_advanced_state_and_moves_skeleton_time() {
    let mut rig = rig();
    rig.set_animation("spin", true).unwrap();
    rig.update(0.25);
    assert_approx(rig.skeleton().time(), 0.25);

    // A quarter turn of the root carries the arm from +x to +y.
    let arm = &rig.skeleton().bones[1];
    assert_approx(arm.world_x, 0.0);
    assert_approx(arm.world_y, 100.0);

    rig.advance(0.25);
    assert_approx(rig.skeleton().time(), 0.25);
}

#[test]
fn premultiplied_alpha_override_applies_to_every_draw() {
    let rig = rig();
    let mut list = DrawList::default();
    rig.append_draw_list(&mut list, true);
    assert!(!list.draws.is_empty());
    assert!(list.draws.iter().all(|d| d.premultiplied_alpha));

    list.clear();
    rig.append_draw_list(&mut list, false);
    assert!(list.draws.iter().all(|d| !d.premultiplied_alpha));
}

#[test]
fn debug_overlay_draws_bones_on_the_debug_texture() {
    let rig = rig();
    let mut list = DrawList::default();
    rig.append_draw_list(&mut list, false);
    let scene_draws = list.draws.len();

    rig.append_debug_overlay(&mut list, 1.0);
    let overlay = list.draws.last().unwrap();
    assert_eq!(list.draws.len(), scene_draws + 1);
    assert_eq!(overlay.texture_path, DEBUG_TEXTURE);
    // One bone line plus two origins.
    assert_eq!(overlay.index_count, 18);
}

#[test]
fn bone_overlay_geometry() {
    let mut list = DrawList::default();
    append_bone_overlay(
        &mut list,
        [([0.0, 0.0], [10.0, 0.0]), ([5.0, 5.0], [5.0, 5.0])],
        [[0.0, 0.0]],
        0.5,
    );

    // The zero-length segment is skipped.
    assert_eq!(list.vertices.len(), 8);
    assert_eq!(list.indices.len(), 12);
    assert_eq!(list.draws.len(), 1);
    assert_eq!(list.draws[0].first_index, 0);

    let line = &list.vertices[..4];
    assert_approx(line[0].position[1], 0.5);
    assert_approx(line[2].position[1], -0.5);
    assert_approx(line[1].position[0], 10.0);

    let origin = &list.vertices[4..];
    assert_approx(origin[0].position[0], -1.0);
    assert_approx(origin[2].position[1], 1.0);
}

#[test]
fn empty_overlay_adds_no_draw() {
    let mut list = DrawList::default();
    append_bone_overlay(&mut list, [], [], 1.0);
    assert!(list.draws.is_empty());
    assert!(list.vertices.is_empty());
}

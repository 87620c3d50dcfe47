use std::path::Path;

use vexel::lottie::{
    DrawNode, Layer, LottieAnimation, LottieLoader, PathCommand, PathData, Rgba8, Surface,
};
use vexel::scene::NodeKind;
use vexel::vector_frames::{ANIMATION_NAME, FRAME_HOLDER, assemble_vector_scene};
use vexel::{Paint, Segment, VexelError};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "vexel_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn rect_node(name: &str) -> DrawNode {
    DrawNode {
        keypath: name.to_string(),
        path: Some(PathData {
            commands: vec![
                PathCommand::MoveTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::Close,
            ],
            points: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
        }),
        color: Rgba8::new(255, 0, 0, 255),
        ..DrawNode::default()
    }
}

#[derive(Clone)]
struct FakeAnimation {
    width: u32,
    height: u32,
    frame_rate: f64,
    frames: Vec<Layer>,
}

impl FakeAnimation {
    fn two_frame_rect() -> Self {
        let frame = Layer {
            layers: vec![Layer {
                nodes: vec![rect_node("rect")],
                ..Layer::default()
            }],
            ..Layer::default()
        };
        Self {
            width: 10,
            height: 10,
            frame_rate: 24.0,
            frames: vec![frame.clone(), frame],
        }
    }
}

impl LottieAnimation for FakeAnimation {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn total_frames(&self) -> u32 {
        self.frames.len() as u32
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn render_tree(&mut self, frame: u32, _width: u32, _height: u32) -> &Layer {
        &self.frames[frame as usize]
    }

    fn render_sync(&mut self, _frame: u32, surface: Surface<'_>) {
        surface.pixels.fill(0);
    }
}

struct FakeLoader(Option<FakeAnimation>);

impl LottieLoader for FakeLoader {
    fn load_path(&self, path: &Path) -> vexel::VexelResult<Box<dyn LottieAnimation>> {
        match &self.0 {
            Some(anim) => Ok(Box::new(anim.clone())),
            None => Err(VexelError::load(format!("cannot read '{}'", path.display()))),
        }
    }

    fn load_bytes(&self, _bytes: &[u8]) -> vexel::VexelResult<Box<dyn LottieAnimation>> {
        match &self.0 {
            Some(anim) => Ok(Box::new(anim.clone())),
            None => Err(VexelError::load("cannot parse bytes")),
        }
    }
}

#[test]
fn two_frame_rect_assembles_per_frame_subtrees() {
    let mut anim = FakeAnimation::two_frame_rect();
    let scene = assemble_vector_scene(&mut anim, "anim").unwrap();

    assert_eq!(scene.root.name, "anim");
    let holder = scene.root.child(FRAME_HOLDER).unwrap();
    assert_eq!(holder.children.len(), 2);

    for (f, frame_node) in holder.children.iter().enumerate() {
        assert_eq!(frame_node.name, format!("frame_{f}"));
        assert_eq!(frame_node.visible, f == 0);
        assert_eq!(frame_node.children.len(), 1);
        let shape = &frame_node.children[0];
        assert_eq!(shape.name, "rect");
        let NodeKind::VectorShape { path } = &shape.kind else {
            panic!("expected a vector shape node");
        };
        assert_eq!(path.subpaths.len(), 1);
        let sub = &path.subpaths[0];
        assert!(sub.closed);
        let point_count = sub
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::MoveTo(_) | Segment::LineTo(_)))
            .count();
        assert_eq!(point_count, 4);
        assert!(matches!(path.fill_paint, Some(Paint::Solid(_))));
    }
}

#[test]
fn animation_length_and_loop_match_frame_rate() {
    let mut anim = FakeAnimation::two_frame_rect();
    let scene = assemble_vector_scene(&mut anim, "anim").unwrap();

    let player = scene.root.child("AnimationPlayer").unwrap();
    let NodeKind::AnimationPlayer { animations } = &player.kind else {
        panic!("expected an animation player node");
    };
    let animation = &animations[ANIMATION_NAME];
    assert!(animation.looped);
    assert!((animation.length - 1.0 / 24.0).abs() < 1e-9);
}

#[test]
fn exactly_one_frame_is_visible_at_every_sample_time() {
    let frame = Layer {
        nodes: vec![rect_node("rect")],
        ..Layer::default()
    };
    let mut anim = FakeAnimation {
        width: 10,
        height: 10,
        frame_rate: 24.0,
        frames: vec![frame.clone(), frame.clone(), frame.clone(), frame],
    };
    let total = anim.frames.len() as u32;
    let scene = assemble_vector_scene(&mut anim, "anim").unwrap();

    let NodeKind::AnimationPlayer { animations } =
        &scene.root.child("AnimationPlayer").unwrap().kind
    else {
        panic!("expected an animation player node");
    };
    let animation = &animations[ANIMATION_NAME];

    let hertz = 1.0 / 24.0;
    for f in 0..total {
        let t = f64::from(f) * hertz;
        let visible: Vec<u32> = (0..total)
            .filter(|&g| {
                animation.sample_bool(&format!("{FRAME_HOLDER}/frame_{g}:visible"), t)
                    == Some(true)
            })
            .collect();
        assert_eq!(visible, vec![f], "wrong visibility set at t={t}");
    }
}

#[test]
fn import_writes_exactly_one_scene_file() {
    let tmp = temp_dir("lottie_scene_import");
    std::fs::create_dir_all(&tmp).unwrap();

    let loader = FakeLoader(Some(FakeAnimation::two_frame_rect()));
    let out = vexel::import_lottie_scene(&loader, Path::new("anim.json"), &tmp.join("anim"))
        .unwrap();

    assert_eq!(out.generated_files.len(), 1);
    let scn = &out.generated_files[0];
    assert_eq!(scn.extension().and_then(|e| e.to_str()), Some("scn"));
    assert!(scn.is_file());

    let doc = vexel::SceneDocument::load(scn).unwrap();
    assert_eq!(doc.root.name, "anim");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn failed_load_aborts_without_writing_files() {
    let tmp = temp_dir("lottie_scene_load_fail");
    std::fs::create_dir_all(&tmp).unwrap();

    let loader = FakeLoader(None);
    let save = tmp.join("broken");
    let err = vexel::import_lottie_scene(&loader, Path::new("broken.json"), &save).unwrap_err();
    assert!(matches!(err, VexelError::Load(_)));

    let mut scn = save.into_os_string();
    scn.push(".scn");
    assert!(!Path::new(&scn).exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn degenerate_animations_are_rejected() {
    let mut no_frames = FakeAnimation {
        frames: vec![],
        ..FakeAnimation::two_frame_rect()
    };
    assert!(assemble_vector_scene(&mut no_frames, "x").is_err());

    let mut zero_rate = FakeAnimation {
        frame_rate: 0.0,
        ..FakeAnimation::two_frame_rect()
    };
    assert!(assemble_vector_scene(&mut zero_rate, "x").is_err());

    let mut zero_size = FakeAnimation {
        width: 0,
        ..FakeAnimation::two_frame_rect()
    };
    assert!(assemble_vector_scene(&mut zero_size, "x").is_err());
}

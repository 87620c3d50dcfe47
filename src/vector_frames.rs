//! Vector Frame Assembly: one live vector subtree per animation frame,
//! with a looping boolean visibility track giving each frame an exclusive
//! single-frame window.

use crate::error::{VexelError, VexelResult};
use crate::lottie::LottieAnimation;
use crate::scene::{
    Animation, Keyframe, NodeKind, SceneDocument, SceneNode, TrackValue, ValueTrack,
};
use crate::walker::walk_layer;

/// Name of the child node holding the per-frame subtrees.
pub const FRAME_HOLDER: &str = "frames";

/// Name the looping animation is registered under.
pub const ANIMATION_NAME: &str = "Default";

/// Build a vector scene from `anim`: a root node named `name` containing a
/// frame holder (one child subtree per frame, only frame 0 initially
/// visible) and an animation player whose `Default` animation toggles
/// exactly one frame visible at any sampled time.
///
/// Fails on sources the walker cannot animate: zero surface size, zero
/// total frames, or a zero frame rate.
pub fn assemble_vector_scene(
    anim: &mut dyn LottieAnimation,
    name: &str,
) -> VexelResult<SceneDocument> {
    let (width, height) = anim.size();
    if width == 0 || height == 0 {
        return Err(VexelError::import(format!(
            "animation has degenerate size {width}x{height}"
        )));
    }
    let total = anim.total_frames();
    if total == 0 {
        return Err(VexelError::import("animation has no frames"));
    }
    let frame_rate = anim.frame_rate();
    if !(frame_rate > 0.0) {
        return Err(VexelError::import(format!(
            "animation has invalid frame rate {frame_rate}"
        )));
    }

    let hertz = 1.0 / frame_rate;
    let mut holder = SceneNode::new(FRAME_HOLDER, NodeKind::Node2D);
    let mut animation = Animation {
        length: f64::from(total - 1) * hertz,
        looped: true,
        tracks: Vec::new(),
    };

    for frame in 0..total {
        // The returned tree is only valid for this iteration; the walker
        // copies everything it needs into owned paths.
        let tree = anim.render_tree(frame, width, height);
        let mut paths = Vec::new();
        walk_layer(tree, &mut paths);

        let mut frame_node = SceneNode::new(format!("frame_{frame}"), NodeKind::Node2D);
        frame_node.visible = frame == 0;
        for (i, path) in paths.into_iter().enumerate() {
            let child_name = if path.name.is_empty() {
                format!("path_{i}")
            } else {
                path.name.clone()
            };
            frame_node
                .children
                .push(SceneNode::new(child_name, NodeKind::VectorShape { path }));
        }

        // Exclusive visibility window: false just before, true at the
        // frame, false just after. Frame 0 gets a sentinel key at -1/fps.
        let t = f64::from(frame) * hertz;
        animation.tracks.push(ValueTrack {
            target: format!("{FRAME_HOLDER}/frame_{frame}:visible"),
            keys: vec![
                Keyframe {
                    time: t - hertz,
                    value: TrackValue::Bool(false),
                },
                Keyframe {
                    time: t,
                    value: TrackValue::Bool(true),
                },
                Keyframe {
                    time: t + hertz,
                    value: TrackValue::Bool(false),
                },
            ],
        });

        holder.children.push(frame_node);
    }

    let mut root = SceneNode::new(name, NodeKind::Node2D);
    root.children.push(holder);
    root.children.push(SceneNode::new(
        "AnimationPlayer",
        NodeKind::AnimationPlayer {
            animations: std::iter::once((ANIMATION_NAME.to_string(), animation)).collect(),
        },
    ));

    Ok(SceneDocument { root })
}

//! Minimal stand-in for the host engine's scene-graph resources.
//!
//! Imports produce a [`SceneDocument`] that is serialized with serde_json
//! into a `.scn` file. Only the node kinds the importers emit are modeled:
//! plain 2D/3D containers, vector shapes, static and animated sprites, and
//! an animation player holding boolean value tracks.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::Path;

use kurbo::Point;

use crate::error::{VexelError, VexelResult};
use crate::path::VectorPath;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    pub root: SceneNode,
}

impl SceneDocument {
    /// Serialize to `path`. The caller picks the full file name (including
    /// the `.scn` extension).
    pub fn save(&self, path: &Path) -> VexelResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| VexelError::serde(format!("write scene '{}': {e}", path.display())))
    }

    pub fn load(path: &Path) -> VexelResult<Self> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| VexelError::serde(format!("read scene '{}': {e}", path.display())))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Local position; `None` means the node sits at its parent's origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

fn default_true() -> bool {
    true
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            visible: true,
            position: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Node2D,
    Node3D,
    VectorShape {
        path: VectorPath,
    },
    Sprite2D {
        texture: TextureFrame,
    },
    Sprite3D {
        texture: TextureFrame,
    },
    AnimatedSprite2D {
        frames: SpriteFrames,
        playing: bool,
    },
    AnimatedSprite3D {
        frames: SpriteFrames,
        playing: bool,
    },
    AnimationPlayer {
        animations: BTreeMap<String, Animation>,
    },
}

/// Sprite-frame animation resource: one named animation, a playback speed
/// in frames per second, and the frame textures in order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SpriteFrames {
    pub animation: String,
    pub speed: f64,
    pub frames: Vec<TextureFrame>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextureFrame {
    pub width: u32,
    pub height: u32,
    pub codec: TextureCodec,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextureCodec {
    /// Straight RGBA8 bytes, row-major. Used for VRAM-bound textures the
    /// host compresses at upload time.
    Rgba8,
    Png,
    Jpeg,
}

/// Keyframed animation addressing node properties by path
/// (`"frames/frame_0:visible"`).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    /// Length in seconds.
    pub length: f64,
    pub looped: bool,
    pub tracks: Vec<ValueTrack>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ValueTrack {
    pub target: String,
    pub keys: Vec<Keyframe>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: TrackValue,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TrackValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Animation {
    /// Step-sample a boolean track: the value of the last key at or before
    /// `t`, or `None` if the track does not exist or has no key yet.
    pub fn sample_bool(&self, target: &str, t: f64) -> Option<bool> {
        let track = self.tracks.iter().find(|tr| tr.target == target)?;
        let key = track.keys.iter().rev().find(|k| k.time <= t)?;
        match key.value {
            TrackValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_bool_is_step_interpolated() {
        let anim = Animation {
            length: 1.0,
            looped: true,
            tracks: vec![ValueTrack {
                target: "n:visible".to_string(),
                keys: vec![
                    Keyframe {
                        time: 0.0,
                        value: TrackValue::Bool(true),
                    },
                    Keyframe {
                        time: 0.5,
                        value: TrackValue::Bool(false),
                    },
                ],
            }],
        };
        assert_eq!(anim.sample_bool("n:visible", -0.1), None);
        assert_eq!(anim.sample_bool("n:visible", 0.0), Some(true));
        assert_eq!(anim.sample_bool("n:visible", 0.49), Some(true));
        assert_eq!(anim.sample_bool("n:visible", 0.5), Some(false));
        assert_eq!(anim.sample_bool("n:visible", 10.0), Some(false));
        assert_eq!(anim.sample_bool("missing", 0.0), None);
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = SceneDocument {
            root: SceneNode {
                position: Some(Point::new(1.5, -2.0)),
                children: vec![SceneNode::new(
                    "sprite",
                    NodeKind::Sprite2D {
                        texture: TextureFrame {
                            width: 2,
                            height: 1,
                            codec: TextureCodec::Rgba8,
                            data: vec![0, 1, 2, 3, 4, 5, 6, 7],
                        },
                    },
                )],
                ..SceneNode::new("root", NodeKind::Node2D)
            },
        };
        let json = serde_json::to_string(&doc).unwrap();
        let back: SceneDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.root.name, "root");
        assert_eq!(back.root.position, Some(Point::new(1.5, -2.0)));
        let sprite = back.root.child("sprite").unwrap();
        assert!(sprite.visible);
        let NodeKind::Sprite2D { texture } = &sprite.kind else {
            panic!("sprite kind lost in round trip");
        };
        assert_eq!(texture.data.len(), 8);
    }
}

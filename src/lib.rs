#![forbid(unsafe_code)]

pub mod error;
pub mod import;
pub mod lottie;
pub mod paint;
pub mod path;
pub mod raster_frames;
pub mod scene;
pub mod svg;
pub mod vector_frames;
pub mod walker;

pub use error::{VexelError, VexelResult};
pub use import::{
    AnimationOptions, CompressOptions, ImportOptions, ImportOutput, import_lottie_scene,
    import_lottie_sprite, import_svg_scene,
};
pub use paint::{Color, GradientStop, Paint};
pub use path::{CapStyle, FillRule, JoinStyle, Segment, Subpath, VectorPath};
pub use scene::{
    Animation, Keyframe, NodeKind, SceneDocument, SceneNode, SpriteFrames, TextureCodec,
    TextureFrame, TrackValue, ValueTrack,
};
pub use walker::{convert_draw_node, walk_layer};

//! Boundary to the external Lottie animation engine.
//!
//! The engine itself (JSON parsing, property interpolation, compositing) is
//! an external collaborator supplied by the host; this module only fixes the
//! contract the importers consume: load a file or byte buffer into an
//! animation handle, then per frame either ask for the flattened render tree
//! (vector import) or for a rasterized surface (sprite import).
//!
//! The render tree is frame-scoped: the engine reuses its internal buffers
//! across calls, so [`LottieAnimation::render_tree`] borrows the handle
//! mutably and hands back a shared [`Layer`] reference. The borrow checker
//! thereby enforces that all needed data is copied into the owned
//! [`VectorPath`](crate::path::VectorPath) model before the next
//! `render_tree`/`render_sync` call.

use std::path::Path;

use crate::error::VexelResult;

/// Animation handle, as produced by a [`LottieLoader`].
pub trait LottieAnimation {
    /// Design surface size in pixels, `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn total_frames(&self) -> u32;

    fn frame_rate(&self) -> f64;

    /// Build the render tree for `frame` at the given surface size.
    ///
    /// The returned tree is valid only until the next call to
    /// `render_tree` or `render_sync` on this handle.
    fn render_tree(&mut self, frame: u32, width: u32, height: u32) -> &Layer;

    /// Rasterize `frame` into `surface` as premultiplied-alpha BGRA8.
    fn render_sync(&mut self, frame: u32, surface: Surface<'_>);
}

/// Factory for animation handles. A failed load (corrupt or unreadable
/// source) surfaces as [`VexelError::Load`](crate::VexelError::Load).
pub trait LottieLoader {
    fn load_path(&self, path: &Path) -> VexelResult<Box<dyn LottieAnimation>>;

    fn load_bytes(&self, bytes: &[u8]) -> VexelResult<Box<dyn LottieAnimation>>;
}

/// Caller-provided pixel target for [`LottieAnimation::render_sync`].
///
/// `pixels` must hold `stride * height` bytes, 4 bytes per pixel, where
/// `stride` is given in bytes.
pub struct Surface<'a> {
    pub pixels: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

impl<'a> Surface<'a> {
    /// Tightly packed surface: stride is `width * 4`.
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert!(pixels.len() >= width as usize * height as usize * 4);
        Self {
            pixels,
            width,
            height,
            stride: width as usize * 4,
        }
    }
}

/// One node of the per-frame composition tree: either a group of child
/// layers or a leaf carrying draw nodes (or both, for some exporters).
#[derive(Clone, Debug)]
pub struct Layer {
    pub visible: bool,
    /// Layer opacity, 0–255. 0 culls the whole subtree.
    pub alpha: u8,
    /// Child layers in z-order (first drawn first).
    pub layers: Vec<Layer>,
    /// Leaf shapes in z-order.
    pub nodes: Vec<DrawNode>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            visible: true,
            alpha: 255,
            layers: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

/// One flattened leaf shape for one frame: path commands plus paint
/// metadata, mirroring what the engine's C view hands out.
#[derive(Clone, Debug)]
pub struct DrawNode {
    /// Hierarchical name of the originating layer/shape; empty if unnamed.
    pub keypath: String,
    /// `None` when the engine produced a node without geometry (degenerate
    /// frames). Such nodes are skipped by the walker.
    pub path: Option<PathData>,
    pub stroke: Stroke,
    pub brush: BrushType,
    /// Shared color channel: used for the stroke paint and, for
    /// `BrushType::Solid`, the fill paint as well.
    pub color: Rgba8,
    /// Present when `brush` is `BrushType::Gradient`.
    pub gradient: Option<Gradient>,
    /// Raw fill-rule code, see [`fill_rule`].
    pub fill_rule: u8,
}

impl Default for DrawNode {
    fn default() -> Self {
        Self {
            keypath: String::new(),
            path: None,
            stroke: Stroke::default(),
            brush: BrushType::Solid,
            color: Rgba8::default(),
            gradient: None,
            fill_rule: fill_rule::WINDING,
        }
    }
}

/// Flat command/point buffers. Each command tag selects how many floats are
/// consumed from `points`: `MoveTo`/`LineTo` two, `CubicTo` six, `Close`
/// none.
#[derive(Clone, Debug, Default)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
    pub points: Vec<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCommand {
    MoveTo,
    LineTo,
    CubicTo,
    Close,
}

#[derive(Clone, Debug, Default)]
pub struct Stroke {
    pub enable: bool,
    pub width: f32,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
    /// Alternating dash/gap lengths. An odd length is malformed but
    /// tolerated; the trailing unpaired value is dropped.
    pub dash_array: Vec<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeCap {
    #[default]
    Flat,
    Square,
    Round,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushType {
    #[default]
    Solid,
    Gradient,
}

/// Raw fill-rule codes as the engine reports them. Unrecognized codes leave
/// the output path's fill rule unset.
pub mod fill_rule {
    pub const EVEN_ODD: u8 = 0;
    pub const WINDING: u8 = 1;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Debug)]
pub struct Gradient {
    pub kind: GradientKind,
    /// Ordered stops; positions are expected non-decreasing in [0, 1].
    pub stops: Vec<GradientStop8>,
}

#[derive(Clone, Copy, Debug)]
pub enum GradientKind {
    Linear {
        start: (f32, f32),
        end: (f32, f32),
    },
    Radial {
        center: (f32, f32),
        focal: (f32, f32),
        radius: f32,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct GradientStop8 {
    pub pos: f32,
    pub color: Rgba8,
}

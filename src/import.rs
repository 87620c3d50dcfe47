//! Import entry points: open a source file, assemble a scene with one of
//! the frame-assembly strategies, and serialize it next to the requested
//! save path.
//!
//! Imports are deterministic pure functions of file content plus options;
//! there are no retries, and nothing is written on failure.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::VexelResult;
use crate::lottie::LottieLoader;
use crate::raster_frames::assemble_raster_scene;
use crate::scene::SceneDocument;
use crate::svg::assemble_svg_scene;
use crate::vector_frames::assemble_vector_scene;

/// Recognized import-time options, keyed the way the host presents them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Target a 3D node tree instead of 2D.
    #[serde(rename = "3d")]
    pub use_3d: bool,
    pub compress: CompressOptions,
    /// Frame shown by a static (non-animated) sprite import.
    pub start_frame: u32,
    /// Skip factor `s >= 0`; the output plays at `frame_rate / (1 + s)`.
    pub skip_frames: f64,
    /// Rasterization surface scale.
    pub scale: (f64, f64),
    pub animation: AnimationOptions,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            use_3d: false,
            compress: CompressOptions::default(),
            start_frame: 0,
            skip_frames: 0.0,
            scale: (1.0, 1.0),
            animation: AnimationOptions::default(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    pub lossy: bool,
    pub lossy_quality: f32,
    pub video_ram: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            lossy: false,
            lossy_quality: 0.75,
            video_ram: false,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// Import as an animated sprite rather than a static frame.
    pub import: bool,
    pub begin_playing: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            import: true,
            begin_playing: true,
        }
    }
}

#[derive(Debug)]
pub struct ImportOutput {
    pub scene: SceneDocument,
    /// Files written by this import: exactly one `<save_path>.scn` on
    /// success.
    pub generated_files: Vec<PathBuf>,
}

/// Import a Lottie file as a vector scene (one vector subtree per frame,
/// visibility-toggled).
#[tracing::instrument(skip(loader))]
pub fn import_lottie_scene(
    loader: &dyn LottieLoader,
    source: &Path,
    save_path: &Path,
) -> VexelResult<ImportOutput> {
    let mut anim = loader.load_path(source)?;
    let scene = assemble_vector_scene(anim.as_mut(), &node_name(source))?;
    write_scene(scene, save_path)
}

/// Import a Lottie file as a rasterized sprite-frame animation (or a
/// static sprite, per `options.animation.import`).
#[tracing::instrument(skip(loader))]
pub fn import_lottie_sprite(
    loader: &dyn LottieLoader,
    source: &Path,
    save_path: &Path,
    options: &ImportOptions,
) -> VexelResult<ImportOutput> {
    let mut anim = loader.load_path(source)?;
    let scene = assemble_raster_scene(anim.as_mut(), &node_name(source), options)?;
    write_scene(scene, save_path)
}

/// Import a static SVG/SVGZ document as a vector scene with per-shape
/// pivots at the shapes' bounding-box centers.
#[tracing::instrument]
pub fn import_svg_scene(source: &Path, save_path: &Path) -> VexelResult<ImportOutput> {
    let bytes = std::fs::read(source)?;
    let tree = crate::svg::parse_svg(&bytes)?;
    let scene = assemble_svg_scene(&tree, &node_name(source))?;
    write_scene(scene, save_path)
}

fn write_scene(scene: SceneDocument, save_path: &Path) -> VexelResult<ImportOutput> {
    let mut file: OsString = save_path.as_os_str().to_owned();
    file.push(".scn");
    let file = PathBuf::from(file);
    scene.save(&file)?;
    tracing::debug!(path = %file.display(), "scene written");
    Ok(ImportOutput {
        scene,
        generated_files: vec![file],
    })
}

/// Scene root name: the source file's base name without extension.
fn node_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string())
}

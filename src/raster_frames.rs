//! Raster Frame Assembly: bake animation frames to fixed-resolution RGBA
//! textures and package them as a sprite-frame animation (or a single
//! static sprite).

use image::ImageEncoder as _;

use crate::error::{VexelError, VexelResult};
use crate::import::{CompressOptions, ImportOptions};
use crate::lottie::{LottieAnimation, Surface};
use crate::scene::{NodeKind, SceneDocument, SceneNode, SpriteFrames, TextureCodec, TextureFrame};

/// Sprite animation name shared by all imported frames.
pub const SPRITE_ANIMATION: &str = "default";

/// Which source frames to bake, and the adjusted playback speed.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub source_frames: Vec<u32>,
    /// Frames per second after skip adjustment: `frame_rate / (1 + skip)`.
    pub speed: f64,
}

/// Resample `total` source frames by a skip factor.
///
/// `skip_frames == 0` keeps every frame. For `skip_frames = s > 0` the
/// output holds `floor(total / (1+s)) + 1` frames; a fractional accumulator
/// spreads the skips so the downsampling does not drift, and the final
/// index is clamped into range.
pub fn plan_frames(total: u32, frame_rate: f64, skip_frames: f64) -> VexelResult<FramePlan> {
    if total == 0 {
        return Err(VexelError::import("animation has no frames"));
    }
    if !(frame_rate > 0.0) {
        return Err(VexelError::import(format!(
            "animation has invalid frame rate {frame_rate}"
        )));
    }
    if !skip_frames.is_finite() || skip_frames < 0.0 {
        return Err(VexelError::import(format!(
            "skip_frames must be finite and >= 0, got {skip_frames}"
        )));
    }

    let count = if skip_frames == 0.0 {
        total as usize
    } else {
        (f64::from(total) / (1.0 + skip_frames)).floor() as usize + 1
    };

    let mut source_frames = Vec::with_capacity(count);
    let mut frame = 0u32;
    let mut unskipped = 0.0f64;
    for _ in 0..count {
        source_frames.push(frame.min(total - 1));
        unskipped += skip_frames;
        let extra = unskipped.floor();
        frame += 1 + extra as u32;
        unskipped -= extra;
    }

    Ok(FramePlan {
        source_frames,
        speed: frame_rate / (1.0 + skip_frames),
    })
}

/// Swap the red and blue bytes of every 4-byte pixel in place.
///
/// The external rasterizer hands back BGRA order; the host expects RGBA.
/// Applying the swap twice restores the original buffer.
pub fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// Rasterize the planned frames at the scaled surface size and encode each
/// one per the compression options.
pub fn render_texture_frames(
    anim: &mut dyn LottieAnimation,
    plan: &FramePlan,
    scale: (f64, f64),
    compress: &CompressOptions,
) -> VexelResult<Vec<TextureFrame>> {
    let (base_w, base_h) = anim.size();
    if base_w == 0 || base_h == 0 {
        return Err(VexelError::import(format!(
            "animation has degenerate size {base_w}x{base_h}"
        )));
    }
    if !(scale.0 > 0.0 && scale.1 > 0.0) || !scale.0.is_finite() || !scale.1.is_finite() {
        return Err(VexelError::import(format!(
            "scale must be positive and finite, got {scale:?}"
        )));
    }
    let width = ((f64::from(base_w) * scale.0).round() as u32).max(1);
    let height = ((f64::from(base_h) * scale.1).round() as u32).max(1);

    let mut frames = Vec::with_capacity(plan.source_frames.len());
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    for &frame in &plan.source_frames {
        pixels.fill(0);
        anim.render_sync(frame, Surface::new(&mut pixels, width, height));
        swap_red_blue(&mut pixels);
        frames.push(encode_texture(&pixels, width, height, compress)?);
    }
    Ok(frames)
}

fn encode_texture(
    rgba: &[u8],
    width: u32,
    height: u32,
    compress: &CompressOptions,
) -> VexelResult<TextureFrame> {
    if compress.video_ram {
        // Raw bytes; the host compresses to its VRAM format at upload.
        return Ok(TextureFrame {
            width,
            height,
            codec: TextureCodec::Rgba8,
            data: rgba.to_vec(),
        });
    }

    let mut data = Vec::new();
    let codec = if compress.lossy {
        let quality = ((compress.lossy_quality.clamp(0.0, 1.0) * 100.0).round() as u8).max(1);
        // JPEG has no alpha channel; lossy frames drop it.
        let rgb: Vec<u8> = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, quality)
            .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| VexelError::import(format!("jpeg encode failed: {e}")))?;
        TextureCodec::Jpeg
    } else {
        image::codecs::png::PngEncoder::new(&mut data)
            .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
            .map_err(|e| VexelError::import(format!("png encode failed: {e}")))?;
        TextureCodec::Png
    };

    Ok(TextureFrame {
        width,
        height,
        codec,
        data,
    })
}

/// Build a sprite scene from `anim` according to `options`.
///
/// The output root is a 2D or 3D container named `name` holding one of four
/// leaf variants: an animated sprite (when `animation.import` is set) or a
/// static sprite showing the configured `start_frame`. A `start_frame` with
/// no corresponding entry in the assembled frame list is a hard failure.
pub fn assemble_raster_scene(
    anim: &mut dyn LottieAnimation,
    name: &str,
    options: &ImportOptions,
) -> VexelResult<SceneDocument> {
    let plan = plan_frames(anim.total_frames(), anim.frame_rate(), options.skip_frames)?;
    let mut frames = render_texture_frames(anim, &plan, options.scale, &options.compress)?;

    let sprite_kind = if options.animation.import {
        let sprite_frames = SpriteFrames {
            animation: SPRITE_ANIMATION.to_string(),
            speed: plan.speed,
            frames,
        };
        if options.use_3d {
            NodeKind::AnimatedSprite3D {
                frames: sprite_frames,
                playing: options.animation.begin_playing,
            }
        } else {
            NodeKind::AnimatedSprite2D {
                frames: sprite_frames,
                playing: options.animation.begin_playing,
            }
        }
    } else {
        let index = options.start_frame as usize;
        if index >= frames.len() {
            return Err(VexelError::import(format!(
                "start_frame {} out of range (frame list holds {})",
                options.start_frame,
                frames.len()
            )));
        }
        let texture = frames.swap_remove(index);
        if options.use_3d {
            NodeKind::Sprite3D { texture }
        } else {
            NodeKind::Sprite2D { texture }
        }
    };

    let root_kind = if options.use_3d {
        NodeKind::Node3D
    } else {
        NodeKind::Node2D
    };
    let mut root = SceneNode::new(name, root_kind);
    root.children.push(SceneNode::new("sprite", sprite_kind));
    Ok(SceneDocument { root })
}

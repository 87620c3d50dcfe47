//! Static SVG/SVGZ import.
//!
//! Parsing is delegated to `usvg` (which also flattens text and resolves
//! shapes to paths); this module converts the parsed tree into the owned
//! [`VectorPath`] model, re-anchors every shape's pivot to its bounding-box
//! center, and normalizes oversized documents to a canonical working scale.
//! A small `resvg`-based rasterization helper is kept for preview/CLI use.

use kurbo::{Point, Rect, Vec2};
use usvg::tiny_skia_path;

use crate::error::{VexelError, VexelResult};
use crate::paint::{Color, GradientStop, Paint};
use crate::path::{CapStyle, FillRule, JoinStyle, Segment, Subpath, VectorPath};
use crate::scene::{NodeKind, SceneDocument, SceneNode};

/// Longest dimension imported vector art is normalized to.
pub const MAX_EXTENT: f64 = 256.0;

/// Parse an SVG or gzip-compressed SVGZ byte buffer.
pub fn parse_svg(bytes: &[u8]) -> VexelResult<usvg::Tree> {
    let options = usvg::Options::default();
    usvg::Tree::from_data(bytes, &options).map_err(|e| VexelError::svg(format!("parse svg: {e}")))
}

/// Flatten the parsed tree into top-level paths, in document order, with
/// all group transforms applied to the geometry.
pub fn extract_paths(tree: &usvg::Tree) -> Vec<VectorPath> {
    let mut out = Vec::new();
    collect_group(tree.root(), &mut out);
    out
}

fn collect_group(group: &usvg::Group, out: &mut Vec<VectorPath>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_group(g, out),
            usvg::Node::Path(p) => {
                if let Some(path) = convert_path(p) {
                    out.push(path);
                }
            }
            // Text has already been flattened to paths by the parser.
            usvg::Node::Text(t) => collect_group(t.flattened(), out),
            usvg::Node::Image(_) => {
                tracing::debug!("embedded raster image skipped by vector import");
            }
        }
    }
}

fn convert_path(path: &usvg::Path) -> Option<VectorPath> {
    let transform = path.abs_transform();
    let subpaths = convert_segments(path.data(), transform);
    if subpaths.is_empty() {
        return None;
    }

    let mut out = VectorPath {
        subpaths,
        ..VectorPath::default()
    };

    if let Some(fill) = path.fill() {
        out.fill_paint = convert_paint(fill.paint(), fill.opacity().get(), transform);
        out.fill_rule = Some(match fill.rule() {
            usvg::FillRule::NonZero => FillRule::NonZero,
            usvg::FillRule::EvenOdd => FillRule::EvenOdd,
        });
    }

    if let Some(stroke) = path.stroke() {
        // Non-uniform transforms cannot be represented in a scalar width;
        // use the average area scale factor.
        let scale = {
            let det = f64::from(transform.sx) * f64::from(transform.sy)
                - f64::from(transform.kx) * f64::from(transform.ky);
            det.abs().sqrt()
        };
        out.line_paint = convert_paint(stroke.paint(), stroke.opacity().get(), transform);
        out.line_width = f64::from(stroke.width().get()) * scale;
        out.cap = match stroke.linecap() {
            usvg::LineCap::Butt => CapStyle::Flat,
            usvg::LineCap::Round => CapStyle::Round,
            usvg::LineCap::Square => CapStyle::Square,
        };
        out.join = match stroke.linejoin() {
            usvg::LineJoin::Miter | usvg::LineJoin::MiterClip => JoinStyle::Miter,
            usvg::LineJoin::Round => JoinStyle::Round,
            usvg::LineJoin::Bevel => JoinStyle::Bevel,
        };
        if let Some(dashes) = stroke.dasharray() {
            out.dash_pattern = dashes
                .chunks_exact(2)
                .map(|pair| (f64::from(pair[0]) * scale, f64::from(pair[1]) * scale))
                .collect();
        }
    }

    Some(out)
}

fn apply_transform(t: tiny_skia_path::Transform, x: f64, y: f64) -> Point {
    Point::new(
        f64::from(t.sx) * x + f64::from(t.kx) * y + f64::from(t.tx),
        f64::from(t.ky) * x + f64::from(t.sy) * y + f64::from(t.ty),
    )
}

fn convert_segments(
    data: &tiny_skia_path::Path,
    transform: tiny_skia_path::Transform,
) -> Vec<Subpath> {
    let map =
        |p: tiny_skia_path::Point| -> Point { apply_transform(transform, f64::from(p.x), f64::from(p.y)) };

    let mut subpaths = Vec::new();
    let mut current = Subpath::default();
    let mut last = Point::ZERO;

    for seg in data.segments() {
        match seg {
            tiny_skia_path::PathSegment::MoveTo(p) => {
                if !current.is_empty() {
                    subpaths.push(std::mem::take(&mut current));
                }
                last = map(p);
                current.segments.push(Segment::MoveTo(last));
            }
            tiny_skia_path::PathSegment::LineTo(p) => {
                last = map(p);
                current.segments.push(Segment::LineTo(last));
            }
            tiny_skia_path::PathSegment::QuadTo(q, e) => {
                // Exact degree elevation to a cubic.
                let q = map(q);
                let e = map(e);
                let c1 = last + (q - last) * (2.0 / 3.0);
                let c2 = e + (q - e) * (2.0 / 3.0);
                current.segments.push(Segment::CubicTo(c1, c2, e));
                last = e;
            }
            tiny_skia_path::PathSegment::CubicTo(c1, c2, e) => {
                let e_mapped = map(e);
                current
                    .segments
                    .push(Segment::CubicTo(map(c1), map(c2), e_mapped));
                last = e_mapped;
            }
            tiny_skia_path::PathSegment::Close => {
                if !current.is_empty() {
                    current.segments.push(Segment::Close);
                    current.closed = true;
                    subpaths.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        subpaths.push(current);
    }
    subpaths
}

fn convert_paint(
    paint: &usvg::Paint,
    opacity: f32,
    transform: tiny_skia_path::Transform,
) -> Option<Paint> {
    let map = |x: f32, y: f32, gradient_transform: tiny_skia_path::Transform| -> Point {
        let p = apply_transform(gradient_transform, f64::from(x), f64::from(y));
        apply_transform(transform, p.x, p.y)
    };
    let stops = |stops: &[usvg::Stop]| -> Vec<GradientStop> {
        stops
            .iter()
            .map(|s| {
                let c = s.color();
                GradientStop {
                    offset: s.offset().get(),
                    color: Color {
                        r: f32::from(c.red) / 255.0,
                        g: f32::from(c.green) / 255.0,
                        b: f32::from(c.blue) / 255.0,
                        a: s.opacity().get() * opacity,
                    },
                }
            })
            .collect()
    };

    match paint {
        usvg::Paint::Color(c) => Some(Paint::Solid(Color {
            r: f32::from(c.red) / 255.0,
            g: f32::from(c.green) / 255.0,
            b: f32::from(c.blue) / 255.0,
            a: opacity,
        })),
        usvg::Paint::LinearGradient(lg) => Some(Paint::LinearGradient {
            p1: map(lg.x1(), lg.y1(), lg.transform()),
            p2: map(lg.x2(), lg.y2(), lg.transform()),
            stops: stops(lg.stops()),
        }),
        usvg::Paint::RadialGradient(rg) => Some(Paint::RadialGradient {
            center: map(rg.cx(), rg.cy(), rg.transform()),
            focal: map(rg.fx(), rg.fy(), rg.transform()),
            radius: f64::from(rg.r().get()),
            stops: stops(rg.stops()),
        }),
        usvg::Paint::Pattern(_) => {
            tracing::debug!("pattern paint is not supported, leaving paint unset");
            None
        }
    }
}

/// Build a vector scene from a parsed SVG document.
///
/// Each path becomes one shape node whose pivot is the path's bounding-box
/// center: geometry is translated by `-center` and the node's position set
/// to `center`, so shapes rotate and scale about their visual centers. If
/// the overall bounding box exceeds [`MAX_EXTENT`] in its longest
/// dimension the whole document (stroke widths included) is uniformly
/// scaled down to exactly that extent.
pub fn assemble_svg_scene(tree: &usvg::Tree, name: &str) -> VexelResult<SceneDocument> {
    let mut paths = extract_paths(tree);

    let overall = paths
        .iter()
        .filter_map(VectorPath::bounding_box)
        .reduce(|a, b| a.union(b));
    if let Some(overall) = overall {
        let longest = overall.width().max(overall.height());
        if longest > MAX_EXTENT {
            let factor = MAX_EXTENT / longest;
            tracing::debug!(longest, factor, "normalizing oversized vector art");
            for path in &mut paths {
                path.scale(factor, true);
            }
        }
    }

    let mut root = SceneNode::new(name, NodeKind::Node2D);
    for (i, mut path) in paths.into_iter().enumerate() {
        let center = path
            .bounding_box()
            .map(|r| r.center())
            .unwrap_or(Point::ZERO);
        path.translate(Vec2::new(-center.x, -center.y));

        let node_name = if path.name.is_empty() {
            format!("path_{i}")
        } else {
            path.name.clone()
        };
        let mut node = SceneNode::new(node_name, NodeKind::VectorShape { path });
        node.position = Some(center);
        root.children.push(node);
    }

    Ok(SceneDocument { root })
}

/// Rasterize the document into tightly packed premultiplied RGBA8.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> VexelResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| VexelError::svg("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let transform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, transform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

//! Recursive conversion of a frame's Lottie render tree into the owned
//! vector path model.
//!
//! The walker is deliberately best-effort: a malformed draw node is skipped
//! on its own, never failing the surrounding frame or animation. The only
//! hard rule is that everything needed from the borrowed tree is copied out
//! before returning, since the tree is invalidated by the next render call.

use kurbo::Point;

use crate::lottie::{
    BrushType, DrawNode, Gradient, GradientKind, Layer, PathCommand, PathData, Stroke, StrokeCap,
    StrokeJoin, fill_rule,
};
use crate::paint::{Color, GradientStop, Paint};
use crate::path::{CapStyle, FillRule, JoinStyle, Segment, Subpath, VectorPath};

/// Walk `layer` depth-first and append one [`VectorPath`] per usable draw
/// node to `out`, in z-order.
///
/// Invisible or fully transparent layers are culled before recursion: their
/// subtrees may contain degenerate geometry that must never be materialized.
pub fn walk_layer(layer: &Layer, out: &mut Vec<VectorPath>) {
    if !layer.visible || layer.alpha == 0 {
        return;
    }

    for child in &layer.layers {
        walk_layer(child, out);
    }

    for node in &layer.nodes {
        if let Some(path) = convert_draw_node(node) {
            out.push(path);
        }
    }
}

/// Convert one draw node, or `None` when the node is defined to contribute
/// nothing: an enabled zero-width stroke, or a missing point buffer.
pub fn convert_draw_node(node: &DrawNode) -> Option<VectorPath> {
    // A zero-width enabled stroke means "no stroke", not "hairline".
    if node.stroke.enable && node.stroke.width == 0.0 {
        tracing::debug!(keypath = %node.keypath, "skipping draw node with zero-width stroke");
        return None;
    }

    let Some(data) = node.path.as_ref() else {
        tracing::debug!(keypath = %node.keypath, "skipping draw node without geometry");
        return None;
    };

    let mut path = VectorPath {
        subpaths: decode_path(data),
        ..VectorPath::default()
    };

    if !node.keypath.is_empty() {
        path.name = node.keypath.clone();
    }

    if node.stroke.enable {
        apply_stroke(&mut path, &node.stroke, node.color.into());
    }

    match node.brush {
        BrushType::Solid => {
            let paint = Paint::Solid(node.color.into());
            path.fill_paint = Some(paint.clone());
            // The source format carries a single color channel per node, so
            // the resolved fill doubles as the stroke paint.
            path.line_paint = Some(paint);
        }
        BrushType::Gradient => {
            if let Some(gradient) = node.gradient.as_ref() {
                let paint = convert_gradient(gradient);
                path.fill_paint = Some(paint.clone());
                path.line_paint = Some(paint);
            } else {
                tracing::debug!(keypath = %node.keypath, "gradient brush without gradient data");
            }
        }
    }

    path.fill_rule = match node.fill_rule {
        fill_rule::EVEN_ODD => Some(FillRule::EvenOdd),
        fill_rule::WINDING => Some(FillRule::NonZero),
        other => {
            tracing::trace!(code = other, "unrecognized fill rule left unset");
            None
        }
    };

    Some(path)
}

/// Decode the flat command/point buffers into subpaths.
///
/// A `MoveTo` always starts a new subpath; `Close` terminates the current
/// one. A trailing open subpath is kept. Drawing commands before the first
/// `MoveTo`, and commands whose points run past the buffer, are dropped.
fn decode_path(data: &PathData) -> Vec<Subpath> {
    fn take<'a>(points: &'a [f32], cursor: &mut usize, n: usize) -> Option<&'a [f32]> {
        let slice = points.get(*cursor..*cursor + n)?;
        *cursor += n;
        Some(slice)
    }

    let mut subpaths = Vec::new();
    let mut current = Subpath::default();
    let mut cursor = 0usize;

    for &cmd in &data.commands {
        match cmd {
            PathCommand::MoveTo => {
                let Some(p) = take(&data.points, &mut cursor, 2) else { break };
                if !current.is_empty() {
                    subpaths.push(std::mem::take(&mut current));
                }
                let to = Point::new(f64::from(p[0]), f64::from(p[1]));
                tracing::trace!(?to, "MoveTo");
                current.segments.push(Segment::MoveTo(to));
            }
            PathCommand::LineTo => {
                let Some(p) = take(&data.points, &mut cursor, 2) else { break };
                if current.is_empty() {
                    continue;
                }
                let to = Point::new(f64::from(p[0]), f64::from(p[1]));
                tracing::trace!(?to, "LineTo");
                current.segments.push(Segment::LineTo(to));
            }
            PathCommand::CubicTo => {
                let Some(p) = take(&data.points, &mut cursor, 6) else { break };
                if current.is_empty() {
                    continue;
                }
                let c1 = Point::new(f64::from(p[0]), f64::from(p[1]));
                let c2 = Point::new(f64::from(p[2]), f64::from(p[3]));
                let to = Point::new(f64::from(p[4]), f64::from(p[5]));
                tracing::trace!(?c1, ?c2, ?to, "CubicTo");
                current.segments.push(Segment::CubicTo(c1, c2, to));
            }
            PathCommand::Close => {
                if current.is_empty() {
                    continue;
                }
                tracing::trace!("Close");
                current.segments.push(Segment::Close);
                current.closed = true;
                subpaths.push(std::mem::take(&mut current));
            }
        }
    }

    if !current.is_empty() {
        subpaths.push(current);
    }
    subpaths
}

fn apply_stroke(path: &mut VectorPath, stroke: &Stroke, color: Color) {
    path.line_width = f64::from(stroke.width);
    path.line_paint = Some(Paint::Solid(color));

    path.cap = match stroke.cap {
        StrokeCap::Flat => CapStyle::Flat,
        StrokeCap::Square => CapStyle::Square,
        StrokeCap::Round => CapStyle::Round,
    };
    path.join = match stroke.join {
        StrokeJoin::Miter => JoinStyle::Miter,
        StrokeJoin::Bevel => JoinStyle::Bevel,
        StrokeJoin::Round => JoinStyle::Round,
    };

    // Pairs only: an odd dash array is malformed-but-tolerated input, the
    // trailing unpaired value is dropped.
    path.dash_pattern = stroke
        .dash_array
        .chunks_exact(2)
        .map(|pair| (f64::from(pair[0]), f64::from(pair[1])))
        .collect();
}

fn convert_gradient(gradient: &Gradient) -> Paint {
    let stops: Vec<GradientStop> = gradient
        .stops
        .iter()
        .map(|stop| GradientStop {
            offset: stop.pos,
            color: stop.color.into(),
        })
        .collect();

    match gradient.kind {
        GradientKind::Linear { start, end } => {
            tracing::trace!(?start, ?end, "linear gradient");
            Paint::LinearGradient {
                p1: Point::new(f64::from(start.0), f64::from(start.1)),
                p2: Point::new(f64::from(end.0), f64::from(end.1)),
                stops,
            }
        }
        GradientKind::Radial {
            center,
            focal,
            radius,
        } => {
            tracing::trace!(?center, ?focal, radius, "radial gradient");
            Paint::RadialGradient {
                center: Point::new(f64::from(center.0), f64::from(center.1)),
                focal: Point::new(f64::from(focal.0), f64::from(focal.1)),
                radius: f64::from(radius),
                stops,
            }
        }
    }
}

impl From<crate::lottie::Rgba8> for Color {
    fn from(c: crate::lottie::Rgba8) -> Self {
        Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lottie::{GradientStop8, Rgba8};

    fn rect_path_data() -> PathData {
        PathData {
            commands: vec![
                PathCommand::MoveTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::Close,
            ],
            points: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
        }
    }

    fn solid_node() -> DrawNode {
        DrawNode {
            keypath: "shape".to_string(),
            path: Some(rect_path_data()),
            color: Rgba8::new(255, 0, 0, 255),
            ..DrawNode::default()
        }
    }

    #[test]
    fn zero_width_enabled_stroke_contributes_nothing() {
        let node = DrawNode {
            stroke: Stroke {
                enable: true,
                width: 0.0,
                ..Stroke::default()
            },
            ..solid_node()
        };
        assert!(convert_draw_node(&node).is_none());
    }

    #[test]
    fn missing_point_buffer_is_skipped() {
        let node = DrawNode {
            path: None,
            ..solid_node()
        };
        assert!(convert_draw_node(&node).is_none());
    }

    #[test]
    fn solid_rect_converts_to_one_closed_subpath() {
        let path = convert_draw_node(&solid_node()).unwrap();
        assert_eq!(path.name, "shape");
        assert_eq!(path.subpaths.len(), 1);
        let sub = &path.subpaths[0];
        assert!(sub.closed);
        assert_eq!(sub.segments.len(), 5);
        assert_eq!(sub.segments[0], Segment::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(*sub.segments.last().unwrap(), Segment::Close);
        assert_eq!(
            path.fill_paint,
            Some(Paint::Solid(Color::from_rgba8(255, 0, 0, 255)))
        );
        // Single color channel: the fill doubles as the stroke paint.
        assert_eq!(path.line_paint, path.fill_paint);
        assert_eq!(path.fill_rule, Some(FillRule::NonZero));
    }

    #[test]
    fn move_to_starts_a_new_subpath_and_trailing_open_subpath_is_kept() {
        let node = DrawNode {
            path: Some(PathData {
                commands: vec![
                    PathCommand::MoveTo,
                    PathCommand::LineTo,
                    PathCommand::Close,
                    PathCommand::MoveTo,
                    PathCommand::LineTo,
                ],
                points: vec![0.0, 0.0, 5.0, 0.0, 10.0, 10.0, 20.0, 10.0],
            }),
            ..solid_node()
        };
        let path = convert_draw_node(&node).unwrap();
        assert_eq!(path.subpaths.len(), 2);
        assert!(path.subpaths[0].closed);
        assert!(!path.subpaths[1].closed);
        assert_eq!(
            path.subpaths[1].segments,
            vec![
                Segment::MoveTo(Point::new(10.0, 10.0)),
                Segment::LineTo(Point::new(20.0, 10.0)),
            ]
        );
    }

    #[test]
    fn truncated_point_buffer_degrades_without_panicking() {
        let node = DrawNode {
            path: Some(PathData {
                commands: vec![PathCommand::MoveTo, PathCommand::CubicTo],
                points: vec![0.0, 0.0, 1.0, 1.0], // cubic needs 6 more floats
            }),
            ..solid_node()
        };
        let path = convert_draw_node(&node).unwrap();
        assert_eq!(path.subpaths.len(), 1);
        assert_eq!(path.subpaths[0].segments.len(), 1);
    }

    #[test]
    fn stroke_styling_is_copied() {
        let node = DrawNode {
            stroke: Stroke {
                enable: true,
                width: 3.0,
                cap: StrokeCap::Round,
                join: StrokeJoin::Bevel,
                dash_array: vec![4.0, 2.0, 1.0], // odd length: trailing value dropped
            },
            ..solid_node()
        };
        let path = convert_draw_node(&node).unwrap();
        assert_eq!(path.line_width, 3.0);
        assert_eq!(path.cap, CapStyle::Round);
        assert_eq!(path.join, JoinStyle::Bevel);
        assert_eq!(path.dash_pattern, vec![(4.0, 2.0)]);
    }

    #[test]
    fn linear_gradient_brush_maps_points_and_stops() {
        let node = DrawNode {
            brush: BrushType::Gradient,
            gradient: Some(Gradient {
                kind: GradientKind::Linear {
                    start: (0.0, 0.0),
                    end: (10.0, 0.0),
                },
                stops: vec![
                    GradientStop8 {
                        pos: 0.0,
                        color: Rgba8::new(255, 0, 0, 255),
                    },
                    GradientStop8 {
                        pos: 1.0,
                        color: Rgba8::new(0, 0, 255, 255),
                    },
                ],
            }),
            ..solid_node()
        };
        let path = convert_draw_node(&node).unwrap();
        let Some(Paint::LinearGradient { p1, p2, stops }) = path.fill_paint.clone() else {
            panic!("expected linear gradient fill, got {:?}", path.fill_paint);
        };
        assert_eq!(p1, Point::new(0.0, 0.0));
        assert_eq!(p2, Point::new(10.0, 0.0));
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].offset, 0.0);
        assert_eq!(stops[0].color, Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(stops[1].offset, 1.0);
        assert_eq!(stops[1].color, Color::from_rgba8(0, 0, 255, 255));
        assert_eq!(path.line_paint, path.fill_paint);
    }

    #[test]
    fn unrecognized_fill_rule_is_left_unset() {
        let node = DrawNode {
            fill_rule: 7,
            ..solid_node()
        };
        let path = convert_draw_node(&node).unwrap();
        assert_eq!(path.fill_rule, None);
    }

    #[test]
    fn invisible_and_transparent_layers_cull_their_subtrees() {
        let malformed = DrawNode {
            // Would decode, but must never be reached.
            path: Some(rect_path_data()),
            ..DrawNode::default()
        };
        let hidden = Layer {
            visible: false,
            nodes: vec![malformed.clone()],
            ..Layer::default()
        };
        let transparent = Layer {
            alpha: 0,
            layers: vec![Layer {
                nodes: vec![malformed],
                ..Layer::default()
            }],
            ..Layer::default()
        };
        let root = Layer {
            layers: vec![hidden, transparent],
            ..Layer::default()
        };

        let mut out = Vec::new();
        walk_layer(&root, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn sibling_order_is_preserved_depth_first() {
        let named = |name: &str| DrawNode {
            keypath: name.to_string(),
            ..solid_node()
        };
        let root = Layer {
            layers: vec![
                Layer {
                    nodes: vec![named("a")],
                    ..Layer::default()
                },
                Layer {
                    layers: vec![Layer {
                        nodes: vec![named("b")],
                        ..Layer::default()
                    }],
                    nodes: vec![named("c")],
                    ..Layer::default()
                },
            ],
            nodes: vec![named("d")],
            ..Layer::default()
        };

        let mut out = Vec::new();
        walk_layer(&root, &mut out);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}

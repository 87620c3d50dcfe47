use kurbo::{BezPath, Point, Rect, Shape as _, Vec2};

use crate::paint::Paint;

/// One path command, in source-file user units.
///
/// A subpath's first segment is always `MoveTo`; `Close`, when present, is
/// the last segment and is not followed by further drawing commands.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier: two control points, then the end point. Curves are kept
    /// exact (never flattened) to preserve resolution independence.
    CubicTo(Point, Point, Point),
    Close,
}

/// One contiguous open-or-closed contour.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Subpath {
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Subpath {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CapStyle {
    #[default]
    Flat,
    Square,
    Round,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JoinStyle {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// Winding rule for self-intersecting contours. Callers must tolerate an
/// absent rule and default to `NonZero`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

/// One renderable shape: subpaths in z-order plus paint and stroke styling.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorPath {
    /// Node name, taken from the Lottie key-path string when non-empty.
    pub name: String,
    pub subpaths: Vec<Subpath>,
    pub fill_paint: Option<Paint>,
    pub line_paint: Option<Paint>,
    /// Stroke width in user units; 0 means no stroke.
    pub line_width: f64,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Ordered (length, gap) pairs; empty means a solid stroke.
    pub dash_pattern: Vec<(f64, f64)>,
    pub fill_rule: Option<FillRule>,
}

impl VectorPath {
    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(Subpath::is_empty)
    }

    /// Lower the subpaths into a [`kurbo::BezPath`] for geometric queries.
    pub fn to_bez_path(&self) -> BezPath {
        let mut bez = BezPath::new();
        for sub in &self.subpaths {
            for seg in &sub.segments {
                match *seg {
                    Segment::MoveTo(p) => bez.move_to(p),
                    Segment::LineTo(p) => bez.line_to(p),
                    Segment::CubicTo(c1, c2, e) => bez.curve_to(c1, c2, e),
                    Segment::Close => bez.close_path(),
                }
            }
            if sub.closed && !matches!(sub.segments.last(), Some(Segment::Close)) {
                bez.close_path();
            }
        }
        bez
    }

    /// Exact bounding box (cubics included), or `None` for an empty path.
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_bez_path().bounding_box())
    }

    /// Translate all geometry, including gradient paint geometry.
    pub fn translate(&mut self, delta: Vec2) {
        self.map_points(|p| p + delta);
    }

    /// Uniform scale about the origin. Gradient radii and, when
    /// `scale_line_width` is set, stroke width and dash lengths scale too.
    pub fn scale(&mut self, factor: f64, scale_line_width: bool) {
        self.map_points(|p| Point::new(p.x * factor, p.y * factor));
        for paint in [self.fill_paint.as_mut(), self.line_paint.as_mut()].into_iter().flatten() {
            if let Paint::RadialGradient { radius, .. } = paint {
                *radius *= factor;
            }
        }
        if scale_line_width {
            self.line_width *= factor;
            for (len, gap) in &mut self.dash_pattern {
                *len *= factor;
                *gap *= factor;
            }
        }
    }

    fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        for sub in &mut self.subpaths {
            for seg in &mut sub.segments {
                match seg {
                    Segment::MoveTo(p) | Segment::LineTo(p) => *p = f(*p),
                    Segment::CubicTo(c1, c2, e) => {
                        *c1 = f(*c1);
                        *c2 = f(*c2);
                        *e = f(*e);
                    }
                    Segment::Close => {}
                }
            }
        }
        for paint in [self.fill_paint.as_mut(), self.line_paint.as_mut()].into_iter().flatten() {
            match paint {
                Paint::Solid(_) => {}
                Paint::LinearGradient { p1, p2, .. } => {
                    *p1 = f(*p1);
                    *p2 = f(*p2);
                }
                Paint::RadialGradient { center, focal, .. } => {
                    *center = f(*center);
                    *focal = f(*focal);
                }
            }
        }
    }
}

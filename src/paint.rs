use kurbo::Point;

/// RGBA color with 0–1 normalized channels.
///
/// Source formats (Lottie render trees, SVG) carry 0–255 channels; use
/// [`Color::from_rgba8`] / [`Color::to_rgba8`] at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: f32::from(a) / 255.0,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// One gradient stop. Offsets are expected non-decreasing in [0, 1]; the
/// importer copies them in source order and does not re-sort.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Closed paint variant set: the file formats supported here only ever
/// produce solid colors and linear/radial gradients.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        p1: Point,
        p2: Point,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        center: Point,
        focal: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn solid_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::Solid(Color::from_rgba8(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_round_trip_is_exact() {
        for &(r, g, b, a) in &[(0u8, 0u8, 0u8, 0u8), (255, 255, 255, 255), (12, 99, 200, 37)] {
            let c = Color::from_rgba8(r, g, b, a);
            assert_eq!(c.to_rgba8(), [r, g, b, a]);
        }
    }

    #[test]
    fn to_rgba8_clamps_out_of_range_channels() {
        let c = Color::new(-0.5, 1.5, 0.5, 1.0);
        assert_eq!(c.to_rgba8(), [0, 255, 128, 255]);
    }
}

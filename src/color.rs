use std::ops::{ Add, AddAssign, Sub, Mul };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Colors are
/// never clamped while rendering; light intensities routinely exceed 1.0 and
/// only get mapped to a displayable range when an image is written.
///
/// # Examples
///
/// Construct the color red:
///
/// ```
/// # use recursive_ray_tracer::color::Color;
/// let red = Color::red();
/// assert_eq!(red, Color::rgb(1.0, 0.0, 0.0));
/// ```
///
/// Blend two colors:
///
/// ```
/// # use recursive_ray_tracer::color::Color;
/// let green = Color::green();
/// let blue = Color::blue();
/// let blend = Color::average(&green, &blue);
/// assert_eq!(blend, Color::rgb(0.0, 0.5, 0.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons. Use `Color::bits` for exact comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Creates a gray color with all three components set to `v`.
    pub fn gray(v: f64) -> Color {
        Color { r: v, g: v, b: v }
    }

    /// The color black.
    pub fn black() -> Color {
        Color::gray(0.0)
    }

    /// The color white.
    pub fn white() -> Color {
        Color::gray(1.0)
    }

    /// The color red.
    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// The color green.
    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    /// The color blue.
    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Scales each component by `k`.
    pub fn scale(&self, k: f64) -> Color {
        *self * k
    }

    /// Divides each component by `k`.
    ///
    /// Used for light attenuation, where `k` is the attenuation factor.
    pub fn reduce(&self, k: f64) -> Color {
        Color {
            r: self.r / k,
            g: self.g / k,
            b: self.b / k,
        }
    }

    /// Checks that every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// The exact bit patterns of the three components.
    pub fn bits(&self) -> [u64; 3] {
        [self.r.to_bits(), self.g.to_bits(), self.b.to_bits()]
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recursive_ray_tracer::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let product = Color::hadamard(&yellow, &purple);
    /// assert_eq!(product, Color::red());
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        let r = c1.r * c2.r;
        let g = c1.g * c2.g;
        let b = c1.b * c2.b;

        Color { r, g, b }
    }

    /// Averages two colors.
    ///
    /// ```
    /// # use recursive_ray_tracer::color::Color;
    /// let cyan = Color::rgb(0.0, 1.0, 1.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let avg = Color::average(&cyan, &purple);
    /// assert_eq!(avg, Color::rgb(0.5, 0.5, 1.0));
    /// ```
    pub fn average(c1: &Color, c2: &Color) -> Color {
        Color::mean(&[*c1, *c2])
    }

    /// The arithmetic mean of a list of colors.
    ///
    /// Colors are summed in slice order and then divided by the count, so
    /// equal inputs always give a bit-identical result. An empty slice is
    /// black.
    pub fn mean(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::black();
        }

        let mut sum = Color::black();
        for c in colors {
            sum += *c;
        }

        sum.reduce(colors.len() as f64)
    }
}

/// Adds two colors together.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

/// Subtracts one color from another.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 0.2, g: 0.5, b: 0.5 };

    assert_eq!(c1 - c2, c3);
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);
    let c2 = Color { r: 0.4, g: 0.6, b: 0.8 };

    assert_eq!(c1 * 2.0, c2);
    assert_eq!(2.0 * c1, c2);
}

#[test]
fn reduce_divides_components() {
    let c = Color::rgb(300.0, 150.0, 30.0);

    assert_eq!(c.reduce(3.0), Color::rgb(100.0, 50.0, 10.0));
}

#[test]
fn mean_of_colors() {
    let colors = [Color::red(), Color::green(), Color::blue(), Color::white()];

    assert_eq!(Color::mean(&colors), Color::gray(0.5));
    assert_eq!(Color::mean(&[]), Color::black());
}

#[test]
fn mean_of_single_color_is_exact() {
    let c = Color::rgb(0.1, 0.2, 0.3);

    assert_eq!(Color::mean(&[c]).bits(), c.bits());
}

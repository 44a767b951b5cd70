use crate::color::Color;

/// The rendered image.
///
/// The canvas stores one color per pixel, row by row from the top-left
/// corner. The renderer fills it in; callers read it back with `get`.
/// Colors are left unclamped.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `y` is the row of the pixel, and
    /// `x` is the column; both are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use recursive_ray_tracer::color::Color;
    /// # use recursive_ray_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.get(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads the color at column `x`, row `y`, or `None` if out-of-bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable, disjoint rows of the canvas, top to bottom.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, Color> {
        // chunks_mut panics on a zero chunk size
        self.pixels.chunks_mut(self.width.max(1))
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(4, 3);

    assert_eq!(c.width(), 4);
    assert_eq!(c.height(), 3);
    assert_eq!(c.pixels().len(), 12);
    assert!(c.pixels().iter().all(|&p| p == Color::black()));
}

#[test]
fn out_of_bounds_pixels() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::red());
    c.write_pixel(0, 2, &Color::red());

    assert_eq!(c.get(2, 0), None);
    assert_eq!(c.get(0, 2), None);
    assert!(c.pixels().iter().all(|&p| p == Color::black()));
}

#[test]
fn rows_are_disjoint_and_ordered() {
    let mut c = Canvas::new(3, 2);
    for (y, row) in c.rows_mut().enumerate() {
        assert_eq!(row.len(), 3);
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = Color::rgb(x as f64, y as f64, 0.0);
        }
    }

    assert_eq!(c.get(2, 1), Some(Color::rgb(2.0, 1.0, 0.0)));
    assert_eq!(c.get(0, 1), Some(Color::rgb(0.0, 1.0, 0.0)));
}

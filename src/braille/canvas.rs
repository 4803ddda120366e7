/// Braille dot overlay used for unit borders on top of the fill raster.
/// Each terminal cell holds a 2x4 dot grid (8 dots), U+2800 to U+28FF.
#[derive(Clone)]
pub struct BrailleCanvas {
    width: usize,  // Cells
    height: usize, // Cells
    dots: Vec<u8>, // One bit pattern per cell, row-major
}

impl BrailleCanvas {
    /// Create a canvas of `width` x `height` cells (`width*2` x `height*4` dots)
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
        }
    }

    /// Set the dot at pixel `(x, y)`.
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            _ => 0x80,
        };
        self.dots[cy * self.width + cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Glyph for the cell at `(cx, cy)`, `None` when no dot is set
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        match self.dots[cy * self.width + cx] {
            0 => None,
            bits => char::from_u32(0x2800 + bits as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.glyph(0, 0), Some('⠁'));
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.glyph(0, 0), Some('⣿'));
    }

    #[test]
    fn test_empty_and_out_of_bounds() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(40, 40);
        canvas.set_pixel_signed(-1, 0);
        assert_eq!(canvas.glyph(0, 0), None);
        assert_eq!(canvas.glyph(5, 0), None);
    }

    #[test]
    fn test_second_cell() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(2, 2);
        canvas.set_pixel(3, 3);
        // (0,2) and (1,3) within the second cell = 0x04 | 0x80
        assert_eq!(canvas.glyph(0, 0), None);
        assert_eq!(canvas.glyph(1, 0), Some('⢄'));
    }
}

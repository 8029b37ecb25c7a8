//! Software 2D canvas over a packed ARGB pixel buffer
//!
//! Platform-independent: everything here works on a plain `Vec<u32>`, the
//! window renderer copies it to the screen.

use rayon::prelude::*;

use crate::surface::Canvas2d;

pub struct PixelCanvas {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            pixels: vec![0xFF000000; width * height],
            width,
            height,
        }
    }

    /// Reallocate for new dimensions. Old contents are dropped, the canvas
    /// comes back opaque black.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width as usize, height as usize);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0xFF000000);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    fn blend_pixel(&mut self, x: isize, y: isize, colour: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let weight = (alpha.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        if weight == 0 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = blend_over(self.pixels[idx], colour, weight);
    }
}

impl Canvas2d for PixelCanvas {
    fn clear(&mut self, background: u32) {
        if self.pixels.is_empty() {
            return;
        }
        let colour = background | 0xFF000000;
        self.pixels
            .par_chunks_mut(self.width)
            .for_each(|row| row.fill(colour));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, colour: u32) {
        if radius <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let colour_alpha = (colour >> 24) as f32 / 255.0;
        let reach = radius + 1.0;

        let y_start = (cy - reach).floor().max(0.0) as isize;
        let y_end = ((cy + reach).ceil() as isize).min(self.height as isize - 1);
        let x_start = (cx - reach).floor().max(0.0) as isize;
        let x_end = ((cx + reach).ceil() as isize).min(self.width as isize - 1);

        for y in y_start..=y_end {
            let dy = y as f32 + 0.5 - cy;
            for x in x_start..=x_end {
                let dx = x as f32 + 0.5 - cx;
                let dist = (dx * dx + dy * dy).sqrt();
                // Half-pixel anti-aliased edge
                let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, colour, coverage * colour_alpha);
                }
            }
        }
    }

    fn stroke_line(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: f32,
        colour: u32,
        opacity: f32,
    ) {
        if opacity <= 0.0 || width <= 0.0 {
            return;
        }
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }

        let half = width / 2.0;
        let band = half + 1.0;
        let steep = (y1 - y0).abs() > (x1 - x0).abs();

        // Walk the major axis, cover a band of pixels across the minor axis
        let (m0, n0, m1, n1) = if steep {
            (y0, x0, y1, x1)
        } else {
            (x0, y0, x1, y1)
        };
        let (m0, n0, m1, n1) = if m0 > m1 {
            (m1, n1, m0, n0)
        } else {
            (m0, n0, m1, n1)
        };
        let major_limit = (if steep { self.height } else { self.width }) as isize;
        let minor_limit = (if steep { self.width } else { self.height }) as isize;

        let m_start = (m0 - band).floor().max(0.0) as isize;
        let m_end = ((m1 + band).ceil() as isize).min(major_limit - 1);
        let slope = if m1 > m0 { (n1 - n0) / (m1 - m0) } else { 0.0 };

        for m in m_start..=m_end {
            let mc = (m as f32 + 0.5).clamp(m0, m1);
            let centre = n0 + (mc - m0) * slope;
            let n_start = (centre - band).floor().max(0.0) as isize;
            let n_end = ((centre + band).ceil() as isize).min(minor_limit - 1);

            for n in n_start..=n_end {
                let (px, py) = if steep { (n, m) } else { (m, n) };
                let dist = segment_distance(px as f32 + 0.5, py as f32 + 0.5, x0, y0, x1, y1);
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, colour, coverage * opacity);
                }
            }
        }
    }
}

/// Distance from (px, py) to the segment (x0, y0)-(x1, y1)
#[inline]
fn segment_distance(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (x0 + t * dx, y0 + t * dy);
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Blend `fg` over `bg` with weight 0..=255, result is opaque
///
/// Spreads the channels into 16-bit lanes of a u64 so all four multiply at once.
#[inline]
fn blend_over(bg_colour: u32, fg_colour: u32, weight: u8) -> u32 {
    // Map 255 -> 256 so a fully opaque source replaces the pixel exactly
    let weight_fg = weight as u64 + (weight as u64 >> 7);
    let weight_bg = 256 - weight_fg;

    let mut bg = bg_colour as u64;
    bg = (bg | (bg << 16)) & 0x0000FFFF0000FFFF;
    bg = (bg | (bg << 8)) & 0x00FF00FF00FF00FF;

    let mut fg = fg_colour as u64;
    fg = (fg | (fg << 16)) & 0x0000FFFF0000FFFF;
    fg = (fg | (fg << 8)) & 0x00FF00FF00FF00FF;

    let mut blended = bg * weight_bg + fg * weight_fg;
    blended = (blended >> 8) & 0x00FF00FF00FF00FF;
    blended = (blended | (blended >> 8)) & 0x0000FFFF0000FFFF;
    blended = blended | (blended >> 16) | 0xFF000000;

    blended as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = 0xFF_FF_00_00;

    #[test]
    fn test_clear_fills_opaque() {
        let mut canvas = PixelCanvas::new(8, 4);
        canvas.clear(0x00_10_20_30);
        assert!(canvas.pixels().iter().all(|&p| p == 0xFF_10_20_30));
    }

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend_over(0xFF_00_00_00, 0xFF_FF_FF_FF, 255), 0xFF_FF_FF_FF);
        assert_eq!(blend_over(0xFF_12_34_56, 0xFF_FF_FF_FF, 0), 0xFF_12_34_56);
        let half = blend_over(0xFF_00_00_00, 0xFF_FF_FF_FF, 128);
        let g = (half >> 8) & 0xFF;
        assert!((127..=129).contains(&g), "half blend gave {:#x}", half);
    }

    #[test]
    fn test_circle_centre_and_outside() {
        let mut canvas = PixelCanvas::new(20, 20);
        canvas.clear(0);
        canvas.fill_circle(10.0, 10.0, 3.0, RED);

        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some(0xFF000000));
        assert_eq!(canvas.pixel(19, 10), Some(0xFF000000));
    }

    #[test]
    fn test_circle_respects_colour_alpha() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.clear(0);
        canvas.fill_circle(5.0, 5.0, 2.0, 0x80_FF_00_00);
        let red = (canvas.pixel(5, 5).unwrap() >> 16) & 0xFF;
        assert!((126..=130).contains(&red), "red channel {}", red);
    }

    #[test]
    fn test_shapes_clip_at_edges() {
        let mut canvas = PixelCanvas::new(16, 16);
        canvas.clear(0);
        // None of these may panic
        canvas.fill_circle(-2.0, -2.0, 5.0, RED);
        canvas.fill_circle(15.9, 15.9, 40.0, RED);
        canvas.stroke_line(-50.0, 8.0, 80.0, 8.0, 1.0, RED, 1.0);
        canvas.stroke_line(8.0, -50.0, 8.0, 80.0, 3.0, RED, 1.0);
        canvas.stroke_line(f32::NAN, 0.0, 4.0, 4.0, 1.0, RED, 1.0);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_line_opacity_scales_colour() {
        let mut canvas = PixelCanvas::new(32, 8);
        canvas.clear(0);
        canvas.stroke_line(2.0, 4.5, 30.0, 4.5, 1.0, 0xFF_FF_FF_FF, 0.15);

        let on_line = canvas.pixel(16, 4).unwrap() & 0xFF;
        // 0.15 * 255 ~ 38
        assert!((36..=40).contains(&on_line), "line pixel {}", on_line);
        assert_eq!(canvas.pixel(16, 0), Some(0xFF000000));
    }

    #[test]
    fn test_steep_line_and_zero_opacity() {
        let mut canvas = PixelCanvas::new(8, 32);
        canvas.clear(0);
        canvas.stroke_line(4.5, 2.0, 4.5, 30.0, 1.0, RED, 0.0);
        assert!(canvas.pixels().iter().all(|&p| p == 0xFF000000));

        canvas.stroke_line(4.5, 2.0, 4.5, 30.0, 1.0, RED, 1.0);
        assert_eq!(canvas.pixel(4, 16), Some(RED));
        assert_eq!(canvas.pixel(0, 16), Some(0xFF000000));
    }

    #[test]
    fn test_zero_sized_canvas() {
        let mut canvas = PixelCanvas::new(0, 0);
        canvas.clear(RED);
        canvas.fill_circle(0.0, 0.0, 2.0, RED);
        canvas.stroke_line(0.0, 0.0, 5.0, 5.0, 1.0, RED, 1.0);
        assert!(canvas.pixels().is_empty());

        canvas.resize(4, 2);
        assert_eq!(canvas.pixels().len(), 8);
    }

    #[test]
    fn test_resize_drops_old_rows() {
        let mut canvas = PixelCanvas::new(4, 2);
        canvas.clear(0);
        canvas.blend_pixel(3, 0, RED, 1.0);

        canvas.resize(8, 2);
        assert_eq!((canvas.width(), canvas.height()), (8, 2));
        assert!(canvas.pixels().iter().all(|&p| p == 0xFF000000));

        // Same size keeps what was drawn
        canvas.blend_pixel(5, 1, RED, 1.0);
        canvas.resize(8, 2);
        assert_eq!(canvas.pixel(5, 1), Some(RED));
    }
}

//! What the animator needs from whatever hosts it
//!
//! The desktop host implements these over a softbuffer window (see `ui`);
//! tests implement them with recording doubles.

/// Immediate-mode 2D drawing context
///
/// Coordinates are in surface pixels. Colours are packed ARGB (0xAARRGGBB).
pub trait Canvas2d {
    /// Fill the whole surface with an opaque colour
    fn clear(&mut self, background: u32);

    /// Filled circle, blended using the colour's alpha byte
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, colour: u32);

    /// Straight line; `opacity` replaces the colour's alpha byte
    #[allow(clippy::too_many_arguments)]
    fn stroke_line(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: f32,
        colour: u32,
        opacity: f32,
    );
}

/// A resizable drawable surface sitting inside some container
pub trait DrawableSurface {
    type Canvas: Canvas2d;

    /// Size of the box the surface should fill, in pixels
    fn container_size(&self) -> (u32, u32);

    /// Set the surface's pixel dimensions
    fn set_size(&mut self, width: u32, height: u32);

    /// The 2D context, or None when the host cannot provide one
    fn context_2d(&mut self) -> Option<&mut Self::Canvas>;
}

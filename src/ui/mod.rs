pub mod canvas;
pub mod renderer;
pub mod theme;

pub use canvas::PixelCanvas;
pub use renderer::WindowSurface;

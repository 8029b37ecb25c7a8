use softbuffer::{Context, Surface};
use std::num::NonZeroU32;
use std::rc::Rc;
use winit::window::Window;

use super::canvas::PixelCanvas;
use crate::error::BackdropError;
use crate::surface::DrawableSurface;

struct Presenter {
    _context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
}

/// Window-backed drawable surface
///
/// Draws into a `PixelCanvas` and copies it into softbuffer's buffer on
/// `present()`. If softbuffer cannot attach to the window there is no canvas
/// and `context_2d()` reports None.
pub struct WindowSurface {
    window: Rc<Window>,
    presenter: Option<Presenter>,
    canvas: Option<PixelCanvas>,
}

impl WindowSurface {
    pub fn new(window: Rc<Window>) -> Self {
        match Self::attach(&window) {
            Ok(presenter) => Self {
                window,
                presenter: Some(presenter),
                canvas: Some(PixelCanvas::new(0, 0)),
            },
            Err(e) => {
                log::warn!("Software surface unavailable: {}", e);
                Self {
                    window,
                    presenter: None,
                    canvas: None,
                }
            }
        }
    }

    fn attach(window: &Rc<Window>) -> Result<Presenter, BackdropError> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        Ok(Presenter {
            _context: context,
            surface,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Copy the canvas to the window
    pub fn present(&mut self) -> Result<(), BackdropError> {
        let (Some(presenter), Some(canvas)) = (self.presenter.as_mut(), self.canvas.as_ref()) else {
            return Ok(());
        };
        if canvas.pixels().is_empty() {
            return Ok(());
        }

        let mut buffer = presenter
            .surface
            .buffer_mut()
            .map_err(|e| BackdropError::Present(e.to_string()))?;
        // Buffer and canvas can disagree for a moment mid-resize
        if buffer.len() != canvas.pixels().len() {
            return Ok(());
        }
        // softbuffer wants 0x00RRGGBB
        for (dst, &src) in buffer.iter_mut().zip(canvas.pixels()) {
            *dst = src & 0x00FF_FFFF;
        }
        buffer
            .present()
            .map_err(|e| BackdropError::Present(e.to_string()))
    }
}

impl DrawableSurface for WindowSurface {
    type Canvas = PixelCanvas;

    fn container_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.resize(width, height);
        }
        let (Some(presenter), Some(w), Some(h)) = (
            self.presenter.as_mut(),
            NonZeroU32::new(width),
            NonZeroU32::new(height),
        ) else {
            return;
        };
        if let Err(e) = presenter.surface.resize(w, h) {
            log::warn!("Failed to resize surface to {}x{}: {}", width, height, e);
        }
    }

    fn context_2d(&mut self) -> Option<&mut PixelCanvas> {
        self.canvas.as_mut()
    }
}

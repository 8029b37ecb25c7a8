use std::rc::Rc;
use std::time::Instant;

use anyhow::{bail, Context};
use plexus_backdrop::ui::WindowSurface;
use plexus_backdrop::{debug_println, BackdropError, FieldConfig, FrameClock, Page, PageEnvironment};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, ModifiersState, NamedKey},
    window::{Window, WindowId},
};

type BackdropPage = Page<WindowSurface, FrameClock>;

#[derive(Debug, Default)]
struct Options {
    reduced_motion: bool,
    particles: Option<usize>,
    seed: Option<u64>,
}

impl Options {
    fn from_args() -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--reduced-motion" => options.reduced_motion = true,
                "--particles" => {
                    let value = args.next().context("--particles needs a value")?;
                    options.particles = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid particle count '{}'", value))?,
                    );
                }
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    options.seed = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid seed '{}'", value))?,
                    );
                }
                other => bail!("unknown argument '{}'", other),
            }
        }
        Ok(options)
    }

    fn field_config(&self, viewport_width: u32) -> FieldConfig {
        let mut config = FieldConfig::for_viewport(viewport_width);
        if let Some(count) = self.particles {
            config = config.with_particle_count(count);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

struct App {
    options: Options,
    window: Option<Rc<Window>>,
    page: Option<BackdropPage>,
    /// Field settings in logical pixels, before the display scale is applied
    config: Option<FieldConfig>,
    #[cfg_attr(not(feature = "debug-keys"), allow(dead_code))]
    modifiers: ModifiersState,
    occluded: bool,
}

impl App {
    fn new(options: Options) -> Self {
        Self {
            options,
            window: None,
            page: None,
            config: None,
            modifiers: ModifiersState::empty(),
            occluded: false,
        }
    }

    fn create_window(event_loop: &ActiveEventLoop) -> Result<Rc<Window>, BackdropError> {
        let window_attributes = Window::default_attributes()
            .with_title("Plexus")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        Ok(Rc::new(event_loop.create_window(window_attributes)?))
    }

    /// Report visibility as a 0/1 intersection ratio
    fn report_visibility(&mut self, visible: bool) {
        if let Some(page) = &mut self.page {
            page.on_visibility(if visible { 1.0 } else { 0.0 });
        }
    }

    /// Run the due frame if there is one, otherwise repaint the field in place
    ///
    /// A redraw between frames (resize, expose) must still fill the canvas.
    fn redraw(&mut self) {
        let Some(animator) = self.page.as_mut().and_then(|p| p.animator_mut()) else {
            return;
        };

        let drew = match animator.scheduler_mut().take_due(Instant::now()) {
            Some(handle) => animator.on_frame(handle),
            None => false,
        };
        if !drew {
            animator.draw_still();
        }

        if let Err(e) = animator.surface_mut().present() {
            log::warn!("{}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Self::create_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        // Query monitor refresh rate to pace frames
        let refresh_millihertz = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz());

        // The field is laid out in logical pixels and drawn in physical ones
        let scale = window.scale_factor();
        let env = PageEnvironment {
            prefers_reduced_motion: self.options.reduced_motion || system_prefers_reduced_motion(),
            viewport_width: window.inner_size().to_logical::<u32>(scale).width,
        };
        let config = self.options.field_config(env.viewport_width);
        self.config = Some(config.clone());
        let config = config.scaled(scale as f32);

        let surface_window = window.clone();
        let page = Page::launch(env, Some(config), move || {
            Ok((
                WindowSurface::new(surface_window),
                FrameClock::from_refresh_millihertz(refresh_millihertz),
            ))
        });
        log::info!(
            "Backdrop loaded ({} particles, refresh {:?} mHz)",
            page.animator()
                .and_then(|a| a.field())
                .map_or(0, |f| f.len()),
            refresh_millihertz
        );

        self.page = Some(page);
        self.window = Some(window.clone());
        self.report_visibility(true);
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Minimised windows report a zero size
                if size.width == 0 || size.height == 0 {
                    self.report_visibility(false);
                    return;
                }
                if let Some(page) = &mut self.page {
                    page.on_viewport_resize();
                }
                let visible = !self.occluded;
                self.report_visibility(visible);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let (Some(page), Some(config)) = (self.page.as_mut(), self.config.as_ref()) else {
                    return;
                };
                if let Some(animator) = page.animator_mut() {
                    animator.set_config(config.clone().scaled(scale_factor as f32));
                    log::info!("Display scale changed to {}", scale_factor);
                }
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                self.report_visibility(!occluded);
                if !occluded {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() {
                    return;
                }
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    #[cfg(feature = "debug-keys")]
                    Key::Character(ref c) if c.as_str() == "d" && self.modifiers.control_key() => {
                        use std::sync::atomic::Ordering;
                        let enabled = !plexus_backdrop::DEBUG_ENABLED.load(Ordering::Relaxed);
                        plexus_backdrop::DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
                        log::info!("Debug output {}", if enabled { "on" } else { "off" });
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let deadline = self
            .page
            .as_ref()
            .and_then(|p| p.animator())
            .and_then(|a| a.scheduler().deadline());

        // Sync to display refresh rate while a frame is pending
        match deadline {
            Some(deadline) if Instant::now() >= deadline => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                debug_println!("Frame due, requesting redraw");
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

/// Whether the desktop asks for reduced motion
///
/// `PLEXUS_REDUCED_MOTION=1` forces it on every platform.
fn system_prefers_reduced_motion() -> bool {
    if let Ok(value) = std::env::var("PLEXUS_REDUCED_MOTION") {
        return matches!(value.trim(), "1" | "true" | "yes");
    }

    #[cfg(target_os = "linux")]
    {
        // GNOME exposes this as "enable-animations"
        std::process::Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "enable-animations"])
            .output()
            .ok()
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .is_some_and(|s| s.trim() == "false")
    }

    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

fn main() -> anyhow::Result<()> {
    plexus_backdrop::init_logging();

    // Log panics before the process goes down
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!("{}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            "unknown location".to_string()
        };
        log::error!("PANIC at {}: {}", location, msg);
    }));

    let options = Options::from_args()?;
    debug_println!("Options: {:?}", options);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(options);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;
    Ok(())
}

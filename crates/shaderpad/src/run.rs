use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use canvas::{PaneCanvas, SurfaceShell};
use padconfig::PadConfig;
use playground::{
    seed_sources, ClockMode, FrameScheduler, LayoutPolicy, Pane, Playground,
};

use crate::cli::Args;
use crate::editor::FileEditor;
use crate::paths::AppPaths;
use crate::store::JsonFileStore;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    let config = resolve_config(&args, &paths)?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        panes = config.panes,
        "resolved shaderpad paths"
    );

    let store_path = args.store.clone().unwrap_or_else(|| paths.store_file());
    let store = JsonFileStore::open(store_path);
    let sources = seed_sources(&store, config.panes);

    let sources_dir = args
        .sources_dir
        .clone()
        .unwrap_or_else(|| paths.sources_dir());
    let mut editors = Vec::with_capacity(config.panes);
    for (index, source) in sources.iter().enumerate() {
        let path = sources_dir.join(format!("pane{index}.frag"));
        editors.push(FileEditor::open(path, source)?);
    }
    tracing::info!(
        panes = config.panes,
        sources = %sources_dir.display(),
        "pane sources ready; edit them with any editor to recompile live"
    );

    let layout = LayoutPolicy {
        pane_width: config.pane_width,
        pane_height: config.pane_height,
        panes_per_row: config.panes_per_row,
        gap: config.gap,
    };

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (width, height) = layout.bounds(config.panes);
    let window = WindowBuilder::new()
        .with_title("shaderpad")
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create playground window: {err}"))?;
    let window = Arc::new(window);

    let shell = SurfaceShell::new(window.as_ref(), window.inner_size())?;
    let panes = editors
        .into_iter()
        .map(|editor| Pane::new(PaneCanvas::new(&shell), editor))
        .collect();
    let mut playground = Playground::new(layout, store, panes);

    let mode = if config.manual_step {
        tracing::info!("manual-step mode: space advances one frame on a fixed 60Hz clock");
        ClockMode::ManualStep
    } else {
        ClockMode::Realtime
    };
    let mut scheduler = FrameScheduler::new(mode);
    let frame_interval = config
        .effective_fps()
        .map(|fps| Duration::from_secs_f32(1.0 / fps));
    let start = Instant::now();
    let mut last_cursor = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut last_frame_at: Option<Instant> = None;

    // First frame regardless of mode, so a frozen playground still shows
    // its seeded panes.
    let _ = scheduler.step();

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        shell.borrow_mut().resize(new_size);
                        let _ = scheduler.request_frame();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let logical = position.to_logical::<f64>(window.scale_factor());
                        last_cursor = (logical.x, logical.y);
                        playground.input_mut().pointer_moved(logical.x, logical.y);
                        let _ = scheduler.request_frame();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            match state {
                                ElementState::Pressed => playground
                                    .input_mut()
                                    .pointer_pressed(last_cursor.0, last_cursor.1),
                                ElementState::Released => {
                                    playground.input_mut().pointer_released()
                                }
                            }
                            let _ = scheduler.request_frame();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let is_space = matches!(event.logical_key, Key::Named(NamedKey::Space));
                        if is_space
                            && event.state == ElementState::Pressed
                            && !event.repeat
                            && scheduler.mode() == ClockMode::ManualStep
                            && scheduler.step()
                        {
                            window.request_redraw();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        // Bind before matching so the shell borrow is back
                        // by the time an arm re-borrows it.
                        let begun = shell.borrow_mut().begin_frame();
                        match begun {
                            Ok(()) => {}
                            Err(canvas::SurfaceError::Lost | canvas::SurfaceError::Outdated) => {
                                let size = shell.borrow().size();
                                shell.borrow_mut().resize(size);
                                let _ = scheduler.request_frame();
                                return;
                            }
                            Err(canvas::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                elwt.exit();
                                return;
                            }
                            Err(err) => {
                                tracing::warn!(%err, "surface error; retrying next frame");
                                let _ = scheduler.request_frame();
                                return;
                            }
                        }

                        let host_now_ms = start.elapsed().as_secs_f64() * 1000.0;
                        let now_ms = scheduler.begin_frame(host_now_ms);
                        let report = playground.run_frame(now_ms, window.scale_factor());
                        shell.borrow_mut().present();
                        last_frame_at = Some(Instant::now());

                        if report.recompiled > 0 {
                            tracing::debug!(
                                recompiled = report.recompiled,
                                flushed = report.flushed,
                                "frame recompiled panes"
                            );
                        }
                        if report.continue_animating {
                            let _ = scheduler.request_frame();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if !scheduler.frame_pending() {
                        elwt.set_control_flow(ControlFlow::Wait);
                        return;
                    }
                    let deadline = match (frame_interval, last_frame_at) {
                        (Some(interval), Some(last)) => Some(last + interval),
                        _ => None,
                    };
                    match deadline {
                        Some(deadline) if Instant::now() < deadline => {
                            elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                        }
                        _ => {
                            window.request_redraw();
                            elwt.set_control_flow(ControlFlow::Wait);
                        }
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Defaults, overlaid by the TOML file when present, overlaid by CLI flags.
fn resolve_config(args: &Args, paths: &AppPaths) -> Result<PadConfig> {
    let config_path = args.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = if config_path.exists() {
        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config at {}", config_path.display()))?;
        let config = PadConfig::from_toml_str(&raw)
            .with_context(|| format!("invalid config at {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        config
    } else {
        PadConfig::default()
    };

    if let Some(panes) = args.panes {
        config.panes = panes;
    }
    if let Some(panes_per_row) = args.panes_per_row {
        config.panes_per_row = panes_per_row;
    }
    if let Some((width, height)) = args.pane_size {
        config.pane_width = width;
        config.pane_height = height;
    }
    if let Some(gap) = args.gap {
        config.gap = gap;
    }
    if let Some(fps) = args.fps {
        config.fps = Some(fps);
    }
    if args.step {
        config.manual_step = true;
    }
    config.validate()?;
    Ok(config)
}

//! # Skyline Input
//!
//! Headless runner for the city viewer input layer.
//!
//! Drives the gamepad virtual pointer and the free-flight camera from Linux
//! evdev devices against a small demo HUD, logging clicks and camera motion.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skyline_input::config::{Config, LoggingConfig};
use skyline_input::error::InputError;
use skyline_input::flight::session::{FlightSession, SessionObserver};
use skyline_input::flight::CameraRig;
use skyline_input::frame::driver::drive;
use skyline_input::frame::FrameLoop;
use skyline_input::gamepad::evdev::EvdevGamepads;
use skyline_input::keyboard::evdev::{check_toggle_key, EvdevKeyboard};
use skyline_input::layer::InputLayer;
use skyline_input::pointer::{PointerTuning, Viewport, VirtualPointer};
use skyline_input::ui::{CursorStyle, ElementInfo, ElementKind, InputType, Rect, UiTree};

/// Frames between status log messages
const STATUS_INTERVAL_FRAMES: u64 = 300;

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "skyline-input.log";

/// Logs flight mode transitions
struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_enabled(&mut self) {
        info!("Flight overlay shown (WASD / arrows to fly, E/Q up/down, Shift boost, Alt slow)");
    }

    fn on_disabled(&mut self) {
        info!("Flight overlay hidden");
    }
}

/// Set up console logging, plus a daily rolling file when configured
///
/// The returned guard must stay alive for file output to be flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = if config.directory.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.directory, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Demo HUD: a toolbar along the top and a rating card in the bottom-right
fn demo_hud(viewport: Viewport) -> UiTree {
    let mut tree = UiTree::new();

    let toolbar = tree.insert(
        None,
        Rect::new(0.0, 0.0, viewport.width, 56.0),
        ElementInfo::new(ElementKind::Generic).with_label("toolbar"),
    );
    tree.insert(
        Some(toolbar),
        Rect::new(12.0, 8.0, 120.0, 40.0),
        ElementInfo::new(ElementKind::Button).with_label("Fly mode"),
    );
    tree.insert(
        Some(toolbar),
        Rect::new(144.0, 8.0, 240.0, 40.0),
        ElementInfo::new(ElementKind::Input(InputType::Search)).with_label("Search district"),
    );
    tree.insert(
        Some(toolbar),
        Rect::new(viewport.width - 112.0, 8.0, 100.0, 40.0),
        ElementInfo::new(ElementKind::Link)
            .with_label("Credits")
            .with_href("#credits"),
    );

    let card = tree.insert(
        None,
        Rect::new(viewport.width - 280.0, viewport.height - 160.0, 260.0, 140.0),
        ElementInfo::new(ElementKind::Generic).with_label("rating card"),
    );
    for (i, stars) in ["1 star", "2 stars", "3 stars", "4 stars", "5 stars"]
        .into_iter()
        .enumerate()
    {
        tree.insert(
            Some(card),
            Rect::new(viewport.width - 268.0 + i as f32 * 48.0, viewport.height - 120.0, 44.0, 44.0),
            ElementInfo::new(ElementKind::Generic)
                .with_label(stars)
                .with_role("radio"),
        );
    }
    tree.insert(
        Some(card),
        Rect::new(viewport.width - 268.0, viewport.height - 64.0, 120.0, 36.0),
        ElementInfo::new(ElementKind::Button)
            .with_label("Submit rating")
            .disabled(),
    );
    tree.insert(
        Some(card),
        Rect::new(viewport.width - 140.0, viewport.height - 64.0, 110.0, 36.0),
        ElementInfo::new(ElementKind::Generic)
            .with_label("Skip")
            .with_cursor(CursorStyle::Pointer),
    );

    tree
}

/// Main entry point for Skyline Input
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or built-in defaults)
///    - Set up logging
///    - Open evdev controllers and keyboards
///    - Mount the input layer on a frame loop
///
/// 2. **Main Loop**
///    - Run input frames at the configured rate
///    - Log clicks, flight transitions and periodic camera status
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Unmount the input layer
///    - Log total frame count
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or is invalid
/// - `/dev/input` cannot be listed
/// - The flight toggle key is not reported by evdev keyboards
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/skyline.toml
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("Failed to load config from {}", path))?
        }
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);
    info!("Skyline Input v{} starting...", env!("CARGO_PKG_VERSION"));

    check_toggle_key(&config.flight.toggle_key).context("Unusable flight.toggle_key")?;

    let viewport = Viewport::new(config.display.width as f32, config.display.height as f32);

    let gamepads = EvdevGamepads::open().context("Failed to scan for controllers")?;
    if gamepads.is_empty() {
        warn!("{}; pointer stays hidden until one is plugged in", InputError::DeviceNotFound("gamepad"));
    }
    let keyboard = EvdevKeyboard::open().context("Failed to scan for keyboards")?;
    if keyboard.is_empty() {
        warn!("{}; flight mode cannot be toggled", InputError::DeviceNotFound("keyboard"));
    }

    let pointer = VirtualPointer::new(
        gamepads,
        demo_hud(viewport),
        viewport,
        PointerTuning::from_config(&config.pointer),
    );
    let mut camera = CameraRig::default();
    camera.aspect = viewport.width / viewport.height;
    let flight = FlightSession::from_config(&config.flight, camera);

    let mut layer = InputLayer::new(pointer, flight)
        .with_keyboard(Box::new(keyboard))
        .with_pointer_enabled(config.pointer.enabled);
    layer.add_observer(Box::new(LogObserver));

    let mut frames = FrameLoop::new();
    layer.mount(&mut frames);

    info!(
        "Press {} to toggle flight mode, Ctrl+C to exit",
        config.flight.toggle_key
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down...");
    };

    let total = drive(&mut frames, config.frame.rate_hz, shutdown, |time| {
        if time.frame % STATUS_INTERVAL_FRAMES != 0 {
            return;
        }
        let camera = layer.camera();
        let cursor = layer
            .cursor()
            .map_or_else(|| "hidden".to_string(), |c| format!("({:.0}, {:.0})", c.x, c.y));
        info!(
            "Frame {}: flight {}, camera at ({:.1}, {:.1}, {:.1}), cursor {}",
            time.frame,
            if layer.flight_enabled() { "on" } else { "off" },
            camera.position.x,
            camera.position.y,
            camera.position.z,
            cursor
        );
    })
    .await;

    layer.unmount(&mut frames);
    info!(
        "Total frames run: {}, synthetic dispatches: {}",
        total,
        layer.pointer().document().journal().len()
    );

    Ok(())
}

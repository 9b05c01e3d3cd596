//! # Input Layer
//!
//! Owns the virtual pointer and the flight session and wires them into a
//! [`FrameScheduler`].
//!
//! Mounting registers up to three frame callbacks, in this order:
//!
//! 1. Keyboard poll (only with a [`KeySource`] attached)
//! 2. Virtual pointer step
//! 3. Flight session step
//!
//! so key events land before the flight step of the same frame, and the
//! pointer always runs before flight. A disabled pointer has no callback at
//! all. Unmounting cancels every callback, hides the cursor and releases held
//! keys.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use crate::flight::camera::CameraRig;
use crate::flight::session::{FlightSession, SessionObserver};
use crate::frame::{schedule, FrameHandle, FrameScheduler, FrameStep, FrameTime};
use crate::gamepad::sampler::GamepadSource;
use crate::keyboard::{KeyDisposition, KeyEvent, KeyPhase, KeySource};
use crate::pointer::{PointerPosition, Viewport, VirtualPointer};
use crate::ui::Document;

type SharedPointer<S, D> = Rc<RefCell<VirtualPointer<S, D>>>;

/// Forwards a key event to the session, marking it editable if the focused
/// element takes text.
fn forward_key<S, D>(
    pointer: &SharedPointer<S, D>,
    flight: &RefCell<FlightSession>,
    phase: KeyPhase,
    event: &KeyEvent,
) -> KeyDisposition
where
    S: GamepadSource,
    D: Document,
{
    let editable = event.target_is_editable || pointer.borrow().document().focus_accepts_text();
    let routed;
    let event = if editable && !event.target_is_editable {
        routed = KeyEvent {
            target_is_editable: true,
            ..event.clone()
        };
        &routed
    } else {
        event
    };

    let mut flight = flight.borrow_mut();
    match phase {
        KeyPhase::Down => flight.key_down(event),
        KeyPhase::Up => flight.key_up(event),
    }
}

fn cancel(scheduler: &mut dyn FrameScheduler, handle: FrameHandle) {
    if !scheduler.cancel_frame_callback(handle) {
        debug!("Frame callback {} was already gone", handle.id());
    }
}

/// Per-frame keyboard poll.
struct KeyPump<S, D> {
    source: Box<dyn KeySource>,
    pointer: SharedPointer<S, D>,
    flight: Rc<RefCell<FlightSession>>,
}

impl<S: GamepadSource, D: Document> FrameStep for KeyPump<S, D> {
    fn on_frame(&mut self, _time: &FrameTime) {
        for input in self.source.poll_keys() {
            forward_key(&self.pointer, &self.flight, input.phase, &input.event);
        }
    }
}

/// The real-time input layer: virtual pointer plus free-flight camera.
pub struct InputLayer<S, D> {
    pointer: SharedPointer<S, D>,
    flight: Rc<RefCell<FlightSession>>,
    keyboard: Option<Rc<RefCell<KeyPump<S, D>>>>,
    pointer_enabled: bool,
    mounted: bool,
    keyboard_handle: Option<FrameHandle>,
    pointer_handle: Option<FrameHandle>,
    flight_handle: Option<FrameHandle>,
}

impl<S, D> InputLayer<S, D>
where
    S: GamepadSource + 'static,
    D: Document + 'static,
{
    #[must_use]
    pub fn new(pointer: VirtualPointer<S, D>, flight: FlightSession) -> Self {
        Self {
            pointer: Rc::new(RefCell::new(pointer)),
            flight: Rc::new(RefCell::new(flight)),
            keyboard: None,
            pointer_enabled: true,
            mounted: false,
            keyboard_handle: None,
            pointer_handle: None,
            flight_handle: None,
        }
    }

    /// Attaches a keyboard polled once per frame while mounted.
    #[must_use]
    pub fn with_keyboard(mut self, source: Box<dyn KeySource>) -> Self {
        self.keyboard = Some(Rc::new(RefCell::new(KeyPump {
            source,
            pointer: Rc::clone(&self.pointer),
            flight: Rc::clone(&self.flight),
        })));
        self
    }

    /// Leaves the pointer disabled on mount when `false`.
    #[must_use]
    pub fn with_pointer_enabled(mut self, enabled: bool) -> Self {
        self.pointer_enabled = enabled;
        self
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }

    /// Registers the frame callbacks. Mounting twice is a no-op.
    pub fn mount(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.mounted {
            return;
        }

        if let Some(keyboard) = &self.keyboard {
            self.keyboard_handle = Some(schedule(scheduler, keyboard));
        }
        if self.pointer_enabled {
            self.pointer.borrow_mut().enable();
            self.pointer_handle = Some(schedule(scheduler, &self.pointer));
        }
        self.flight_handle = Some(schedule(scheduler, &self.flight));
        self.mounted = true;

        info!(
            "Input layer mounted (pointer {})",
            if self.pointer_enabled { "on" } else { "off" }
        );
    }

    /// Turns the virtual pointer on or off at runtime.
    ///
    /// While mounted, disabling cancels the pointer callback and enabling
    /// registers it again ahead of the flight step. Unmounted layers only
    /// record the choice for the next [`mount`](Self::mount).
    pub fn set_pointer_enabled(&mut self, scheduler: &mut dyn FrameScheduler, enabled: bool) {
        if self.pointer_enabled == enabled {
            return;
        }
        self.pointer_enabled = enabled;
        if !self.mounted {
            return;
        }

        if enabled {
            self.pointer.borrow_mut().enable();
            if let Some(handle) = self.flight_handle.take() {
                cancel(scheduler, handle);
            }
            self.pointer_handle = Some(schedule(scheduler, &self.pointer));
            self.flight_handle = Some(schedule(scheduler, &self.flight));
        } else {
            if let Some(handle) = self.pointer_handle.take() {
                cancel(scheduler, handle);
            }
            self.pointer.borrow_mut().disable();
        }
        info!("Virtual pointer {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Cancels the frame callbacks and resets transient state.
    pub fn unmount(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.mounted {
            return;
        }

        let handles = [
            self.keyboard_handle.take(),
            self.pointer_handle.take(),
            self.flight_handle.take(),
        ];
        for handle in handles.into_iter().flatten() {
            cancel(scheduler, handle);
        }
        self.pointer.borrow_mut().disable();
        self.flight.borrow_mut().release_all();
        self.mounted = false;

        info!("Input layer unmounted");
    }

    /// Handles a key-down from a push-style platform feed.
    pub fn key_down(&self, event: &KeyEvent) -> KeyDisposition {
        forward_key(&self.pointer, &self.flight, KeyPhase::Down, event)
    }

    /// Handles a key-up from a push-style platform feed.
    pub fn key_up(&self, event: &KeyEvent) -> KeyDisposition {
        forward_key(&self.pointer, &self.flight, KeyPhase::Up, event)
    }

    /// Applies a viewport resize to the pointer and the camera projection.
    pub fn resize(&self, viewport: Viewport) {
        self.pointer.borrow_mut().on_resize(viewport);
        if viewport.height > 0.0 {
            self.flight
                .borrow_mut()
                .set_aspect(viewport.width / viewport.height);
        }
    }

    pub fn add_observer(&self, observer: Box<dyn SessionObserver>) {
        self.flight.borrow_mut().add_observer(observer);
    }

    /// Current camera transform.
    #[must_use]
    pub fn camera(&self) -> CameraRig {
        *self.flight.borrow().camera()
    }

    /// Cursor to draw, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<PointerPosition> {
        self.pointer.borrow().cursor()
    }

    #[must_use]
    pub fn flight_enabled(&self) -> bool {
        self.flight.borrow().is_enabled()
    }

    pub fn pointer(&self) -> Ref<'_, VirtualPointer<S, D>> {
        self.pointer.borrow()
    }

    pub fn flight(&self) -> Ref<'_, FlightSession> {
        self.flight.borrow()
    }
}

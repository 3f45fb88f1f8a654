//! Animation loop — binds a [`Simulation`] to a host frame clock.
//!
//! The host schedules frames (`requestAnimationFrame` in a browser, a
//! vsync callback elsewhere) and hands each one back through
//! [`AnimationLoop::on_frame`]. Exactly one tick runs per delivered frame,
//! and the renderer only ever sees the settled post-tick state.
//!
//! ## Teardown
//!
//! `stop()` cancels the outstanding frame request before anything else is
//! released, and any frame the host still delivers afterwards is ignored.
//! Dropping the loop stops it.
//!
//! ## Locking
//!
//! The simulation stays locked while a frame ticks and draws. A renderer
//! must not call [`SimulationHandle::with`], `resize` or `reset` from inside
//! `draw`; it already has the settled state in its [`Snapshot`].
//!
//! [`Snapshot`]: crate::render::Snapshot

use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::render::RenderAdapter;
use crate::Simulation;

// ============================================================================
// Host contract
// ============================================================================

/// Handle for a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The host's frame scheduler.
pub trait FrameHost {
    /// Schedule one frame callback.
    fn request_frame(&mut self) -> FrameToken;
    /// Withdraw a callback that has not fired yet.
    fn cancel_frame(&mut self, token: FrameToken);
}

// ============================================================================
// Shared simulation handle
// ============================================================================

/// Cloneable handle through which host callbacks (resize, pointer reset)
/// reach the simulation driven by an [`AnimationLoop`].
#[derive(Clone)]
pub struct SimulationHandle {
    inner: Arc<Mutex<Simulation>>,
}

impl SimulationHandle {
    pub fn new(sim: Simulation) -> Self {
        Self { inner: Arc::new(Mutex::new(sim)) }
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.inner.lock().resize(width, height);
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Run `f` with read access to the simulation.
    pub fn with<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(&self.inner.lock())
    }
}

impl std::fmt::Debug for SimulationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(sim) => f.debug_tuple("SimulationHandle").field(&*sim).finish(),
            None => f.write_str("SimulationHandle(<locked>)"),
        }
    }
}

// ============================================================================
// AnimationLoop
// ============================================================================

/// Lifecycle of an [`AnimationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// Terminal. A stopped loop never ticks again.
    Stopped,
}

/// Drives one simulation from a host's frame callbacks.
pub struct AnimationLoop<H: FrameHost> {
    sim: SimulationHandle,
    host: H,
    pending: Option<FrameToken>,
    state: LoopState,
    frames: u64,
}

impl<H: FrameHost> AnimationLoop<H> {
    pub fn new(sim: Simulation, host: H) -> Self {
        Self {
            sim: SimulationHandle::new(sim),
            host,
            pending: None,
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn handle(&self) -> SimulationHandle {
        self.sim.clone()
    }

    /// Request the first frame. No-op unless idle.
    pub fn start(&mut self) {
        if self.state != LoopState::Idle {
            return;
        }
        self.pending = Some(self.host.request_frame());
        self.state = LoopState::Running;
        debug!("animation loop started");
    }

    /// Deliver a frame: tick, draw, schedule the next one.
    ///
    /// `renderer.draw` runs with the simulation locked; see the module docs.
    ///
    /// Returns false when the frame was ignored, either because the loop is
    /// not running or because `token` is not the outstanding request.
    pub fn on_frame<R: RenderAdapter + ?Sized>(&mut self, token: FrameToken, renderer: &mut R) -> bool {
        if self.state != LoopState::Running || self.pending != Some(token) {
            trace!(?token, state = ?self.state, "ignoring frame");
            return false;
        }
        self.pending = None;
        {
            let mut sim = self.sim.inner.lock();
            sim.tick();
            renderer.draw(&sim.snapshot());
        }
        self.frames += 1;
        self.pending = Some(self.host.request_frame());
        true
    }

    /// Cancel the outstanding frame and stop for good.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.host.cancel_frame(token);
        }
        if self.state != LoopState::Stopped {
            debug!(frames = self.frames, "animation loop stopped");
        }
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: FrameHost> Drop for AnimationLoop<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

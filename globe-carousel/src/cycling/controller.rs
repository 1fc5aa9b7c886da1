//! The autonomous viewport-cycling controller.
//!
//! # State Machine
//!
//! ```text
//!                     start()                     pause() / interaction
//!    Stopped ─────────────────────► Running ─────────────────────────► RunningPaused
//!       ▲                            ▲   │                                 │   │
//!       │ stop() (from any state)    │   │ advance timer: next location    │   │
//!       └────────────────────────────┼───┘                                 │   │
//!                                    │  resume() / idle timer fired        │   │
//!                                    └─────────────────────────────────────┘   │
//!                                                 interaction: restart idle ◄──┘
//! ```
//!
//! Every trigger (public call, timer callback, listener callback, override
//! change) goes through [`CyclingController::apply`], the single transition
//! function that owns the timers. Existing timers are always cleared before
//! new ones are created, and creating the advance timer when one is live is a
//! no-op.
//!
//! # Timeout Prevention
//!
//! While the override is set, interactions are ignored and the controller is
//! held in `RunningPaused` with no timers. Lifting it resumes cycling after
//! [`OVERRIDE_SETTLE_DELAY`], or starts cycling if stopped and `auto_start`
//! is configured.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::{CyclingConfig, OVERRIDE_SETTLE_DELAY};
use super::state::{CyclingPhase, CyclingState};
use super::timer::Timer;
use crate::catalog::{Location, NoRepeatSelector};
use crate::viewport::{InteractionCallback, InteractionKind, InteractionTarget, ViewportBinding};

/// Inputs to the transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Start,
    Stop,
    Pause,
    Resume,
    Interaction(InteractionKind),
    AdvanceTick(u64),
    IdleElapsed(u64),
    SettleElapsed(u64),
    TimeoutPrevented(bool),
}

/// Side effects decided under the lock and performed after releasing it.
#[derive(Debug, Default)]
struct Effects {
    advance: bool,
    /// Generation of the advance timer that requested the advance, if any.
    tick: Option<u64>,
    start: bool,
}

#[derive(Debug)]
struct Inner {
    current: Option<Location>,
    is_active: bool,
    is_paused: bool,
    timeout_prevented: bool,
    advance_timer: Option<Timer>,
    idle_timer: Option<Timer>,
    settle_timer: Option<Timer>,
    next_generation: u64,
}

impl Inner {
    fn snapshot(&self) -> CyclingState {
        CyclingState {
            current_location: self.current.clone(),
            is_active: self.is_active,
            is_paused: self.is_paused,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn clear_timers(&mut self) {
        self.advance_timer = None;
        self.idle_timer = None;
        self.settle_timer = None;
    }

    fn is_current(timer: &Option<Timer>, generation: u64) -> bool {
        timer.as_ref().map(Timer::generation) == Some(generation)
    }
}

/// Cycles the viewport through the catalog until the user takes over.
///
/// Created behind an `Arc`; timers and listeners hold only weak references,
/// so dropping the last `Arc` tears everything down. Must be created and
/// driven from within a tokio runtime.
pub struct CyclingController {
    config: CyclingConfig,
    inner: Mutex<Inner>,
    selector: Mutex<NoRepeatSelector>,
    /// Region-restricted candidates, if configured.
    candidates: Option<Vec<Location>>,
    binding: ViewportBinding,
    state_tx: watch::Sender<CyclingState>,
    me: Weak<CyclingController>,
}

impl std::fmt::Debug for CyclingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyclingController")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CyclingController {
    /// Create a controller. Starts cycling immediately if `auto_start` is set.
    pub fn new(
        config: CyclingConfig,
        selector: NoRepeatSelector,
        binding: ViewportBinding,
    ) -> Arc<Self> {
        let candidates = config.region.map(|region| {
            selector
                .catalog()
                .by_region(region)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        });
        let (state_tx, _) = watch::channel(CyclingState::default());

        let controller = Arc::new_cyclic(|me| Self {
            inner: Mutex::new(Inner {
                current: None,
                is_active: false,
                is_paused: false,
                timeout_prevented: config.timeout_prevented,
                advance_timer: None,
                idle_timer: None,
                settle_timer: None,
                next_generation: 0,
            }),
            selector: Mutex::new(selector),
            candidates,
            binding,
            state_tx,
            me: me.clone(),
            config,
        });

        if controller.config.auto_start {
            controller.start();
        }
        controller
    }

    pub fn config(&self) -> &CyclingConfig {
        &self.config
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> CyclingState {
        self.inner.lock().snapshot()
    }

    pub fn phase(&self) -> CyclingPhase {
        self.state().phase()
    }

    pub fn is_timeout_prevented(&self) -> bool {
        self.inner.lock().timeout_prevented
    }

    /// Receive a snapshot after every transition and selection.
    pub fn subscribe(&self) -> watch::Receiver<CyclingState> {
        self.state_tx.subscribe()
    }

    /// Begin (or restart) cycling. Shows a location immediately if none is current.
    pub fn start(&self) {
        self.apply(Trigger::Start);
    }

    /// Stop cycling. Keeps the current location.
    pub fn stop(&self) {
        self.apply(Trigger::Stop);
    }

    /// Pause without auto-resume.
    pub fn pause(&self) {
        self.apply(Trigger::Pause);
    }

    /// Resume after a pause. No-op when stopped.
    pub fn resume(&self) {
        self.apply(Trigger::Resume);
    }

    /// Advance to the next location now.
    pub fn next_country(&self) {
        self.advance(None);
    }

    /// Set or lift the timeout prevention override.
    pub fn set_timeout_prevented(&self, prevented: bool) {
        self.apply(Trigger::TimeoutPrevented(prevented));
    }

    /// React to a qualifying user interaction.
    pub fn handle_interaction(&self, kind: InteractionKind) {
        self.apply(Trigger::Interaction(kind));
    }

    /// Attach interaction listeners to `element`, replacing any previous ones.
    ///
    /// `None` only removes the existing listeners.
    pub fn bind(&self, element: Option<Arc<dyn InteractionTarget>>) {
        let me = self.me.clone();
        let callback: InteractionCallback = Arc::new(move |kind| {
            if let Some(controller) = me.upgrade() {
                controller.handle_interaction(kind);
            }
        });
        self.binding.bind(element, callback);
    }

    /// Stop, remove listeners, and cancel any pending viewport work.
    pub fn shutdown(&self) {
        self.stop();
        self.binding.unbind();
        self.binding.cancel_pending();
        info!("Cycling controller shut down");
    }

    /// The single state-transition function.
    fn apply(&self, trigger: Trigger) {
        let mut effects = Effects::default();
        let snapshot = {
            let mut inner = self.inner.lock();
            let before = (inner.is_active, inner.is_paused);
            self.transition(&mut inner, trigger, &mut effects);

            if (inner.is_active, inner.is_paused) != before {
                info!(?trigger, phase = %inner.snapshot().phase(), "Cycling state changed");
            }
            inner.snapshot()
        };
        self.state_tx.send_replace(snapshot);

        if effects.start {
            self.apply(Trigger::Start);
        } else if effects.advance {
            self.advance(effects.tick);
        }
    }

    fn transition(&self, inner: &mut Inner, trigger: Trigger, effects: &mut Effects) {
        match trigger {
            Trigger::Start => {
                inner.clear_timers();
                inner.is_active = true;
                if inner.timeout_prevented {
                    inner.is_paused = true;
                } else {
                    inner.is_paused = false;
                    self.ensure_advance_timer(inner);
                }
                effects.advance = inner.current.is_none();
            }
            Trigger::Stop => {
                inner.clear_timers();
                inner.is_active = false;
                inner.is_paused = false;
            }
            Trigger::Pause => {
                if inner.is_active {
                    // Manual pause never auto-resumes, even if an idle timer
                    // from an earlier interaction is pending.
                    inner.clear_timers();
                    inner.is_paused = true;
                }
            }
            Trigger::Resume => {
                if inner.is_active && inner.is_paused && !inner.timeout_prevented {
                    inner.idle_timer = None;
                    inner.settle_timer = None;
                    inner.is_paused = false;
                    self.ensure_advance_timer(inner);
                }
            }
            Trigger::Interaction(kind) => {
                if inner.timeout_prevented || !inner.is_active {
                    return;
                }
                if !inner.is_paused {
                    inner.advance_timer = None;
                    inner.is_paused = true;
                }
                // Only the idle timer may resume after an interaction.
                inner.settle_timer = None;
                debug!(%kind, "Interaction, (re)starting idle timer");
                self.restart_idle_timer(inner);
            }
            Trigger::AdvanceTick(generation) => {
                if Inner::is_current(&inner.advance_timer, generation)
                    && inner.is_active
                    && !inner.is_paused
                {
                    effects.advance = true;
                    effects.tick = Some(generation);
                }
            }
            Trigger::IdleElapsed(generation) => {
                if !Inner::is_current(&inner.idle_timer, generation) {
                    return;
                }
                inner.idle_timer = None;
                if inner.is_active && inner.is_paused && !inner.timeout_prevented {
                    inner.is_paused = false;
                    self.ensure_advance_timer(inner);
                }
            }
            Trigger::SettleElapsed(generation) => {
                if !Inner::is_current(&inner.settle_timer, generation) {
                    return;
                }
                inner.settle_timer = None;
                if inner.is_active && inner.is_paused && !inner.timeout_prevented {
                    inner.idle_timer = None;
                    inner.is_paused = false;
                    self.ensure_advance_timer(inner);
                }
            }
            Trigger::TimeoutPrevented(prevented) => {
                if inner.timeout_prevented == prevented {
                    return;
                }
                inner.timeout_prevented = prevented;
                if prevented {
                    if inner.is_active {
                        inner.clear_timers();
                        inner.is_paused = true;
                    }
                } else if inner.is_active {
                    if inner.is_paused {
                        self.schedule_settle(inner);
                    }
                } else if self.config.auto_start {
                    effects.start = true;
                }
            }
        }
    }

    /// Create the advance timer unless one is already live.
    fn ensure_advance_timer(&self, inner: &mut Inner) {
        if inner.advance_timer.is_some() {
            return;
        }
        let generation = inner.next_generation();
        let me = self.me.clone();
        inner.advance_timer = Some(Timer::repeating(
            self.config.cycle_interval,
            generation,
            move |generation| {
                if let Some(controller) = me.upgrade() {
                    controller.apply(Trigger::AdvanceTick(generation));
                }
            },
        ));
        debug!(
            generation,
            interval_ms = (self.config.cycle_interval.as_millis() as u64),
            "Advance timer started"
        );
    }

    fn restart_idle_timer(&self, inner: &mut Inner) {
        inner.idle_timer = None;
        let generation = inner.next_generation();
        let me = self.me.clone();
        inner.idle_timer = Some(Timer::once(
            self.config.idle_timeout,
            generation,
            move |generation| {
                if let Some(controller) = me.upgrade() {
                    controller.apply(Trigger::IdleElapsed(generation));
                }
            },
        ));
    }

    fn schedule_settle(&self, inner: &mut Inner) {
        inner.settle_timer = None;
        let generation = inner.next_generation();
        let me = self.me.clone();
        inner.settle_timer = Some(Timer::once(
            OVERRIDE_SETTLE_DELAY,
            generation,
            move |generation| {
                if let Some(controller) = me.upgrade() {
                    controller.apply(Trigger::SettleElapsed(generation));
                }
            },
        ));
    }

    /// Select the next location and push it to the viewport.
    ///
    /// Selection failures are logged and absorbed; cycling continues.
    ///
    /// With `tick`, the advance is dropped unless that advance timer is still
    /// live and the controller still running when the location is committed.
    fn advance(&self, tick: Option<u64>) {
        if let Some(generation) = tick {
            if !self.tick_is_live(&self.inner.lock(), generation) {
                return;
            }
        }

        let picked = {
            let mut selector = self.selector.lock();
            match &self.candidates {
                Some(candidates) => selector.select_from(candidates),
                None => selector.select_no_repeat(),
            }
        };

        let location = match picked {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "Location selection failed, keeping current view");
                return;
            }
        };

        info!(code = %location.code, name = %location.name, "Showing location");
        let snapshot = {
            let mut inner = self.inner.lock();
            if let Some(generation) = tick {
                if !self.tick_is_live(&inner, generation) {
                    debug!(generation, "Advance raced with a transition, dropping it");
                    return;
                }
            }
            inner.current = Some(location.clone());
            inner.snapshot()
        };
        self.state_tx.send_replace(snapshot);
        self.binding.on_location_change(&location);
    }

    fn tick_is_live(&self, inner: &Inner, generation: u64) -> bool {
        Inner::is_current(&inner.advance_timer, generation) && inner.is_active && !inner.is_paused
    }
}

//! Observable controller state.

use std::fmt;

use crate::catalog::Location;

/// Coarse controller state, derived from `is_active × is_paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclingPhase {
    /// Not cycling.
    Stopped,
    /// Advancing on the cycle interval.
    Running,
    /// Active but not advancing (user interaction, manual pause, or override).
    RunningPaused,
}

impl CyclingPhase {
    /// User-facing status string.
    pub fn display_status(&self) -> &'static str {
        match self {
            CyclingPhase::Stopped => "Stopped",
            CyclingPhase::Running => "Touring",
            CyclingPhase::RunningPaused => "Paused",
        }
    }
}

impl fmt::Display for CyclingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclingPhase::Stopped => write!(f, "stopped"),
            CyclingPhase::Running => write!(f, "running"),
            CyclingPhase::RunningPaused => write!(f, "running-paused"),
        }
    }
}

/// Read-only snapshot of the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CyclingState {
    pub current_location: Option<Location>,
    pub is_active: bool,
    /// Never `true` while `is_active` is `false`.
    pub is_paused: bool,
}

impl CyclingState {
    pub fn phase(&self) -> CyclingPhase {
        match (self.is_active, self.is_paused) {
            (false, _) => CyclingPhase::Stopped,
            (true, false) => CyclingPhase::Running,
            (true, true) => CyclingPhase::RunningPaused,
        }
    }
}

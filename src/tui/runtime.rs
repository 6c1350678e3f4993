//! Demo runner and TUI application state.

use std::time::Instant;

use crate::card::{Card, CardView};
use crate::config::AppConfig;
use crate::error::EngineError;
use crate::replay::{Replay, ReplayTick};

/// Tick interval options in milliseconds (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 5] = [2000, 1000, 500, 250, 100];

/// Default speed index (1 s).
const DEFAULT_SPEED_IDX: usize = 1;

/// TUI application state.
pub struct App {
    /// Host, sensor and demo source.
    replay: Replay,
    /// Configuration kept for restart.
    config: AppConfig,
    /// Dashboard card with its slide index.
    pub card: Card,
    /// Latest replay tick.
    pub last: Option<ReplayTick>,
    /// Next timestep to execute.
    pub timestep: usize,
    /// Total ticks in the demo day(s).
    pub total_steps: usize,
    /// Whether the demo source is paused.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last demo tick was executed.
    pub last_tick: Instant,
    /// Name shown in the header.
    pub label: String,
}

impl App {
    /// Creates the app from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] when the sensor cannot be built.
    pub fn new(config: AppConfig, label: &str) -> Result<Self, EngineError> {
        let replay = Replay::from_config(&config)?;
        let total_steps = replay.total_steps();
        Ok(Self {
            replay,
            card: Card::new(config.card.clone()),
            config,
            last: None,
            timestep: 0,
            total_steps,
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            label: label.to_string(),
        })
    }

    /// Feeds the next demo reading into the host.
    pub fn tick(&mut self) {
        if self.is_finished() {
            return;
        }
        self.last = Some(self.replay.step(self.timestep));
        self.timestep += 1;
    }

    /// Card view against the host's current states.
    pub fn view(&self) -> CardView {
        self.card.view(self.replay.host())
    }

    /// Toggles pause/resume.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases demo speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases demo speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    /// Returns the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    /// Restarts the demo from the first tick; the slide index is kept.
    pub fn restart(&mut self) {
        let Ok(replay) = Replay::from_config(&self.config) else {
            return;
        };
        self.replay = replay;
        self.last = None;
        self.timestep = 0;
        self.paused = false;
    }

    /// Returns `true` when all demo ticks have been executed.
    pub fn is_finished(&self) -> bool {
        self.timestep >= self.total_steps
    }
}

//! Reveal driver
//!
//! Owns the reveal state and decides when frames happen:
//!
//! `Idle -> Revealing -> SteadyAnimating -> Stopped`
//!
//! While revealing, every tween update produces exactly one frame. Once the
//! tween completes, every display refresh produces one frame until the
//! driver is stopped. An update failure cancels the tween and parks the
//! driver in `Failed`.

use std::fmt;
use std::time::Duration;
use crate::animation::{TimingFunction, Tween, TweenStatus};
use crate::{RevealError, Result};

/// Clock advance per update
pub const DEFAULT_TIME_STEP: f32 = 0.05;

/// Values pushed to the compositor each tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RevealState {
    /// Reveal progress in [0, 1]
    pub progress: f32,
    /// Monotonic animation clock
    pub time: f32,
}

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Tween-driven ticks
    Revealing,
    /// Refresh-driven ticks
    SteadyAnimating,
    Stopped,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Revealing => "revealing",
            Phase::SteadyAnimating => "steady-animating",
            Phase::Stopped => "stopped",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Receives driver ticks. The host scene implements this.
pub trait RevealObserver {
    /// Fail with `ResourceUnavailable` if a tick could not be rendered yet
    fn ready(&self) -> Result<()> {
        Ok(())
    }

    /// Push `state` into the uniforms and render one frame
    fn on_update(&mut self, state: RevealState) -> Result<()>;

    /// The reveal tween finished
    fn on_complete(&mut self) {}

    /// The driver stopped; release rendering resources
    fn on_stop(&mut self) {}
}

/// Reveal timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSettings {
    /// Length of the reveal tween
    pub duration: Duration,
    /// Clock advance per update
    pub time_step: f32,
    pub timing: TimingFunction,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
            time_step: DEFAULT_TIME_STEP,
            timing: TimingFunction::QuadOut,
        }
    }
}

/// Drives progress from 0 to 1, then keeps the clock running
#[derive(Debug)]
pub struct RevealDriver {
    settings: DriverSettings,
    phase: Phase,
    state: RevealState,
    tween: Option<Tween>,
    ticks: u64,
}

impl RevealDriver {
    pub fn new(settings: DriverSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            state: RevealState::default(),
            tween: None,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Updates delivered so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the host should schedule another frame
    pub fn wants_frame(&self) -> bool {
        matches!(self.phase, Phase::Revealing | Phase::SteadyAnimating)
    }

    /// Begin the reveal tween
    pub fn start<O: RevealObserver + ?Sized>(&mut self, observer: &O) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(RevealError::InvalidTransition { phase: self.phase, action: "start" });
        }
        observer.ready()?;

        self.tween = Some(
            Tween::new(0.0, 1.0, self.settings.duration).with_timing(self.settings.timing),
        );
        self.phase = Phase::Revealing;
        tracing::info!("Reveal started over {:?}", self.settings.duration);
        Ok(())
    }

    /// Handle one display refresh, `dt` after the previous one.
    ///
    /// Delivers at most one update to `observer`. Phases without ticks
    /// return immediately.
    pub fn frame<O: RevealObserver + ?Sized>(&mut self, dt: Duration, observer: &mut O) -> Result<Phase> {
        let step = self.settings.time_step;
        match self.phase {
            Phase::Revealing => {
                let state = &mut self.state;
                let ticks = &mut self.ticks;
                let status = match self.tween.as_mut() {
                    Some(tween) => tween.advance(dt, |value| {
                        // Progress never moves backwards during the reveal
                        let next = RevealState {
                            progress: value.clamp(0.0, 1.0).max(state.progress),
                            time: state.time + step,
                        };
                        observer.on_update(next)?;
                        *state = next;
                        *ticks += 1;
                        Ok(())
                    }),
                    None => Ok(TweenStatus::Finished),
                };

                match status {
                    Ok(TweenStatus::Running) => {}
                    Ok(_) => {
                        self.tween = None;
                        self.phase = Phase::SteadyAnimating;
                        tracing::info!("Reveal complete after {} updates", self.ticks);
                        observer.on_complete();
                    }
                    Err(err) => return Err(self.fail(err)),
                }
            }
            Phase::SteadyAnimating => {
                let next = RevealState {
                    time: self.state.time + step,
                    ..self.state
                };
                if let Err(err) = observer.on_update(next) {
                    return Err(self.fail(err));
                }
                self.state = next;
                self.ticks += 1;
            }
            Phase::Idle | Phase::Stopped | Phase::Failed => {}
        }
        Ok(self.phase)
    }

    /// Stop the free-running phase. Only valid while steady-animating.
    pub fn stop<O: RevealObserver + ?Sized>(&mut self, observer: &mut O) -> Result<()> {
        if self.phase != Phase::SteadyAnimating {
            return Err(RevealError::InvalidTransition { phase: self.phase, action: "stop" });
        }
        self.phase = Phase::Stopped;
        observer.on_stop();
        tracing::info!("Reveal stopped after {} updates", self.ticks);
        Ok(())
    }

    /// Manual progress override, honored only after the reveal completed
    pub fn override_progress(&mut self, progress: f32) -> bool {
        if self.phase != Phase::SteadyAnimating || progress.is_nan() {
            return false;
        }
        self.state.progress = progress.clamp(0.0, 1.0);
        true
    }

    fn fail(&mut self, err: RevealError) -> RevealError {
        if let Some(tween) = self.tween.as_mut() {
            tween.cancel();
        }
        self.tween = None;
        tracing::warn!("Reveal update failed while {}: {}", self.phase, err);
        self.phase = Phase::Failed;
        err
    }
}

//! Interactive session: the current heightmap, its parameters and the last
//! finished relief.
//!
//! | Operation          | Allowed from                 | Leads to                      |
//! |--------------------|------------------------------|-------------------------------|
//! | `load`             | any                          | `Loaded`                      |
//! | `set_params`       | any                          | `Loaded` if `Ready`, else same |
//! | `begin_recompute`  | `Loaded`, `Ready`, `Computing` | `Computing`                 |
//! | `complete`         | `Computing`                  | `Ready`, or `Loaded` on error |
//! | `export_stl`       | `Ready`                      | same                          |
//!
//! Every `load`, `set_params` and `begin_recompute` bumps a generation
//! counter. A [`RecomputeTicket`] carries the generation it was issued for,
//! and [`ReliefSession::complete`] drops results from any older generation.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{ReliefError, ReliefResult};
use crate::grid::Grid;
use crate::loader::{HeightmapLoader, RasterSource};
use crate::params::ReliefParams;
use crate::pipeline::{ReliefOutput, ReliefPipeline};

/// Lifecycle state of a [`ReliefSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub enum SessionState {
    /// Nothing loaded yet.
    Empty,
    /// Heights loaded, no current result.
    Loaded,
    /// A recompute is in flight.
    Computing,
    /// The latest result matches the current heights and parameters.
    Ready,
}

/// A self-contained recompute job.
///
/// Holds a snapshot of heights and parameters so it can run on another
/// thread while the session keeps accepting edits.
#[derive(Debug, Clone)]
pub struct RecomputeTicket {
    generation: u64,
    pipeline: ReliefPipeline,
}

impl RecomputeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the pipeline on the snapshot.
    pub fn run(self) -> ComputedRelief {
        let output = self.pipeline.run();
        ComputedRelief {
            generation: self.generation,
            output,
        }
    }
}

/// Result of a ticket, ready to hand back to the session.
#[derive(Debug)]
pub struct ComputedRelief {
    pub generation: u64,
    pub output: ReliefResult<ReliefOutput>,
}

/// Session state machine around [`ReliefPipeline`].
#[derive(Debug)]
pub struct ReliefSession {
    state: SessionState,
    raw: Option<Grid>,
    /// Unscaled samples behind `raw` when it came from an image.
    samples: Option<Grid>,
    params: ReliefParams,
    generation: u64,
    latest: Option<ReliefOutput>,
}

impl Default for ReliefSession {
    fn default() -> Self {
        Self::new(ReliefParams::default())
    }
}

impl ReliefSession {
    pub fn new(params: ReliefParams) -> Self {
        Self {
            state: SessionState::Empty,
            raw: None,
            samples: None,
            params,
            generation: 0,
            latest: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &ReliefParams {
        &self.params
    }

    pub fn raw(&self) -> Option<&Grid> {
        self.raw.as_ref()
    }

    /// Last applied result, if any. Kept across edits until replaced.
    pub fn latest(&self) -> Option<&ReliefOutput> {
        self.latest.as_ref()
    }

    /// Replace the heightmap with heights used as given. Allowed in every
    /// state.
    pub fn load(&mut self, raw: Grid) {
        self.samples = None;
        self.install(raw);
    }

    fn install(&mut self, raw: Grid) {
        info!(
            width = raw.width(),
            height = raw.height(),
            from = ?self.state,
            "Session loaded heightmap"
        );
        self.raw = Some(raw);
        self.generation += 1;
        self.transition(SessionState::Loaded);
    }

    /// Load from any raster source, scaling samples by the current `z_scale`.
    ///
    /// Image samples are kept so a later `z_scale` change rescales them
    /// from the source values.
    pub fn load_source<S: RasterSource + ?Sized>(&mut self, source: &S) -> ReliefResult<()> {
        if !source.holds_samples() {
            self.load(source.load_heights(&HeightmapLoader::default())?);
            return Ok(());
        }
        let samples = source.load_heights(&HeightmapLoader::default())?;
        let raw = HeightmapLoader::new(self.params.z_scale)?.scale(&samples);
        self.samples = Some(samples);
        self.install(raw);
        Ok(())
    }

    /// Change parameters. A ready session drops back to `Loaded`; an
    /// in-flight recompute becomes stale.
    pub fn set_params(&mut self, params: ReliefParams) -> ReliefResult<()> {
        params.validate()?;
        if let Some(samples) = &self.samples {
            if params.z_scale != self.params.z_scale {
                self.raw = Some(HeightmapLoader::new(params.z_scale)?.scale(samples));
                debug!(z_scale = params.z_scale, "Rescaled session heights");
            }
        }
        self.params = params;
        self.generation += 1;
        if self.state == SessionState::Ready {
            self.transition(SessionState::Loaded);
        }
        Ok(())
    }

    /// Start a recompute, superseding any in flight.
    pub fn begin_recompute(&mut self) -> ReliefResult<RecomputeTicket> {
        let raw = match (&self.raw, self.state) {
            (Some(raw), SessionState::Loaded | SessionState::Ready | SessionState::Computing) => {
                raw.clone()
            }
            _ => {
                return Err(ReliefError::InvalidTransition {
                    from: self.state,
                    action: "recompute",
                });
            }
        };
        self.generation += 1;
        self.transition(SessionState::Computing);
        debug!(generation = self.generation, "Issued recompute ticket");
        Ok(RecomputeTicket {
            generation: self.generation,
            pipeline: ReliefPipeline::new(raw).with_params(self.params.clone()),
        })
    }

    /// Apply a finished recompute.
    ///
    /// Returns `Ok(false)` when the result is stale and was discarded. A
    /// failed current run returns the session to `Loaded` and passes the
    /// error on.
    pub fn complete(&mut self, computed: ComputedRelief) -> ReliefResult<bool> {
        if computed.generation != self.generation {
            debug!(
                stale = computed.generation,
                current = self.generation,
                "Discarded stale recompute"
            );
            return Ok(false);
        }
        if self.state != SessionState::Computing {
            return Err(ReliefError::InvalidTransition {
                from: self.state,
                action: "complete a recompute",
            });
        }
        match computed.output {
            Ok(output) => {
                self.latest = Some(output);
                self.transition(SessionState::Ready);
                Ok(true)
            }
            Err(e) => {
                self.transition(SessionState::Loaded);
                Err(e)
            }
        }
    }

    /// Begin, run and complete in one call.
    pub fn recompute(&mut self) -> ReliefResult<&ReliefOutput> {
        let ticket = self.begin_recompute()?;
        self.complete(ticket.run())?;
        self.latest.as_ref().ok_or(ReliefError::InvalidTransition {
            from: self.state,
            action: "read the result",
        })
    }

    /// ASCII STL of the current result, or `None` when the relief is flat.
    pub fn export_stl(&self) -> ReliefResult<Option<String>> {
        let output = match (&self.latest, self.state) {
            (Some(output), SessionState::Ready) => output,
            _ => {
                return Err(ReliefError::InvalidTransition {
                    from: self.state,
                    action: "export",
                });
            }
        };
        if output.is_empty() {
            info!("Nothing to export");
            return Ok(None);
        }
        output.export_stl().map(Some)
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "Session transition");
        }
        self.state = to;
    }
}

/// Default quiet period before an edit burst triggers a recompute.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(750);

/// Fires once after edits have stopped for the quiet period.
///
/// Times are passed in so callers decide the clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    last_edit: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_edit: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record an edit at `now`, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// Whether an edit is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// Drop any pending edit.
    pub fn cancel(&mut self) {
        self.last_edit = None;
    }

    /// True exactly once when the quiet period has passed since the last edit.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(at) if now.saturating_duration_since(at) >= self.quiet => {
                self.last_edit = None;
                true
            }
            _ => false,
        }
    }
}

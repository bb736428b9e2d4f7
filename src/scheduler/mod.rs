//! Scheduler Loop
//!
//! Two-state machine driving sync and display:
//! - `Refreshing`: display stopped, sync cycle running
//! - `RunningDisplay`: slideshow up, waiting for the next tick
//!
//! Bootstrap runs one refresh immediately; every tick after that stops the
//! display, syncs and restarts it with the current cache contents.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

use crate::cache::CacheError;
use crate::display::{DisplayDriver, DisplayError};
use crate::sync::{SyncEngine, SyncError, SyncReport};

/// Source of refresh ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    async fn tick(&mut self);
}

/// Fixed-period ticker; overrun ticks collapse into one
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// First tick fires one full period from now
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Refreshing,
    RunningDisplay,
}

/// Errors that terminate the loop
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Initial sync failed: {0}")]
    Bootstrap(#[source] SyncError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

pub struct Scheduler<D, T> {
    engine: SyncEngine,
    display: D,
    ticker: T,
    state: SchedulerState,
    cycles: u64,
}

impl<D: DisplayDriver, T: Ticker> Scheduler<D, T> {
    pub fn new(engine: SyncEngine, display: D, ticker: T) -> Self {
        Self {
            engine,
            display,
            ticker,
            state: SchedulerState::Refreshing,
            cycles: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of sync cycles attempted so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[cfg(test)]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Bootstrap, then refresh on every tick until a fatal error
    pub async fn run(&mut self) -> Result<(), SchedulerError> {
        self.bootstrap().await?;
        loop {
            self.ticker.tick().await;
            self.refresh().await?;
        }
    }

    /// Initial sync and display; any sync failure here is fatal
    pub async fn bootstrap(&mut self) -> Result<SyncReport, SchedulerError> {
        info!("Running initial sync");
        self.state = SchedulerState::Refreshing;
        self.cycles += 1;
        let report = self
            .engine
            .run_cycle()
            .await
            .map_err(SchedulerError::Bootstrap)?;
        self.show().await?;
        Ok(report)
    }

    /// Stop, sync, restart. A failed sync keeps the current cache on screen.
    pub async fn refresh(&mut self) -> Result<Option<SyncReport>, SchedulerError> {
        info!(cycle = self.cycles + 1, "Refreshing slideshow");
        self.display.stop().await;
        self.state = SchedulerState::Refreshing;
        self.cycles += 1;

        let report = match self.engine.run_cycle().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, "Sync cycle failed, showing existing cache");
                None
            }
        };

        self.show().await?;
        Ok(report)
    }

    /// Stop the display on shutdown
    pub async fn shutdown(&mut self) {
        self.display.stop().await;
        self.state = SchedulerState::Refreshing;
    }

    async fn show(&mut self) -> Result<(), SchedulerError> {
        let paths = self.engine.cache().list_paths()?;
        self.display.start(&paths).await?;
        self.state = SchedulerState::RunningDisplay;
        Ok(())
    }
}

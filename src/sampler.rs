//! Acquisition timing loop
//!
//! Starts the source, counts samples until the window target is reached,
//! reports the elapsed time, stops the source and drains whatever it still
//! holds before starting the next window.
//!
//! Polling is a deliberate busy-wait: the loop never sleeps or yields while
//! Running or Draining, so it expects to own its core (pinned, max priority).
//! Replacing the spin with a blocking/yielding read changes what is measured.

use std::convert::Infallible;

use thiserror::Error;

use crate::clock::MonotonicClock;
use crate::config::SamplerConfig;
use crate::report::{ReportSink, WindowReport};
use crate::source::{AcquisitionSource, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Stopped,
    Running,
    Draining,
}

#[derive(Error, Debug)]
pub enum SamplerError<E> {
    /// The source could not be started - nothing can be measured
    #[error("Failed to start acquisition source: {0}")]
    Start(E),
}

/// Samples thrown away after the stop command
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub polls: usize,
    pub discarded: usize,
}

pub struct AcquisitionLoop<S: AcquisitionSource, C, R> {
    source: S,
    clock: C,
    sink: R,
    batch: Vec<S::Sample>,
    sample_count: usize,
    sample_freq_hz: u32,
    state: AcquisitionState,
    windows: usize,
    last_drain: DrainStats,
}

impl<S, C, R> AcquisitionLoop<S, C, R>
where
    S: AcquisitionSource,
    C: MonotonicClock,
    R: ReportSink,
{
    pub fn new(source: S, clock: C, sink: R, config: &SamplerConfig) -> Self {
        Self {
            source,
            clock,
            sink,
            // Allocated once and reused for every poll
            batch: vec![S::Sample::default(); config.batch_capacity.max(1)],
            sample_count: config.sample_count,
            sample_freq_hz: config.sample_freq_hz,
            state: AcquisitionState::Stopped,
            windows: 0,
            last_drain: DrainStats::default(),
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Completed windows
    pub fn windows(&self) -> usize {
        self.windows
    }

    pub fn last_drain(&self) -> DrainStats {
        self.last_drain
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Measure windows forever. Only returns if the source fails to start.
    pub fn run(&mut self) -> Result<Infallible, SamplerError<S::Error>> {
        loop {
            self.run_window()?;
        }
    }

    /// One full cycle: Stopped -> Running -> Draining -> Stopped
    pub fn run_window(&mut self) -> Result<WindowReport, SamplerError<S::Error>> {
        let start_us = self.start()?;
        let (collected, poll_errors, end_us) = self.measure();

        let report = WindowReport {
            target_samples: self.sample_count,
            collected,
            frequency_hz: self.sample_freq_hz,
            start_us,
            end_us,
            poll_errors,
        };
        if poll_errors > 0 {
            log::debug!("Window {}: {poll_errors} poll errors retried", self.windows);
        }
        self.sink.emit(&report);

        self.stop();
        self.last_drain = self.drain();
        log::debug!(
            "Window {}: drained {} samples in {} polls",
            self.windows,
            self.last_drain.discarded,
            self.last_drain.polls
        );

        self.state = AcquisitionState::Stopped;
        self.windows += 1;
        Ok(report)
    }

    fn start(&mut self) -> Result<u64, SamplerError<S::Error>> {
        self.source.start().map_err(SamplerError::Start)?;
        let start_us = self.clock.now_us();
        self.state = AcquisitionState::Running;
        Ok(start_us)
    }

    // Returns (samples counted, poll errors, threshold timestamp)
    fn measure(&mut self) -> (usize, usize, u64) {
        let mut count = 0_usize;
        let mut errors = 0_usize;
        loop {
            match self.source.poll(&mut self.batch) {
                Ok(Poll::Ready(n)) => {
                    debug_assert!(n <= self.batch.len());
                    count += n;
                    if count >= self.sample_count {
                        // Timestamp before anything else so reporting doesn't skew it
                        return (count, errors, self.clock.now_us());
                    }
                }
                Ok(Poll::Empty) => {}
                // Transient - retry straight away
                Err(_) => errors += 1,
            }
        }
    }

    fn stop(&mut self) {
        self.state = AcquisitionState::Draining;
        // Drain picks up the stopped state once the command takes effect
        if let Err(e) = self.source.stop() {
            log::warn!("Failed to stop acquisition source: {e}");
        }
    }

    // Unbounded: a source that never empties keeps us here
    fn drain(&mut self) -> DrainStats {
        let mut stats = DrainStats::default();
        loop {
            stats.polls += 1;
            match self.source.poll(&mut self.batch) {
                Ok(Poll::Ready(n)) => stats.discarded += n,
                Ok(Poll::Empty) | Err(_) => return stats,
            }
        }
    }
}

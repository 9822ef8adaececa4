use std::sync::mpsc;

/// Result of one measurement window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    pub target_samples: usize,
    /// Samples actually counted when the threshold was crossed (>= target)
    pub collected: usize,
    pub frequency_hz: u32,
    /// Clock reading just after the source was started
    pub start_us: u64,
    /// Clock reading at the poll that crossed the threshold
    pub end_us: u64,
    /// Transient poll errors retried during the window
    pub poll_errors: usize,
}

impl WindowReport {
    pub fn elapsed_us(&self) -> u64 {
        self.end_us.saturating_sub(self.start_us)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_us() as f64 / 1e6
    }

    pub fn expected_seconds(&self) -> f64 {
        self.target_samples as f64 / self.frequency_hz as f64
    }

    /// Measured sample rate over the window
    pub fn achieved_hz(&self) -> f64 {
        self.collected as f64 / self.elapsed_seconds()
    }
}

impl std::fmt::Display for WindowReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Taking {} samples @ {}Hz took {:.6}s instead of {:.6}s",
            self.target_samples,
            self.frequency_hz,
            self.elapsed_seconds(),
            self.expected_seconds()
        )
    }
}

/// Destination for completed window reports.
///
/// Called from the sampling loop between threshold crossing and stop, so
/// implementations should return promptly.
pub trait ReportSink {
    fn emit(&mut self, report: &WindowReport);
}

impl<F> ReportSink for F
where
    F: FnMut(&WindowReport),
{
    fn emit(&mut self, report: &WindowReport) {
        self(report)
    }
}

/// Forward reports to another thread (unbounded - never blocks the sampler)
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::Sender<WindowReport>);

impl ReportSink for ChannelSink {
    fn emit(&mut self, report: &WindowReport) {
        if let Err(e) = self.0.send(report.clone()) {
            log::warn!("Report dropped (receiver gone): {}", e.0);
        }
    }
}

/// Print the report line in place
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, report: &WindowReport) {
        println!("{report}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(elapsed_us: u64) -> WindowReport {
        WindowReport {
            target_samples: 100_000,
            collected: 100_096,
            frequency_hz: 10_000,
            start_us: 1_000,
            end_us: 1_000 + elapsed_us,
            poll_errors: 0,
        }
    }

    #[test]
    fn line_format() {
        assert_eq!(
            report(10_012_345).to_string(),
            "Taking 100000 samples @ 10000Hz took 10.012345s instead of 10.000000s"
        );
    }

    #[test]
    fn seconds() {
        let r = report(2_500_000);
        assert_eq!(r.elapsed_seconds(), 2.5);
        assert_eq!(r.expected_seconds(), 10.0);
        assert!((r.achieved_hz() - 40_038.4).abs() < 1e-6);
    }

    #[test]
    fn channel_sink_forwards() {
        let (tx, rx) = mpsc::channel();
        ChannelSink(tx).emit(&report(1));
        assert_eq!(rx.try_recv().unwrap(), report(1));
    }

    #[test]
    fn channel_sink_ignores_disconnected_receiver() {
        let (tx, rx) = mpsc::channel::<WindowReport>();
        drop(rx);
        ChannelSink(tx).emit(&report(1));
    }

    #[test]
    fn stdout_sink() {
        StdoutSink.emit(&report(1));
    }

    #[test]
    fn closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |r: &WindowReport| seen.push(r.elapsed_us());
        sink.emit(&report(7));
        sink.emit(&report(8));
        assert_eq!(seen, vec![7, 8]);
    }
}

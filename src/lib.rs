pub mod clock;
pub mod config;
pub mod report;
pub mod sampler;
pub mod source;

#[cfg(target_os = "espidf")]
pub mod adc;
#[cfg(target_os = "espidf")]
pub mod nvs;

pub use clock::{InstantClock, MonotonicClock};
pub use config::SamplerConfig;
pub use report::{ChannelSink, ReportSink, StdoutSink, WindowReport};
pub use sampler::{AcquisitionLoop, AcquisitionState, SamplerError};
pub use source::{AcquisitionSource, Poll};

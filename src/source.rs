use std::fmt::{Debug, Display};

/// Outcome of a non-blocking poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// `n` samples were written to the front of the batch
    Ready(usize),
    /// Nothing available right now (or the source has been stopped and is empty)
    Empty,
}

/// Streaming sampling peripheral that can be started, polled and stopped.
///
/// The handle is owned by a single caller. After `stop()` the source may still
/// hand out buffered samples until it reports `Poll::Empty`.
pub trait AcquisitionSource {
    type Sample: Copy + Default;
    type Error: Debug + Display;

    fn start(&mut self) -> Result<(), Self::Error>;

    /// Must return immediately. `Poll::Ready(n)` implies `0 < n <= batch.len()`.
    fn poll(&mut self, batch: &mut [Self::Sample]) -> Result<Poll, Self::Error>;

    fn stop(&mut self) -> Result<(), Self::Error>;
}

impl<S: AcquisitionSource + ?Sized> AcquisitionSource for &mut S {
    type Sample = S::Sample;
    type Error = S::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        (**self).start()
    }

    fn poll(&mut self, batch: &mut [Self::Sample]) -> Result<Poll, Self::Error> {
        (**self).poll(batch)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        (**self).stop()
    }
}

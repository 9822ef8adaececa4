use std::time::Instant;

/// Microsecond resolution monotonic time source
pub trait MonotonicClock {
    fn now_us(&self) -> u64;
}

/// Clock backed by `std::time::Instant` (esp_timer on ESP-IDF)
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for InstantClock {
    fn now_us(&self) -> u64 {
        // u64 micros covers ~584k years
        self.origin.elapsed().as_micros() as u64
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn instant_clock_is_monotonic() {
        let clock = InstantClock::new();
        let a = clock.now_us();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.now_us();
        assert!(b >= a + 2_000, "{a} -> {b}");
    }
}

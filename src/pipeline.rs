use anyhow::Result;

/// A timestamped item flowing from one stage to the next. Errors travel in
/// the stream so that the sink can report them where they happened.
pub type Event<T> = (f64, Result<T>);

/// Converts sniffer clock cycles into seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    freq: f64,
}

impl Timebase {
    pub const ULPI_CLOCK: f64 = 60_000_000.;

    pub fn new(mut freq: f64) -> Self {
        if !(freq > 0.) {
            freq = 1.;
        }
        Self { freq }
    }

    /// Rejects frequencies that cannot time a capture instead of falling back
    /// to counting cycles.
    pub fn try_new(freq: f64) -> Result<Self> {
        anyhow::ensure!(
            freq.is_finite() && freq > 0.,
            "Invalid clock frequency {}, expected a positive number of Hz",
            freq
        );
        Ok(Self { freq })
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    pub fn seconds(&self, cycles: u64) -> f64 {
        cycles as f64 / self.freq // lossy conversion from u64 to f64
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::new(Self::ULPI_CLOCK)
    }
}

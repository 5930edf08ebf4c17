/// Fires once every `period` ticks of a base event.
///
/// The counter resets when it fires rather than running free, so after `n` ticks the divider
/// has fired `n / period` times and holds `n % period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDivider {
    period: u32,
    count: u32,
}

impl RateDivider {
    /// Construct a divider with the given period.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub const fn new(period: u32) -> Self {
        assert!(period > 0, "rate divider period must be non-zero");
        Self { period, count: 0 }
    }

    /// Count one base tick. Returns `true` when the derived event should fire.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count % self.period == 0 {
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Ticks counted since the divider last fired.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Zero the counter.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

//! Driver configuration

/// Prescaler reload that divides a 32.768 kHz LSE down to a 1 Hz tick
pub const DEFAULT_PRESCALER_RELOAD: u32 = 0x7FFF;

/// The prescaler reload register is 20 bits wide
const PRESCALER_RELOAD_MASK: u32 = 0x000F_FFFF;

/// RTC driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcConfig {
    /// Prescaler reload value programmed during bring-up
    ///
    /// The counter ticks once every `prescaler_reload + 1` RTC clock cycles.
    /// Also used to turn the divider countdown into milliseconds.
    pub prescaler_reload: u32,
}

impl RtcConfig {
    /// Configuration for a 32.768 kHz crystal and a 1 Hz counter
    pub const fn new() -> Self {
        Self {
            prescaler_reload: DEFAULT_PRESCALER_RELOAD,
        }
    }

    /// Override the prescaler reload, truncated to the register width
    pub const fn with_prescaler_reload(mut self, reload: u32) -> Self {
        self.prescaler_reload = reload & PRESCALER_RELOAD_MASK;
        self
    }
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! RTC driver
//!
//! [`Rtc`] owns a register port and the interrupt handler table. The driver
//! is split by concern:
//! - `clock`: one-time bring-up of the backup domain and the LSE
//! - `counter`: counter, alarm and sub-second reads and writes
//! - `interrupt`: handler registration and the shared interrupt dispatcher
//! - `backup`: the battery-backed data registers
//!
//! Every hardware wait is an unbounded spin on a status bit. A peripheral
//! that never responds (for example a board without a 32.768 kHz crystal)
//! blocks the caller forever.

mod backup;
mod clock;
mod counter;
mod interrupt;

use core::cell::RefCell;

use critical_section::Mutex;
use f1_rtc_hal::rtc::{CRL_ALRF, CRL_CNF, CRL_OWF, CRL_RSF, CRL_RTOFF, CRL_SECF};
use f1_rtc_hal::RtcPort;

use crate::config::RtcConfig;

pub use interrupt::{Handler, InterruptKind};

/// Backup slot holding the driver's own state
pub const INIT_SLOT: u8 = 1;
/// Bit in [`INIT_SLOT`] recording a completed bring-up
pub const INIT_FLAG: u16 = 1 << 0;

/// Word offset of [`INIT_SLOT`], the same on every backup layout
const INIT_WORD: usize = 1;

/// CRL bits that are cleared by writing 0. Writing 1 leaves them alone.
const WRITE_ZERO_TO_CLEAR: u16 = CRL_SECF | CRL_ALRF | CRL_OWF | CRL_RSF;

/// STM32F1 RTC driver
pub struct Rtc<P: RtcPort> {
    port: P,
    config: RtcConfig,
    /// Only reachable through `&mut self`; on target the RTIC shared-resource
    /// lock around the driver is what keeps the interrupt out.
    handlers: Mutex<RefCell<[Option<Handler>; InterruptKind::COUNT]>>,
}

impl<P: RtcPort> Rtc<P> {
    /// Driver with the default configuration (32.768 kHz LSE, 1 Hz counter)
    pub fn new(port: P) -> Self {
        Self::with_config(port, RtcConfig::default())
    }

    pub fn with_config(port: P, config: RtcConfig) -> Self {
        Self {
            port,
            config,
            handlers: Mutex::new(RefCell::new([None; InterruptKind::COUNT])),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Direct register access, bypassing the driver's sequencing
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Spin until the last write to the RTC registers has completed
    fn wait_finished(&mut self) {
        while self.port.crl() & CRL_RTOFF == 0 {
            core::hint::spin_loop();
        }
    }

    fn enter_config_mode(&mut self) {
        self.port.set_crl(WRITE_ZERO_TO_CLEAR | CRL_CNF);
    }

    fn exit_config_mode(&mut self) {
        self.port.set_crl(WRITE_ZERO_TO_CLEAR);
    }

    /// Clear the given clear-by-zero flags, keeping CNF as it is
    fn clear_flags(&mut self, flags: u16) {
        let cnf = self.port.crl() & CRL_CNF;
        self.port.set_crl((WRITE_ZERO_TO_CLEAR & !flags) | cnf);
    }
}

#[cfg(test)]
mod tests {
    use f1_rtc_hal::sim::{Access, SimPort};

    use super::*;

    #[test]
    fn test_clear_flags_leaves_other_flags_pending() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        rtc.port_mut().raise(CRL_SECF | CRL_ALRF | CRL_OWF);
        rtc.clear_flags(CRL_ALRF);
        assert_eq!(rtc.port().flags() & (CRL_SECF | CRL_ALRF | CRL_OWF), CRL_SECF | CRL_OWF);
    }

    #[test]
    fn test_clear_flags_keeps_config_mode() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        rtc.enter_config_mode();
        rtc.clear_flags(CRL_SECF);
        assert!(rtc.port().in_config_mode());
        rtc.exit_config_mode();
        assert!(!rtc.port().in_config_mode());
    }

    #[test]
    fn test_wait_finished_polls_until_rtoff() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        rtc.port_mut().set_busy_polls(5);
        rtc.enter_config_mode();
        rtc.exit_config_mode();
        rtc.wait_finished();
        assert_eq!(rtc.port_mut().crl() & CRL_RTOFF, CRL_RTOFF);
        assert_eq!(
            rtc.port().log(),
            &[
                Access::Crl(WRITE_ZERO_TO_CLEAR | CRL_CNF),
                Access::Crl(WRITE_ZERO_TO_CLEAR)
            ]
        );
    }
}

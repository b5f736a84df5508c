//! Interrupt handler table and dispatch
//!
//! The three RTC interrupt sources share one interrupt line. Each source has
//! one handler slot; attaching replaces the previous handler. The table is
//! only mutated inside a critical section together with the enable bit and
//! the line mask, so the dispatcher never sees an enabled source whose
//! handler is half installed.

use f1_rtc_hal::rtc::{CRH_ALRIE, CRH_OWIE, CRH_SECIE, CRL_ALRF, CRL_OWF, CRL_SECF, IRQ_MASK};
use f1_rtc_hal::RtcPort;

use super::Rtc;

/// Interrupt handler. Runs in interrupt context and must not call back into
/// the driver.
pub type Handler = fn();

/// RTC interrupt sources, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptKind {
    /// Counter incremented
    Second,
    /// Counter reached the alarm value
    Alarm,
    /// Counter wrapped to zero
    Overflow,
}

impl InterruptKind {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::Second, Self::Alarm, Self::Overflow];

    /// Enable bit in CRH
    pub const fn enable_bit(self) -> u16 {
        match self {
            Self::Second => CRH_SECIE,
            Self::Alarm => CRH_ALRIE,
            Self::Overflow => CRH_OWIE,
        }
    }

    /// Pending flag in CRL
    pub const fn flag(self) -> u16 {
        match self {
            Self::Second => CRL_SECF,
            Self::Alarm => CRL_ALRF,
            Self::Overflow => CRL_OWF,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl<P: RtcPort> Rtc<P> {
    /// Install `handler` for `kind`, enable the source and unmask the line
    pub fn attach_interrupt(&mut self, kind: InterruptKind, handler: Handler) {
        self.wait_finished();
        critical_section::with(|cs| {
            self.handlers.borrow_ref_mut(cs)[kind.slot()] = Some(handler);
            let enables = self.port.crh();
            self.port.set_crh(enables | kind.enable_bit());
            self.port.unmask_interrupt();
        });
        debug!("RTC: {} interrupt attached", kind);
    }

    /// Disable `kind` and drop its handler
    ///
    /// The line is masked first. It is unmasked again if another source is
    /// still enabled.
    pub fn detach_interrupt(&mut self, kind: InterruptKind) {
        self.port.mask_interrupt();
        self.wait_finished();
        critical_section::with(|cs| {
            let enables = self.port.crh() & !kind.enable_bit();
            self.port.set_crh(enables);
            self.handlers.borrow_ref_mut(cs)[kind.slot()] = None;
            if enables & IRQ_MASK != 0 {
                self.port.unmask_interrupt();
            }
        });
        debug!("RTC: {} interrupt detached", kind);
    }

    /// Whether a handler is installed for `kind`
    pub fn is_interrupt_attached(&self, kind: InterruptKind) -> bool {
        critical_section::with(|cs| self.handlers.borrow_ref(cs)[kind.slot()].is_some())
    }

    /// Shared RTC interrupt service routine
    ///
    /// Runs the handler of every source that is both pending and enabled, in
    /// [`InterruptKind::ALL`] order, then clears exactly those flags. Flags
    /// of disabled sources stay pending.
    pub fn on_interrupt(&mut self) {
        let pending = self.port.crh() & self.port.crl() & IRQ_MASK;
        if pending == 0 {
            return;
        }
        let handlers = critical_section::with(|cs| *self.handlers.borrow_ref(cs));
        for kind in InterruptKind::ALL {
            if pending & kind.flag() == 0 {
                continue;
            }
            if let Some(handler) = handlers[kind.slot()] {
                handler();
            }
        }
        self.wait_finished();
        self.clear_flags(pending);
    }

    /// The counter ticked since the second flag was last cleared
    pub fn is_counter_updated(&mut self) -> bool {
        self.port.crl() & CRL_SECF != 0
    }

    /// The counter reached the alarm value
    pub fn is_alarm_triggered(&mut self) -> bool {
        self.port.crl() & CRL_ALRF != 0
    }

    /// The counter wrapped
    pub fn is_counter_overflow(&mut self) -> bool {
        self.port.crl() & CRL_OWF != 0
    }

    pub fn clear_second_flag(&mut self) {
        self.wait_finished();
        self.clear_flags(CRL_SECF);
    }

    pub fn clear_alarm_flag(&mut self) {
        self.wait_finished();
        self.clear_flags(CRL_ALRF);
    }

    pub fn clear_overflow_flag(&mut self) {
        self.wait_finished();
        self.clear_flags(CRL_OWF);
    }
}

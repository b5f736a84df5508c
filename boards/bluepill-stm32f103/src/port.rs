//! Hardware RTC port over the STM32F1 peripheral access crate
//!
//! This module is the **ONLY** place in the firmware that uses `unsafe`:
//! - the backup data words are addressed by offset from the BKP base, since
//!   the register map of the extended parts has a gap after DR10
//! - unmasking an NVIC line can break critical sections that rely on the
//!   line being masked
//!
//! Every other module keeps `#![deny(unsafe_code)]`.

#![allow(unsafe_code)]

use cortex_m::peripheral::NVIC;
use f1_rtc_hal::{BackupLayout, RtcPort};
use stm32_metapac::rcc::vals::Rtcsel;
use stm32_metapac::rtc::regs;
use stm32_metapac::{Interrupt, BKP, PWR, RCC, RTC};

/// RTC, backup domain and RTC interrupt line of this chip
///
/// Only one instance may exist; the driver assumes exclusive register access.
pub struct MetapacPort {
    _private: (),
}

impl MetapacPort {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn backup_word(word: usize) -> *mut u32 {
        (BKP.as_ptr() as *mut u32).wrapping_add(word)
    }
}

impl RtcPort for MetapacPort {
    #[cfg(not(feature = "high-density"))]
    const BACKUP_LAYOUT: BackupLayout = BackupLayout::Base;
    #[cfg(feature = "high-density")]
    const BACKUP_LAYOUT: BackupLayout = BackupLayout::Extended;

    fn crh(&mut self) -> u16 {
        RTC.crh().read().0 as u16
    }

    fn set_crh(&mut self, value: u16) {
        RTC.crh().write_value(regs::Crh(u32::from(value)));
    }

    fn crl(&mut self) -> u16 {
        RTC.crl().read().0 as u16
    }

    fn set_crl(&mut self, value: u16) {
        RTC.crl().write_value(regs::Crl(u32::from(value)));
    }

    fn set_prlh(&mut self, value: u16) {
        RTC.prlh().write_value(regs::Prlh(u32::from(value)));
    }

    fn set_prll(&mut self, value: u16) {
        RTC.prll().write_value(regs::Prll(u32::from(value)));
    }

    fn divh(&mut self) -> u16 {
        RTC.divh().read().0 as u16
    }

    fn divl(&mut self) -> u16 {
        RTC.divl().read().0 as u16
    }

    fn cnth(&mut self) -> u16 {
        RTC.cnth().read().0 as u16
    }

    fn cntl(&mut self) -> u16 {
        RTC.cntl().read().0 as u16
    }

    fn set_cnth(&mut self, value: u16) {
        RTC.cnth().write_value(regs::Cnth(u32::from(value)));
    }

    fn set_cntl(&mut self, value: u16) {
        RTC.cntl().write_value(regs::Cntl(u32::from(value)));
    }

    fn set_alrh(&mut self, value: u16) {
        RTC.alrh().write_value(regs::Alrh(u32::from(value)));
    }

    fn set_alrl(&mut self, value: u16) {
        RTC.alrl().write_value(regs::Alrl(u32::from(value)));
    }

    fn backup_data(&mut self, word: usize) -> u16 {
        if word >= Self::BACKUP_LAYOUT.words() {
            return 0;
        }
        // SAFETY: `word` is inside the BKP block of this part, and the
        // data registers are plain 32-bit words with the value in the low half.
        unsafe { Self::backup_word(word).read_volatile() as u16 }
    }

    fn set_backup_data(&mut self, word: usize, value: u16) {
        if word >= Self::BACKUP_LAYOUT.words() {
            return;
        }
        // SAFETY: as in `backup_data`
        unsafe { Self::backup_word(word).write_volatile(u32::from(value)) }
    }

    fn enable_clock_interface(&mut self) {
        RCC.apb1enr().modify(|w| {
            w.set_pwren(true);
            w.set_bkpen(true);
        });
    }

    fn set_backup_writes(&mut self, enabled: bool) {
        PWR.cr().modify(|w| w.set_dbp(enabled));
    }

    fn set_backup_domain_reset(&mut self, asserted: bool) {
        RCC.bdcr().modify(|w| w.set_bdrst(asserted));
    }

    fn enable_lse(&mut self) {
        RCC.bdcr().modify(|w| w.set_lseon(true));
    }

    fn lse_ready(&mut self) -> bool {
        RCC.bdcr().read().lserdy()
    }

    fn select_lse_clock(&mut self) {
        RCC.bdcr().modify(|w| w.set_rtcsel(Rtcsel::LSE));
    }

    fn enable_rtc_clock(&mut self) {
        RCC.bdcr().modify(|w| w.set_rtcen(true));
    }

    fn unmask_interrupt(&mut self) {
        // SAFETY: the RTC line is not used to guard any critical section
        unsafe { NVIC::unmask(Interrupt::RTC) }
    }

    fn mask_interrupt(&mut self) {
        NVIC::mask(Interrupt::RTC);
    }
}

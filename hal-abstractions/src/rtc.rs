//! RTC register port
//!
//! Field-level access to the RTC block (CRH/CRL, prescaler, divider, counter,
//! alarm), the backup data registers, and the few controller bits that gate
//! them: the PWR/BKP bus clocks, the backup-domain write protection (PWR_CR
//! DBP), the backup domain control register (RCC_BDCR) and the RTC line of the
//! interrupt controller.
//!
//! Every accessor takes `&mut self`, the same convention embedded-hal 1.0
//! uses for pin reads: a read may have side effects on the simulated port and
//! the driver owns the port exclusively anyway.

/// Second interrupt enable (RTC_CRH)
pub const CRH_SECIE: u16 = 1 << 0;
/// Alarm interrupt enable (RTC_CRH)
pub const CRH_ALRIE: u16 = 1 << 1;
/// Overflow interrupt enable (RTC_CRH)
pub const CRH_OWIE: u16 = 1 << 2;

/// Second flag (RTC_CRL, cleared by writing 0)
pub const CRL_SECF: u16 = 1 << 0;
/// Alarm flag (RTC_CRL, cleared by writing 0)
pub const CRL_ALRF: u16 = 1 << 1;
/// Overflow flag (RTC_CRL, cleared by writing 0)
pub const CRL_OWF: u16 = 1 << 2;
/// Registers synchronized flag (RTC_CRL, cleared by writing 0)
pub const CRL_RSF: u16 = 1 << 3;
/// Configuration flag (RTC_CRL)
pub const CRL_CNF: u16 = 1 << 4;
/// RTC operation off, read-only: 1 when the last write has completed
pub const CRL_RTOFF: u16 = 1 << 5;

/// Interrupt bits. Enables in CRH and pending flags in CRL share positions.
pub const IRQ_MASK: u16 = CRL_SECF | CRL_ALRF | CRL_OWF;

/// Reset value of the backup domain prescaler reload register
pub const PRL_RESET: u32 = 0x8000;

/// Backup data register map of the part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackupLayout {
    /// Low and medium density devices: DR1..DR10
    Base,
    /// High density and connectivity line devices: DR1..DR42. DR11 onwards
    /// sits after the RTCCR/CR/CSR words, five words past DR10.
    Extended,
}

impl BackupLayout {
    /// Number of usable 16-bit slots
    pub const fn capacity(self) -> u8 {
        match self {
            Self::Base => 10,
            Self::Extended => 42,
        }
    }

    /// Number of 32-bit words from the BKP base that the port must cover
    pub const fn words(self) -> usize {
        match self {
            Self::Base => 11,
            Self::Extended => 48,
        }
    }

    /// Map a logical slot index to its word offset from the BKP base
    ///
    /// Returns `None` for slot 0 and for anything past the last slot.
    pub const fn word_offset(self, index: u8) -> Option<usize> {
        let index = index as usize;
        let (word, last) = match self {
            Self::Base => (index, 10),
            Self::Extended if index > 10 => (index + 5, 47),
            Self::Extended => (index, 47),
        };
        if word >= 1 && word <= last {
            Some(word)
        } else {
            None
        }
    }
}

/// Register-level access to the RTC and its backup domain
pub trait RtcPort {
    /// Backup register map of this port
    const BACKUP_LAYOUT: BackupLayout;

    /// Read RTC_CRH
    fn crh(&mut self) -> u16;
    /// Write RTC_CRH
    fn set_crh(&mut self, value: u16);
    /// Read RTC_CRL
    fn crl(&mut self) -> u16;
    /// Write RTC_CRL
    fn set_crl(&mut self, value: u16);

    /// Write the upper 4 bits of the prescaler reload value
    fn set_prlh(&mut self, value: u16);
    /// Write the lower 16 bits of the prescaler reload value
    fn set_prll(&mut self, value: u16);
    /// Read the upper 4 bits of the prescaler divider countdown
    fn divh(&mut self) -> u16;
    /// Read the lower 16 bits of the prescaler divider countdown
    fn divl(&mut self) -> u16;

    /// Read the high half of the counter
    fn cnth(&mut self) -> u16;
    /// Read the low half of the counter
    fn cntl(&mut self) -> u16;
    /// Write the high half of the counter (configuration mode only)
    fn set_cnth(&mut self, value: u16);
    /// Write the low half of the counter (configuration mode only)
    fn set_cntl(&mut self, value: u16);
    /// Write the high half of the alarm (configuration mode only)
    fn set_alrh(&mut self, value: u16);
    /// Write the low half of the alarm (configuration mode only)
    fn set_alrl(&mut self, value: u16);

    /// Read a backup data word at `word` offset from the BKP base
    fn backup_data(&mut self, word: usize) -> u16;
    /// Write a backup data word at `word` offset from the BKP base
    fn set_backup_data(&mut self, word: usize, value: u16);

    /// Enable the PWR and BKP bus clocks
    fn enable_clock_interface(&mut self);
    /// Toggle write access to the backup domain (PWR_CR DBP)
    fn set_backup_writes(&mut self, enabled: bool);
    /// Assert or release the backup domain software reset
    fn set_backup_domain_reset(&mut self, asserted: bool);
    /// Switch on the 32.768 kHz external oscillator
    fn enable_lse(&mut self);
    /// Whether the external oscillator reports ready
    fn lse_ready(&mut self) -> bool;
    /// Select the external oscillator as the RTC clock
    fn select_lse_clock(&mut self);
    /// Enable the RTC clock
    fn enable_rtc_clock(&mut self);

    /// Unmask the RTC global interrupt line
    fn unmask_interrupt(&mut self);
    /// Mask the RTC global interrupt line
    fn mask_interrupt(&mut self);
}

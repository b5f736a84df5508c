//! Simulated RTC register port
//!
//! A software model of the RTC and backup domain, good enough to run the
//! driver's sequencing and calendar logic on the host:
//! - PRL/CNT/ALR writes land only with backup writes enabled and CNF set
//! - BDCR and backup data writes land only with backup writes enabled
//! - backup data reads as 0 and ignores writes while the PWR/BKP bus clocks
//!   are off
//! - SECF/ALRF/OWF/RSF are cleared by writing 0, writing 1 has no effect
//! - leaving configuration mode holds RTOFF low for a configurable number of
//!   CRL polls, clearing RSF sets it again after a configurable number of
//!   polls once the clock is running
//! - the counter can be advanced between half-word reads to provoke a
//!   rollover in the middle of a read
//!
//! Writes and controller operations are recorded in an ordered access log.

use heapless::Vec;

use crate::rtc::{
    BackupLayout, RtcPort, CRL_ALRF, CRL_CNF, CRL_OWF, CRL_RSF, CRL_RTOFF, CRL_SECF, IRQ_MASK,
    PRL_RESET,
};

/// Capacity of the access log
pub const LOG_CAPACITY: usize = 64;

const WRITE_ZERO_TO_CLEAR: u16 = CRL_SECF | CRL_ALRF | CRL_OWF | CRL_RSF;
const BACKUP_WORDS: usize = 48;

/// One recorded register write or controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Crh(u16),
    Crl(u16),
    Prlh(u16),
    Prll(u16),
    Cnth(u16),
    Cntl(u16),
    Alrh(u16),
    Alrl(u16),
    BackupData { word: usize, value: u16 },
    ClockInterface,
    BackupWrites(bool),
    BackupDomainReset(bool),
    LseOn,
    LseClockSelected,
    RtcClockEnabled,
    Unmask,
    Mask,
}

/// When to advance the counter during a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadHook {
    AfterHigh(u32),
    AfterLow(u32),
}

/// Simulated port. `EXTENDED` selects the high density backup layout.
#[derive(Debug)]
pub struct SimPort<const EXTENDED: bool = false> {
    crh: u16,
    flags: u16,
    config_mode: bool,
    busy_polls: u32,
    busy_after_config: u32,
    resync: Option<u32>,
    sync_polls: u32,
    prescaler: u32,
    divider: u32,
    counter: u32,
    alarm: u32,
    backup: [u16; BACKUP_WORDS],
    clock_interface: bool,
    backup_writes: bool,
    lse_on: bool,
    lse_wait: u32,
    lse_startup_polls: u32,
    lse_selected: bool,
    rtc_enabled: bool,
    line_unmasked: bool,
    read_hook: Option<ReadHook>,
    log: Vec<Access, LOG_CAPACITY>,
}

/// Simulated port with the high density backup layout
pub type ExtendedSimPort = SimPort<true>;

impl<const EXTENDED: bool> SimPort<EXTENDED> {
    /// A backup domain straight after its first power-up: nothing configured
    pub fn new() -> Self {
        Self {
            crh: 0,
            flags: 0,
            config_mode: false,
            busy_polls: 0,
            busy_after_config: 2,
            resync: None,
            sync_polls: 2,
            prescaler: PRL_RESET,
            divider: PRL_RESET,
            counter: 0,
            alarm: u32::MAX,
            backup: [0; BACKUP_WORDS],
            clock_interface: false,
            backup_writes: false,
            lse_on: false,
            lse_wait: 0,
            lse_startup_polls: 3,
            lse_selected: false,
            rtc_enabled: false,
            line_unmasked: false,
            read_hook: None,
            log: Vec::new(),
        }
    }

    /// A backup domain that kept running across a reset: clock configured,
    /// prescaler at `prescaler`, slot 1 carrying the init flag. The bus clocks
    /// are off, as after any reset.
    pub fn running(prescaler: u32, counter: u32) -> Self {
        let mut port = Self::new();
        port.lse_on = true;
        port.lse_selected = true;
        port.rtc_enabled = true;
        port.prescaler = prescaler;
        port.divider = prescaler;
        port.counter = counter;
        port.backup[1] = 0x0001;
        port
    }

    /// Number of CRL polls that read RTOFF low after leaving configuration mode
    pub fn set_busy_polls(&mut self, polls: u32) {
        self.busy_after_config = polls;
    }

    /// Number of CRL polls before RSF is set again after being cleared
    pub fn set_sync_polls(&mut self, polls: u32) {
        self.sync_polls = polls;
    }

    /// Number of ready polls before the LSE reports ready
    pub fn set_lse_startup_polls(&mut self, polls: u32) {
        self.lse_startup_polls = polls;
    }

    /// Hardware asserts interrupt flags
    pub fn raise(&mut self, flags: u16) {
        self.flags |= flags & IRQ_MASK;
    }

    /// Let the counter tick by `seconds` right after the next high-half read
    pub fn advance_after_high_read(&mut self, seconds: u32) {
        self.read_hook = Some(ReadHook::AfterHigh(seconds));
    }

    /// Let the counter tick by `seconds` right after the next low-half read
    pub fn advance_after_low_read(&mut self, seconds: u32) {
        self.read_hook = Some(ReadHook::AfterLow(seconds));
    }

    /// Force the prescaler divider countdown
    pub fn load_divider(&mut self, divider: u32) {
        self.divider = divider & 0x000F_FFFF;
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn alarm(&self) -> u32 {
        self.alarm
    }

    pub fn prescaler(&self) -> u32 {
        self.prescaler
    }

    /// Raw CRH as last written
    pub fn enables(&self) -> u16 {
        self.crh
    }

    /// Pending SECF/ALRF/OWF/RSF bits
    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn in_config_mode(&self) -> bool {
        self.config_mode
    }

    pub fn backup_writes_enabled(&self) -> bool {
        self.backup_writes
    }

    pub fn clock_interface_enabled(&self) -> bool {
        self.clock_interface
    }

    pub fn line_unmasked(&self) -> bool {
        self.line_unmasked
    }

    /// The RTC is clocked from a running LSE
    pub fn clock_running(&self) -> bool {
        self.rtc_enabled && self.lse_selected && self.lse_on && self.lse_wait == 0
    }

    /// Backup word as stored, bypassing write protection
    pub fn raw_backup(&self, word: usize) -> u16 {
        self.backup.get(word).copied().unwrap_or(0)
    }

    /// Recorded accesses, oldest first
    pub fn log(&self) -> &[Access] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn record(&mut self, access: Access) {
        // A full log drops the newest entries; tests clear it between phases
        let _ = self.log.push(access);
    }

    fn config_writable(&self) -> bool {
        self.backup_writes && self.config_mode
    }

    fn run_hook(&mut self, high: bool) {
        match self.read_hook {
            Some(ReadHook::AfterHigh(step)) if high => {
                self.counter = self.counter.wrapping_add(step);
                self.read_hook = None;
            }
            Some(ReadHook::AfterLow(step)) if !high => {
                self.counter = self.counter.wrapping_add(step);
                self.read_hook = None;
            }
            _ => {}
        }
    }

    fn reset_domain(&mut self) {
        self.backup = [0; BACKUP_WORDS];
        self.lse_on = false;
        self.lse_selected = false;
        self.rtc_enabled = false;
        self.prescaler = PRL_RESET;
        self.divider = PRL_RESET;
        self.counter = 0;
        self.alarm = u32::MAX;
        self.flags = 0;
        self.resync = None;
    }
}

impl<const EXTENDED: bool> Default for SimPort<EXTENDED> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const EXTENDED: bool> RtcPort for SimPort<EXTENDED> {
    const BACKUP_LAYOUT: BackupLayout = if EXTENDED {
        BackupLayout::Extended
    } else {
        BackupLayout::Base
    };

    fn crh(&mut self) -> u16 {
        self.crh
    }

    fn set_crh(&mut self, value: u16) {
        self.record(Access::Crh(value));
        self.crh = value & IRQ_MASK;
    }

    fn crl(&mut self) -> u16 {
        let rtoff = if self.busy_polls > 0 {
            self.busy_polls -= 1;
            0
        } else {
            CRL_RTOFF
        };
        if let Some(remaining) = self.resync {
            if self.clock_running() {
                if remaining == 0 {
                    self.flags |= CRL_RSF;
                    self.resync = None;
                } else {
                    self.resync = Some(remaining - 1);
                }
            }
        }
        let cnf = if self.config_mode { CRL_CNF } else { 0 };
        self.flags | cnf | rtoff
    }

    fn set_crl(&mut self, value: u16) {
        self.record(Access::Crl(value));
        self.flags &= value | !WRITE_ZERO_TO_CLEAR;
        if value & CRL_RSF == 0 {
            self.resync = Some(self.sync_polls);
        }
        let config_mode = value & CRL_CNF != 0;
        if self.config_mode && !config_mode {
            self.busy_polls = self.busy_after_config;
        }
        self.config_mode = config_mode;
    }

    fn set_prlh(&mut self, value: u16) {
        self.record(Access::Prlh(value));
        if self.config_writable() {
            self.prescaler = (self.prescaler & 0xFFFF) | (u32::from(value & 0x000F) << 16);
        }
    }

    fn set_prll(&mut self, value: u16) {
        self.record(Access::Prll(value));
        if self.config_writable() {
            self.prescaler = (self.prescaler & 0x000F_0000) | u32::from(value);
        }
    }

    fn divh(&mut self) -> u16 {
        ((self.divider >> 16) & 0x000F) as u16
    }

    fn divl(&mut self) -> u16 {
        self.divider as u16
    }

    fn cnth(&mut self) -> u16 {
        let high = (self.counter >> 16) as u16;
        self.run_hook(true);
        high
    }

    fn cntl(&mut self) -> u16 {
        let low = self.counter as u16;
        self.run_hook(false);
        low
    }

    fn set_cnth(&mut self, value: u16) {
        self.record(Access::Cnth(value));
        if self.config_writable() {
            self.counter = (self.counter & 0xFFFF) | (u32::from(value) << 16);
        }
    }

    fn set_cntl(&mut self, value: u16) {
        self.record(Access::Cntl(value));
        if self.config_writable() {
            self.counter = (self.counter & 0xFFFF_0000) | u32::from(value);
        }
    }

    fn set_alrh(&mut self, value: u16) {
        self.record(Access::Alrh(value));
        if self.config_writable() {
            self.alarm = (self.alarm & 0xFFFF) | (u32::from(value) << 16);
        }
    }

    fn set_alrl(&mut self, value: u16) {
        self.record(Access::Alrl(value));
        if self.config_writable() {
            self.alarm = (self.alarm & 0xFFFF_0000) | u32::from(value);
        }
    }

    fn backup_data(&mut self, word: usize) -> u16 {
        if self.clock_interface && word < Self::BACKUP_LAYOUT.words() {
            self.backup[word]
        } else {
            0
        }
    }

    fn set_backup_data(&mut self, word: usize, value: u16) {
        self.record(Access::BackupData { word, value });
        if self.clock_interface && self.backup_writes && word < Self::BACKUP_LAYOUT.words() {
            self.backup[word] = value;
        }
    }

    fn enable_clock_interface(&mut self) {
        self.record(Access::ClockInterface);
        self.clock_interface = true;
    }

    fn set_backup_writes(&mut self, enabled: bool) {
        self.record(Access::BackupWrites(enabled));
        self.backup_writes = enabled;
    }

    fn set_backup_domain_reset(&mut self, asserted: bool) {
        self.record(Access::BackupDomainReset(asserted));
        if asserted && self.backup_writes {
            self.reset_domain();
        }
    }

    fn enable_lse(&mut self) {
        self.record(Access::LseOn);
        if self.backup_writes {
            self.lse_on = true;
            self.lse_wait = self.lse_startup_polls;
        }
    }

    fn lse_ready(&mut self) -> bool {
        if !self.lse_on {
            return false;
        }
        if self.lse_wait > 0 {
            self.lse_wait -= 1;
            return false;
        }
        true
    }

    fn select_lse_clock(&mut self) {
        self.record(Access::LseClockSelected);
        if self.backup_writes {
            self.lse_selected = true;
        }
    }

    fn enable_rtc_clock(&mut self) {
        self.record(Access::RtcClockEnabled);
        if self.backup_writes {
            self.rtc_enabled = true;
        }
    }

    fn unmask_interrupt(&mut self) {
        self.record(Access::Unmask);
        self.line_unmasked = true;
    }

    fn mask_interrupt(&mut self) {
        self.record(Access::Mask);
        self.line_unmasked = false;
    }
}

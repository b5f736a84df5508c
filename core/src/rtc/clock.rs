//! Backup domain and clock source bring-up

use f1_rtc_hal::rtc::CRL_RSF;
use f1_rtc_hal::RtcPort;

use super::{Rtc, INIT_FLAG, INIT_WORD};

impl<P: RtcPort> Rtc<P> {
    /// Bring the RTC up once per backup domain lifetime
    ///
    /// Safe to call on every boot. Returns `true` when the domain was already
    /// initialized, in which case only the register synchronization is
    /// awaited. Otherwise runs [`Rtc::init`] and returns `false`.
    ///
    /// Blocks forever if the LSE never starts.
    pub fn begin(&mut self) -> bool {
        // Backup registers read as zero until the bus clocks are on
        self.enable_clock_interface();
        let initialized = self.is_initialized();
        if initialized {
            debug!("RTC: backup domain already initialized");
            self.wait_sync();
        } else {
            self.init();
        }
        initialized
    }

    /// Full bring-up: reset the backup domain, start the LSE, program the
    /// prescaler and record the init flag
    ///
    /// Erases every backup register and the counter.
    pub fn init(&mut self) {
        info!("RTC: initializing backup domain");
        self.enable_backup_writes();
        self.port.set_backup_domain_reset(true);
        self.port.set_backup_domain_reset(false);

        self.port.enable_lse();
        while !self.port.lse_ready() {
            core::hint::spin_loop();
        }
        debug!("RTC: LSE ready");
        self.port.select_lse_clock();
        self.port.enable_rtc_clock();

        self.wait_sync();
        self.wait_finished();
        self.enter_config_mode();
        let reload = self.config.prescaler_reload;
        self.port.set_prlh(((reload >> 16) & 0x000F) as u16);
        self.port.set_prll(reload as u16);
        self.exit_config_mode();
        self.wait_finished();

        let state = self.port.backup_data(INIT_WORD);
        self.port.set_backup_data(INIT_WORD, state | INIT_FLAG);
        self.disable_backup_writes();
        info!("RTC: running, prescaler reload {=u32:#x}", reload);
    }

    /// Whether the init flag is set in the backup domain
    pub fn is_initialized(&mut self) -> bool {
        self.port.backup_data(INIT_WORD) & INIT_FLAG != 0
    }

    /// Enable the PWR and BKP bus clocks
    pub fn enable_clock_interface(&mut self) {
        self.port.enable_clock_interface();
    }

    /// Clear RSF and spin until the hardware sets it again
    ///
    /// Needed after a reset or a clock change before the counter and flags
    /// can be trusted.
    pub fn wait_sync(&mut self) {
        self.clear_flags(CRL_RSF);
        while self.port.crl() & CRL_RSF == 0 {
            core::hint::spin_loop();
        }
    }

    pub fn enable_backup_writes(&mut self) {
        self.port.set_backup_writes(true);
    }

    pub fn disable_backup_writes(&mut self) {
        self.port.set_backup_writes(false);
    }
}

#[cfg(test)]
mod tests {
    use f1_rtc_hal::rtc::{CRL_ALRF, CRL_CNF, CRL_OWF, CRL_SECF};
    use f1_rtc_hal::sim::{Access, SimPort};

    use crate::config::RtcConfig;
    use crate::rtc::WRITE_ZERO_TO_CLEAR;

    use super::*;

    #[test]
    fn test_first_boot_runs_full_bring_up() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        assert!(!rtc.begin());

        let port = rtc.port();
        assert!(port.clock_running());
        assert_eq!(port.prescaler(), 0x7FFF);
        assert_eq!(port.raw_backup(1) & INIT_FLAG, INIT_FLAG);
        assert!(!port.backup_writes_enabled());
        assert!(!port.in_config_mode());
    }

    #[test]
    fn test_bring_up_sequence() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        rtc.begin();
        assert_eq!(
            rtc.port().log(),
            &[
                Access::ClockInterface,
                Access::BackupWrites(true),
                Access::BackupDomainReset(true),
                Access::BackupDomainReset(false),
                Access::LseOn,
                Access::LseClockSelected,
                Access::RtcClockEnabled,
                Access::Crl(WRITE_ZERO_TO_CLEAR & !CRL_RSF),
                Access::Crl(WRITE_ZERO_TO_CLEAR | CRL_CNF),
                Access::Prlh(0x0000),
                Access::Prll(0x7FFF),
                Access::Crl(WRITE_ZERO_TO_CLEAR),
                Access::BackupData { word: 1, value: INIT_FLAG },
                Access::BackupWrites(false),
            ]
        );
    }

    #[test]
    fn test_second_boot_only_waits_for_sync() {
        let mut rtc = Rtc::new(SimPort::<false>::running(0x7FFF, 1_000));
        assert!(rtc.begin());
        assert_eq!(
            rtc.port().log(),
            &[
                Access::ClockInterface,
                Access::Crl(WRITE_ZERO_TO_CLEAR & !CRL_RSF),
            ]
        );
        assert_eq!(rtc.port().counter(), 1_000);
    }

    #[test]
    fn test_init_flag_reads_clear_until_bus_clock_is_on() {
        let mut rtc = Rtc::new(SimPort::<false>::running(0x7FFF, 5_000));
        assert!(!rtc.port().clock_interface_enabled());
        assert!(!rtc.is_initialized());

        // Reading first would take the full bring-up path and wipe the counter
        assert!(rtc.begin());
        assert!(rtc.port().clock_interface_enabled());
        assert_eq!(rtc.port().counter(), 5_000);
        assert_eq!(rtc.port().log()[0], Access::ClockInterface);
    }

    #[test]
    fn test_bring_up_waits_for_slow_lse() {
        let mut port = SimPort::<false>::new();
        port.set_lse_startup_polls(500);
        let mut rtc = Rtc::new(port);
        assert!(!rtc.begin());
        assert!(rtc.port().clock_running());
        assert!(rtc.is_initialized());

        let log = rtc.port().log();
        let lse_on = log.iter().position(|a| *a == Access::LseOn);
        let selected = log.iter().position(|a| *a == Access::LseClockSelected);
        assert!(lse_on.is_some());
        assert!(lse_on < selected);
    }

    #[test]
    fn test_begin_is_idempotent() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        assert!(!rtc.begin());
        rtc.set_backup_register(2, 0xBEEF);
        assert!(rtc.begin());
        assert!(rtc.begin());
        assert_eq!(rtc.backup_register(2), 0xBEEF);
    }

    #[test]
    fn test_init_flag_is_a_single_bit() {
        let mut rtc = Rtc::new(SimPort::<false>::new());
        rtc.enable_clock_interface();
        rtc.enable_backup_writes();
        rtc.port_mut().set_backup_data(1, 0x0100);
        assert!(!rtc.is_initialized());
        rtc.port_mut().set_backup_data(1, 0x0100 | INIT_FLAG);
        assert!(rtc.is_initialized());
        rtc.disable_backup_writes();
    }

    #[test]
    fn test_init_erases_backup_domain() {
        let mut port = SimPort::<false>::running(0x7FFF, 123_456);
        port.raise(CRL_SECF | CRL_ALRF | CRL_OWF);
        let mut rtc = Rtc::new(port);
        rtc.enable_clock_interface();
        rtc.init();
        assert_eq!(rtc.port().counter(), 0);
        assert_eq!(rtc.port().flags() & (CRL_SECF | CRL_ALRF | CRL_OWF), 0);
        assert!(rtc.is_initialized());
    }

    #[test]
    fn test_custom_prescaler_reload() {
        let config = RtcConfig::new().with_prescaler_reload(0x0001_2345);
        let mut rtc = Rtc::with_config(SimPort::<false>::new(), config);
        rtc.begin();
        assert_eq!(rtc.port().prescaler(), 0x0001_2345);
        assert!(rtc.port().log().contains(&Access::Prlh(0x0001)));
        assert!(rtc.port().log().contains(&Access::Prll(0x2345)));
    }
}

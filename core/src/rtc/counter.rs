//! Counter, alarm and sub-second access

use f1_rtc_hal::RtcPort;

use super::Rtc;
use crate::calendar::{epoch_to_date_time, epoch_to_hijri_date, DateTime, DateVar};

impl<P: RtcPort> Rtc<P> {
    /// Current counter value, in seconds since 1970-01-01
    ///
    /// The counter is read as two halves. If the high half changed between
    /// the two reads, the low half wrapped in between and is read again.
    pub fn time(&mut self) -> u32 {
        let first_high = self.port.cnth();
        let mut low = self.port.cntl();
        let high = self.port.cnth();
        if first_high != high {
            low = self.port.cntl();
        }
        u32::from(high) << 16 | u32::from(low)
    }

    /// Load the counter
    pub fn set_time(&mut self, epoch: u32) {
        self.write_in_config_mode(epoch, P::set_cnth, P::set_cntl);
        debug!("RTC: counter set to {=u32}", epoch);
    }

    /// Load the alarm register. The alarm flag is raised when the counter
    /// reaches this value.
    pub fn set_alarm_time(&mut self, epoch: u32) {
        self.write_in_config_mode(epoch, P::set_alrh, P::set_alrl);
        debug!("RTC: alarm set to {=u32}", epoch);
    }

    /// Milliseconds elapsed since the last counter tick, 0..=999
    ///
    /// Derived from the prescaler divider countdown and the configured
    /// reload. A divider above the reload reads as 0.
    pub fn milliseconds(&mut self) -> u16 {
        let high = u32::from(self.port.divh() & 0x000F);
        let raw = high << 16 | u32::from(self.port.divl());
        let reload = u64::from(self.config.prescaler_reload);
        let elapsed = reload.saturating_sub(u64::from(raw));
        (elapsed * 1000 / (reload + 1)) as u16
    }

    /// Gregorian date and time of the counter
    pub fn date_time(&mut self) -> DateTime {
        epoch_to_date_time(self.time())
    }

    /// Load the counter from a Gregorian date and time
    ///
    /// `date_time` is normalized in place to the value actually written.
    pub fn set_date_time(&mut self, date_time: &mut DateTime) {
        let epoch = date_time.to_epoch();
        self.set_time(epoch);
    }

    /// Hijri date of the counter
    pub fn hijri_date(&mut self) -> DateVar {
        epoch_to_hijri_date(self.time())
    }

    /// Write a 32-bit counter-domain register, high half first
    fn write_in_config_mode(&mut self, value: u32, set_high: fn(&mut P, u16), set_low: fn(&mut P, u16)) {
        self.enable_backup_writes();
        self.wait_finished();
        self.enter_config_mode();
        set_high(&mut self.port, (value >> 16) as u16);
        set_low(&mut self.port, value as u16);
        self.exit_config_mode();
        self.wait_finished();
        self.disable_backup_writes();
    }
}

#[cfg(test)]
mod tests {
    use f1_rtc_hal::rtc::CRL_CNF;
    use f1_rtc_hal::sim::{Access, SimPort};

    use crate::calendar::{TimeVar, Weekday};
    use crate::config::RtcConfig;
    use crate::rtc::WRITE_ZERO_TO_CLEAR;

    use super::*;

    fn running_rtc(counter: u32) -> Rtc<SimPort> {
        Rtc::new(SimPort::running(0x7FFF, counter))
    }

    #[test]
    fn test_set_time_sequence() {
        let mut rtc = running_rtc(0);
        rtc.set_time(0x1234_5678);
        assert_eq!(rtc.port().counter(), 0x1234_5678);
        assert!(!rtc.port().backup_writes_enabled());
        assert_eq!(
            rtc.port().log(),
            &[
                Access::BackupWrites(true),
                Access::Crl(WRITE_ZERO_TO_CLEAR | CRL_CNF),
                Access::Cnth(0x1234),
                Access::Cntl(0x5678),
                Access::Crl(WRITE_ZERO_TO_CLEAR),
                Access::BackupWrites(false),
            ]
        );
    }

    #[test]
    fn test_set_alarm_time() {
        let mut rtc = running_rtc(0);
        rtc.set_alarm_time(1_700_000_000);
        assert_eq!(rtc.port().alarm(), 1_700_000_000);
        assert_eq!(rtc.port().counter(), 0);
        assert_eq!(rtc.port().log()[2], Access::Alrh((1_700_000_000u32 >> 16) as u16));
        assert_eq!(rtc.port().log()[3], Access::Alrl(1_700_000_000u32 as u16));
    }

    #[test]
    fn test_time_reads_counter() {
        let mut rtc = running_rtc(1_710_201_600);
        assert_eq!(rtc.time(), 1_710_201_600);
    }

    #[test]
    fn test_rollover_between_high_and_low_read() {
        let mut rtc = running_rtc(0x0000_FFFF);
        rtc.port_mut().advance_after_high_read(1);
        assert_eq!(rtc.time(), 0x0001_0000);
    }

    #[test]
    fn test_rollover_after_low_read() {
        let mut rtc = running_rtc(0x0003_FFFF);
        rtc.port_mut().advance_after_low_read(1);
        assert_eq!(rtc.time(), 0x0004_0000);
    }

    #[test]
    fn test_tick_without_rollover_keeps_first_low() {
        let mut rtc = running_rtc(0x0003_0010);
        rtc.port_mut().advance_after_low_read(1);
        assert_eq!(rtc.time(), 0x0003_0010);
    }

    #[test]
    fn test_milliseconds_from_divider() {
        let mut rtc = running_rtc(0);
        rtc.port_mut().load_divider(16_384);
        assert!((499..=500).contains(&rtc.milliseconds()));

        rtc.port_mut().load_divider(0x7FFF);
        assert_eq!(rtc.milliseconds(), 0);

        rtc.port_mut().load_divider(0);
        assert_eq!(rtc.milliseconds(), 999);

        rtc.port_mut().load_divider(0x8000);
        assert_eq!(rtc.milliseconds(), 0);
    }

    #[test]
    fn test_milliseconds_follows_configured_reload() {
        let config = RtcConfig::new().with_prescaler_reload(39_999);
        let mut rtc = Rtc::with_config(SimPort::<false>::running(39_999, 0), config);
        rtc.port_mut().load_divider(20_000);
        assert_eq!(rtc.milliseconds(), 499);
    }

    #[test]
    fn test_date_time_views() {
        // 2024-03-12T08:30:15Z
        let mut rtc = running_rtc(1_710_232_215);
        let now = rtc.date_time();
        assert_eq!((now.date.year, now.date.month, now.date.day), (2024, 3, 12));
        assert_eq!(now.date.weekday, Weekday::Tuesday);
        assert_eq!(now.time, TimeVar::new(8, 30, 15));

        let hijri = rtc.hijri_date();
        assert_eq!((hijri.year, hijri.month, hijri.day), (1445, 9, 1));
    }

    #[test]
    fn test_set_date_time_normalizes() {
        let mut rtc = running_rtc(0);
        let mut date_time = DateTime::new(DateVar::new(2023, 13, 1), TimeVar::new(0, 0, 0));
        rtc.set_date_time(&mut date_time);
        assert_eq!((date_time.date.year, date_time.date.month), (2024, 1));
        assert_eq!(rtc.port().counter(), 1_704_067_200);
        assert_eq!(rtc.date_time(), date_time);
    }
}

#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

mod port;

use core::sync::atomic::{AtomicU32, Ordering};

use defmt_rtt as _;
use panic_probe as _;
use rtic::app;

/// Counter value loaded when the backup domain comes up blank
/// (2024-01-01T00:00:00Z)
const FIRST_BOOT_EPOCH: u32 = 1_704_067_200;

/// Backup slot counting boots since the domain was initialized
const BOOT_COUNT_SLOT: u8 = 2;

/// Seconds between the wake-up alarms
const ALARM_PERIOD_SECS: u32 = 60;

static SECOND_TICKS: AtomicU32 = AtomicU32::new(0);
static ALARMS: AtomicU32 = AtomicU32::new(0);

fn on_second() {
    SECOND_TICKS.fetch_add(1, Ordering::Relaxed);
}

fn on_alarm() {
    ALARMS.fetch_add(1, Ordering::Relaxed);
}

#[app(device = stm32_metapac, peripherals = false, dispatchers = [USART3])]
mod app {
    use core::fmt::Write;
    use core::sync::atomic::Ordering;

    use defmt::{info, warn};
    use f1_rtc_core::{InterruptKind, Rtc};
    use heapless::String;
    use rtic_monotonics::systick::prelude::*;

    use super::{on_alarm, on_second, ALARMS, ALARM_PERIOD_SECS, BOOT_COUNT_SLOT, FIRST_BOOT_EPOCH, SECOND_TICKS};
    use crate::port::MetapacPort;

    systick_monotonic!(Mono, 1_000);

    #[shared]
    struct Shared {
        rtc: Rtc<MetapacPort>,
    }

    #[local]
    struct Local {}

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        // Reset clock tree: 8 MHz HSI
        Mono::start(cx.core.SYST, 8_000_000);
        info!("Hello world!");

        let mut rtc = Rtc::new(MetapacPort::new());
        if rtc.begin() {
            info!("RTC kept running across reset");
        } else {
            warn!("RTC backup domain was blank, loading default time");
            rtc.set_time(FIRST_BOOT_EPOCH);
        }

        let boots = rtc.backup_register(BOOT_COUNT_SLOT).wrapping_add(1);
        if let Err(e) = rtc.try_set_backup_register(BOOT_COUNT_SLOT, boots) {
            warn!("Failed to store boot count: {}", e);
        }
        info!("Boot #{=u16}, {=u8} backup registers", boots, rtc.backup_capacity());

        let now = rtc.time();
        rtc.set_alarm_time(now.wrapping_add(ALARM_PERIOD_SECS));
        rtc.attach_interrupt(InterruptKind::Second, on_second);
        rtc.attach_interrupt(InterruptKind::Alarm, on_alarm);

        report::spawn().ok();

        (Shared { rtc }, Local {})
    }

    /// Shared RTC interrupt: run the handlers, then re-arm the alarm
    #[task(binds = RTC, shared = [rtc])]
    fn rtc_interrupt(mut cx: rtc_interrupt::Context) {
        cx.shared.rtc.lock(|rtc| {
            let alarm_fired = rtc.is_alarm_triggered();
            rtc.on_interrupt();
            if alarm_fired {
                let next = rtc.time().wrapping_add(ALARM_PERIOD_SECS);
                rtc.set_alarm_time(next);
            }
        });
    }

    #[task(shared = [rtc])]
    async fn report(mut cx: report::Context) {
        info!("starting report()");
        loop {
            let (now, hijri, millis) = cx
                .shared
                .rtc
                .lock(|rtc| (rtc.date_time(), rtc.hijri_date(), rtc.milliseconds()));

            let mut line: String<48> = String::new();
            let written = write!(
                line,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
                now.date.year,
                now.date.month,
                now.date.day,
                now.time.hours,
                now.time.minutes,
                now.time.seconds,
                millis,
            );
            if written.is_err() {
                warn!("Timestamp truncated");
            }
            info!(
                "{=str} ({}), AH {=u16}-{=i16}-{=i16}, ticks {=u32}, alarms {=u32}",
                line.as_str(),
                now.date.weekday,
                hijri.year,
                hijri.month,
                hijri.day,
                SECOND_TICKS.load(Ordering::Relaxed),
                ALARMS.load(Ordering::Relaxed),
            );

            Mono::delay(10.secs()).await;
        }
    }
}

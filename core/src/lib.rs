//! Platform-agnostic driver core for the STM32F1 real-time clock
//!
//! This crate contains the driver logic that is shared by every board: the
//! one-time bring-up of the backup domain, torn-read-safe access to the 32-bit
//! counter, interrupt dispatch, backup register storage, and the Gregorian and
//! Hijri calendar conversions. It has NO chip dependency; all hardware access
//! goes through [`f1_rtc_hal::RtcPort`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod calendar;
pub mod config;
pub mod error;
pub mod rtc;

pub use calendar::{DateTime, DateVar, TimeVar, Weekday};
pub use config::RtcConfig;
pub use error::RtcError;
pub use rtc::{Handler, InterruptKind, Rtc};

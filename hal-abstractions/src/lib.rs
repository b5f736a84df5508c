//! Hardware abstraction traits for the STM32F1 RTC
//!
//! This crate defines the register port that the driver core talks through.
//! Board crates implement [`RtcPort`] against the real peripheral; host tests
//! use the simulated port behind the `sim` feature.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod rtc;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use rtc::{BackupLayout, RtcPort};

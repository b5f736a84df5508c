//! RTC driver error types

/// RTC driver errors
///
/// Only the checked backup register accessors return these. Hardware waits
/// never fail; they block until the peripheral responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Backup slot index outside the part's backup register map
    BackupIndexOutOfRange(u8),
    /// Backup slot holds the driver's initialization flag
    ReservedBackupIndex(u8),
}

impl core::fmt::Display for RtcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BackupIndexOutOfRange(index) => {
                write!(f, "Backup register {} out of range", index)
            }
            Self::ReservedBackupIndex(index) => {
                write!(f, "Backup register {} is reserved", index)
            }
        }
    }
}

// Implement core::error::Error for no_std compatibility
impl core::error::Error for RtcError {}

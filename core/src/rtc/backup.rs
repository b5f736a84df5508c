//! Backup data registers
//!
//! Slots are numbered from 1. Slot [`INIT_SLOT`] carries the driver's init
//! flag; the checked writer refuses it, the unchecked one does not.

use f1_rtc_hal::RtcPort;

use super::{Rtc, INIT_SLOT};
use crate::error::RtcError;

impl<P: RtcPort> Rtc<P> {
    /// Number of backup slots on this part
    pub fn backup_capacity(&self) -> u8 {
        P::BACKUP_LAYOUT.capacity()
    }

    /// Read a backup slot. Out of range slots read as 0.
    pub fn backup_register(&mut self, index: u8) -> u16 {
        self.try_backup_register(index).unwrap_or(0)
    }

    /// Write a backup slot. Returns `false` without touching the hardware if
    /// `index` is out of range.
    pub fn set_backup_register(&mut self, index: u8, value: u16) -> bool {
        match P::BACKUP_LAYOUT.word_offset(index) {
            Some(word) => {
                self.write_backup_word(word, value);
                true
            }
            None => {
                warn!("RTC: backup register {=u8} out of range", index);
                false
            }
        }
    }

    /// Read a backup slot, telling an invalid index apart from a stored 0
    pub fn try_backup_register(&mut self, index: u8) -> Result<u16, RtcError> {
        let word = P::BACKUP_LAYOUT
            .word_offset(index)
            .ok_or(RtcError::BackupIndexOutOfRange(index))?;
        Ok(self.port.backup_data(word))
    }

    /// Write a backup slot. The slot holding the init flag is rejected.
    pub fn try_set_backup_register(&mut self, index: u8, value: u16) -> Result<(), RtcError> {
        if index == INIT_SLOT {
            return Err(RtcError::ReservedBackupIndex(index));
        }
        let word = P::BACKUP_LAYOUT
            .word_offset(index)
            .ok_or(RtcError::BackupIndexOutOfRange(index))?;
        self.write_backup_word(word, value);
        Ok(())
    }

    fn write_backup_word(&mut self, word: usize, value: u16) {
        self.enable_backup_writes();
        self.port.set_backup_data(word, value);
        self.disable_backup_writes();
    }
}

//! Register transport for the mining core.
//!
//! [`RegisterBus`] is the raw 32-bit load/store primitive. [`Registers`] wraps
//! a bus with the core's base address and logs every access, so a trace-level
//! log is a complete record of the traffic on the register interface.
//!
//! Neither layer returns errors once the window is mapped. A fault on the bus
//! is a hardware link failure and is not recoverable from software.

use std::fs::OpenOptions;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use fpga_miner_core::regs::{RegisterBank, WINDOW_BYTES, WORD_BYTES};

use crate::error::{DriverError, Result};
use crate::tracing::prelude::*;

/// Single 32-bit accesses to the register space, by offset from the base.
pub trait RegisterBus {
    /// Load the word at `offset`.
    fn read32(&mut self, offset: u32) -> u32;

    /// Store `value` at `offset`.
    fn write32(&mut self, offset: u32, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn read32(&mut self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Register window mapped into this process, accessed with volatile loads
/// and stores. The mapping is released when the bus is dropped.
pub struct MmioBus {
    map: MmapMut,
}

impl MmioBus {
    /// Map the register window from `device` at byte `offset`.
    ///
    /// For `/dev/mem` the offset is the physical base address of the core.
    /// For a UIO device (`/dev/uioN`) it is the map index times the page size,
    /// normally 0.
    pub fn open(device: &Path, offset: u64) -> Result<Self> {
        let map_err = |source| DriverError::Map {
            path: device.to_path_buf(),
            offset,
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(map_err)?;

        // SAFETY: the mapping is owned by this bus. Device memory is not
        // truncated underneath it, and all access goes through volatile
        // loads and stores.
        let map = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(WINDOW_BYTES)
                .map_mut(&file)
        }
        .map_err(map_err)?;

        debug!(
            "Mapped {} bytes of {} at offset 0x{:X}",
            WINDOW_BYTES,
            device.display(),
            offset
        );
        Ok(MmioBus { map })
    }

    fn word_ptr(&mut self, offset: u32) -> *mut u32 {
        let (offset, word) = (offset as usize, WORD_BYTES as usize);
        assert!(
            offset % word == 0 && offset + word <= self.map.len(),
            "register offset 0x{:03X} outside the mapped window",
            offset
        );
        // SAFETY: in bounds per the check above. The mapping starts on a
        // word boundary, so the word pointer is aligned.
        unsafe { self.map.as_mut_ptr().add(offset) as *mut u32 }
    }
}

impl RegisterBus for MmioBus {
    fn read32(&mut self, offset: u32) -> u32 {
        // SAFETY: see `word_ptr`; the pointer is aligned and mapped.
        unsafe { self.word_ptr(offset).read_volatile() }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        // SAFETY: see `word_ptr`; the pointer is aligned and mapped.
        unsafe { self.word_ptr(offset).write_volatile(value) }
    }
}

/// Instrumented handle on the core's registers.
///
/// Owning a `Registers` means owning the register space: it is neither
/// `Clone` nor shared.
pub struct Registers<B> {
    bus: B,
    base_addr: u32,
}

impl<B: RegisterBus> Registers<B> {
    /// Wrap `bus`, whose offset 0 sits at `base_addr`.
    pub fn new(bus: B, base_addr: u32) -> Self {
        Registers { bus, base_addr }
    }

    /// Absolute address of the core's register window.
    pub fn base_addr(&self) -> u32 {
        self.base_addr
    }

    /// Load one register.
    pub fn read(&mut self, offset: u32) -> u32 {
        let value = self.bus.read32(offset);
        trace!(
            "Read: 0x{:08X} = 0x{:08X}",
            self.base_addr.wrapping_add(offset),
            value
        );
        value
    }

    /// Store one register.
    pub fn write(&mut self, offset: u32, value: u32) {
        self.bus.write32(offset, value);
        trace!(
            "Write: 0x{:08X} = 0x{:08X}",
            self.base_addr.wrapping_add(offset),
            value
        );
    }

    /// Write `words` to consecutive registers of `bank`, starting at word 0.
    ///
    /// Fails without touching the bus if `words` does not fit the bank.
    pub fn write_bank(&mut self, bank: RegisterBank, words: &[u32]) -> Result<()> {
        if words.len() > bank.word_count() {
            return Err(DriverError::BankOverflow {
                bank,
                len: words.len(),
            });
        }

        debug!("Writing {}...", bank);
        for (index, &value) in words.iter().enumerate() {
            let offset = bank.word_offset(index).ok_or(DriverError::BankOverflow {
                bank,
                len: words.len(),
            })?;
            self.write(offset, value);
            debug!("  {}[{}] = 0x{:08X}", bank, index, value);
        }
        Ok(())
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

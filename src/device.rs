/*
 * Device Abstraction Layer
 *
 * The operation table every character device exposes to the host
 * dispatch layer: open, close, read, write and ioctl, plus `stat`.
 *
 * Devices are registered once and live for the rest of the program,
 * so `open` receives a `'static` reference it can hand to the
 * interrupt controller.
 */

use crate::error::Errno;
use crate::gpio::ioctl::IoctlArg;

/// Character device operations
pub trait Device: Send + Sync {
    /// Prepare the device for use
    ///
    /// Not idempotent: the caller must serialize open/close per device.
    fn open(&'static self) -> Result<(), Errno>;

    /// Release what `open` set up
    fn close(&self) -> Result<(), Errno>;

    /// Read up to buf.len() bytes into buf
    ///
    /// Returns the number of bytes read. Never blocks.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write from buf
    ///
    /// Returns the number of bytes the device consumed.
    fn write(&self, buf: &[u8]) -> Result<usize, Errno>;

    /// Device control operation (ioctl)
    fn ioctl(&self, request: u32, arg: IoctlArg<'_>) -> Result<i32, Errno>;

    /// Get device metadata
    fn stat(&self) -> Stat {
        Stat {
            st_mode: S_IFCHR | 0o666,
            ..Stat::default()
        }
    }
}

/// Minimal stat structure
///
/// Subset of POSIX struct stat, focusing on st_mode for type checking.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub st_mode: u32,    // File type and mode
    pub st_size: u64,    // File size in bytes
    pub st_blksize: u64, // Block size for I/O
    pub st_blocks: u64,  // Number of 512B blocks allocated
}

// File type constants (POSIX)
pub const S_IFMT: u32 = 0o170000; // File type mask
pub const S_IFCHR: u32 = 0o020000; // Character device

/// Check if mode indicates a character device
#[inline]
#[allow(non_snake_case)]
pub fn S_ISCHR(mode: u32) -> bool {
    (mode & S_IFMT) == S_IFCHR
}

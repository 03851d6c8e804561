/*
 * GPIO Driver Error Types
 *
 * Two layers of errors:
 * - `GpioError` is what the driver itself reports.
 * - `Errno` is the POSIX-style code handed across the device boundary,
 *   so a host dispatch layer can return a negative result like any
 *   other character device.
 *
 * A full event queue is not an error. The interrupt producer drops the
 * event and only bumps a counter (see `EventQueue::dropped`).
 */

use core::fmt;

/// POSIX errno values
///
/// Subset of standard POSIX error codes used by the device contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    EPERM = 1,   // Operation not permitted
    EBADF = 9,   // Bad file descriptor
    ENOMEM = 12, // Out of memory
    EINVAL = 22, // Invalid argument
    ENOTTY = 25, // Inappropriate ioctl for device
}

impl Errno {
    /// Negative C-style return value (`-errno`)
    #[inline]
    pub fn to_raw(self) -> isize {
        -(self as i32 as isize)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Errno::EPERM => "operation not permitted",
            Errno::EBADF => "bad file descriptor",
            Errno::ENOMEM => "out of memory",
            Errno::EINVAL => "invalid argument",
            Errno::ENOTTY => "inappropriate ioctl for device",
        };
        write!(f, "{} (errno {})", name, *self as i32)
    }
}

/// Errors reported by the GPIO driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Write attempted while the pin is configured as input
    NotConfigured,
    /// Unrecognized ioctl request code
    InvalidOpcode(u32),
    /// Argument has the wrong shape or is out of range for the request
    InvalidArgument,
    /// No device registered under the given handle
    BadHandle,
    /// Device table has no free entry left
    TableFull,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::NotConfigured => f.write_str("pin is not configured as output"),
            GpioError::InvalidOpcode(req) => write!(f, "unknown gpio ioctl request 0x{:x}", req),
            GpioError::InvalidArgument => f.write_str("invalid ioctl argument"),
            GpioError::BadHandle => f.write_str("no device registered for handle"),
            GpioError::TableFull => f.write_str("device table is full"),
        }
    }
}

impl From<GpioError> for Errno {
    fn from(err: GpioError) -> Self {
        match err {
            GpioError::NotConfigured => Errno::EPERM,
            GpioError::InvalidOpcode(_) => Errno::ENOTTY,
            GpioError::InvalidArgument => Errno::EINVAL,
            GpioError::BadHandle => Errno::EBADF,
            GpioError::TableFull => Errno::ENOMEM,
        }
    }
}

/// Result type for GPIO driver operations
pub type Result<T> = core::result::Result<T, GpioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_errno_is_negative() {
        assert_eq!(Errno::EPERM.to_raw(), -1);
        assert_eq!(Errno::ENOTTY.to_raw(), -25);
    }

    #[test]
    fn test_gpio_error_maps_to_errno() {
        assert_eq!(Errno::from(GpioError::NotConfigured), Errno::EPERM);
        assert_eq!(Errno::from(GpioError::InvalidOpcode(0x999)), Errno::ENOTTY);
        assert_eq!(Errno::from(GpioError::InvalidArgument), Errno::EINVAL);
        assert_eq!(Errno::from(GpioError::BadHandle), Errno::EBADF);
    }
}

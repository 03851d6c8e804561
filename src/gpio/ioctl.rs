/*
 * GPIO ioctl Interface
 *
 * Request codes are a stable numeric space starting at 0x100. Requests
 * that take a value carry it inline (`IoctlArg::Value`); requests that
 * return data get a typed output reference instead of a raw pointer.
 */

use crate::error::GpioError;

pub const GPIO_IOCTL_GET_INFO: u32 = 0x100;
pub const GPIO_IOCTL_SET_DIR: u32 = 0x101; // arg: 0 = in, 1 = out
pub const GPIO_IOCTL_SET_PULL: u32 = 0x102; // arg: 0 = off, 1 = up, 2 = down
pub const GPIO_IOCTL_GET_LEVEL: u32 = 0x103; // arg: level out
pub const GPIO_IOCTL_SET_IRQ_EDGE: u32 = 0x104; // arg: 0 = none, 1 = rising, 2 = falling, 3 = both
pub const GPIO_IOCTL_ENABLE_IRQ: u32 = 0x105;
pub const GPIO_IOCTL_DISABLE_IRQ: u32 = 0x106;
pub const GPIO_IOCTL_CLEAR_QUEUE: u32 = 0x107;

/// Decoded GPIO ioctl request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioRequest {
    GetInfo,
    SetDir,
    SetPull,
    GetLevel,
    SetIrqEdge,
    EnableIrq,
    DisableIrq,
    ClearQueue,
}

impl GpioRequest {
    pub const fn code(self) -> u32 {
        match self {
            GpioRequest::GetInfo => GPIO_IOCTL_GET_INFO,
            GpioRequest::SetDir => GPIO_IOCTL_SET_DIR,
            GpioRequest::SetPull => GPIO_IOCTL_SET_PULL,
            GpioRequest::GetLevel => GPIO_IOCTL_GET_LEVEL,
            GpioRequest::SetIrqEdge => GPIO_IOCTL_SET_IRQ_EDGE,
            GpioRequest::EnableIrq => GPIO_IOCTL_ENABLE_IRQ,
            GpioRequest::DisableIrq => GPIO_IOCTL_DISABLE_IRQ,
            GpioRequest::ClearQueue => GPIO_IOCTL_CLEAR_QUEUE,
        }
    }
}

impl TryFrom<u32> for GpioRequest {
    type Error = GpioError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            GPIO_IOCTL_GET_INFO => GpioRequest::GetInfo,
            GPIO_IOCTL_SET_DIR => GpioRequest::SetDir,
            GPIO_IOCTL_SET_PULL => GpioRequest::SetPull,
            GPIO_IOCTL_GET_LEVEL => GpioRequest::GetLevel,
            GPIO_IOCTL_SET_IRQ_EDGE => GpioRequest::SetIrqEdge,
            GPIO_IOCTL_ENABLE_IRQ => GpioRequest::EnableIrq,
            GPIO_IOCTL_DISABLE_IRQ => GpioRequest::DisableIrq,
            GPIO_IOCTL_CLEAR_QUEUE => GpioRequest::ClearQueue,
            other => return Err(GpioError::InvalidOpcode(other)),
        })
    }
}

/// Pin description returned by `GPIO_IOCTL_GET_INFO`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioInfo {
    pub pin: u8,         // Hardware pin number
    pub bpp: u8,         // Bits per sample, always 1
    pub has_irq: u8,     // 1 if edge events are supported
}

/// ioctl argument
#[derive(Debug)]
pub enum IoctlArg<'a> {
    /// No argument
    None,
    /// Integer passed by value
    Value(usize),
    /// Output slot for `GPIO_IOCTL_GET_INFO`
    Info(&'a mut GpioInfo),
    /// Output slot for `GPIO_IOCTL_GET_LEVEL`
    Level(&'a mut i32),
}

impl IoctlArg<'_> {
    /// Integer argument; `None` reads as 0 like a null pointer argument
    pub(crate) fn value(&self) -> Result<usize, GpioError> {
        match self {
            IoctlArg::None => Ok(0),
            IoctlArg::Value(v) => Ok(*v),
            _ => Err(GpioError::InvalidArgument),
        }
    }
}

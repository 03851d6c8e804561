/*
 * CLUU GPIO Driver
 *
 * Interrupt-driven GPIO character device. Each pin records edge
 * transitions from its interrupt handler into a lock-free queue and
 * exposes them, together with pin configuration, through the usual
 * open/close/read/write/ioctl device operations.
 *
 * Layers:
 * - hal: facade the platform implements (pin control + clock)
 * - gpio: per-pin context, event queue and device driver
 * - device: the character device operation table
 * - table: fixed handle -> device dispatch
 * - logger: optional `log` backend
 *
 * Typical board setup:
 *
 * ```ignore
 * static CTRL: GpioController<EspPins, EspTimer> = GpioController::new(EspPins, EspTimer);
 * static GPIO2: DefaultGpioPin<EspPins, EspTimer> = GpioPin::new(&CTRL, PinId(2));
 *
 * let mut devtab: DeviceTable<4> = DeviceTable::new();
 * devtab.register(DevEntry { path: "/gpio2", kind: DriverType::Chr, device: &GPIO2, fixed_fd: 0 })?;
 * ```
 */

#![cfg_attr(not(test), no_std)]

pub mod device;
pub mod error;
pub mod gpio;
pub mod hal;
pub mod logger;
pub mod table;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use device::{Device, Stat};
pub use error::{Errno, GpioError};
pub use gpio::{
    DefaultGpioPin, Direction, EVENT_RECORD_SIZE, Edge, EdgeEvent, GpioInfo, GpioPin, IoctlArg,
    Level, PinConfig, PinId, Pull,
};
pub use hal::{Clock, EdgeHandler, GpioController, PinControl};
pub use table::{DevEntry, DeviceTable, DriverType};

/*
 * GPIO Character Device Driver
 *
 * Per-pin driver built from:
 * - event: edge event type and its 9-byte record format
 * - queue: lock-free single-producer single-consumer event queue
 * - context: per-pin configuration shared with the interrupt handler
 * - ioctl: request codes and argument types
 * - pin: the device itself (interrupt top-half + file operations)
 */

pub mod context;
pub mod event;
pub mod ioctl;
pub mod pin;
pub mod queue;

pub use context::{Direction, Edge, PinConfig, PinContext, PinId, Pull};
pub use event::{EVENT_RECORD_SIZE, EdgeEvent, Level};
pub use ioctl::{GpioInfo, GpioRequest, IoctlArg};
pub use pin::{DefaultGpioPin, GpioPin};
pub use queue::{DEFAULT_EVQ_CAPACITY, EventQueue};

/*
 * GPIO Pin Device
 *
 * Character device driver for one GPIO pin. It has two halves:
 *
 * - Interrupt top-half (`EdgeHandler::on_edge`): samples level and
 *   timestamp and pushes them to the pin's event queue. No locks, no
 *   allocation, no logging.
 * - Task half (open/close/read/write/ioctl): configures the hardware
 *   through the controller's facade and drains the event queue.
 *
 * Reading:
 * - A buffer with room for at least one 9-byte record receives queued
 *   events, oldest first.
 * - If no event is queued, or the buffer is shorter than one record,
 *   a single byte with the current level (0/1) is returned instead.
 *   Callers tell the modes apart by the returned length only (a
 *   multiple of 9 versus exactly 1). `read_events` and `sample_level`
 *   expose the two modes separately.
 */

use crate::device::Device;
use crate::error::{Errno, GpioError, Result};
use crate::hal::{Clock, EdgeHandler, GpioController, PinControl};

use super::context::{Direction, Edge, PinConfig, PinContext, PinId, Pull};
use super::event::{EVENT_RECORD_SIZE, EdgeEvent, Level};
use super::ioctl::{GpioInfo, GpioRequest, IoctlArg};
use super::queue::DEFAULT_EVQ_CAPACITY;

/// GPIO pin driver instance
pub struct GpioPin<P: 'static, K: 'static, const C: usize = DEFAULT_EVQ_CAPACITY> {
    ctx: PinContext<C>,
    ctrl: &'static GpioController<P, K>,
}

/// Pin device with the default queue capacity
pub type DefaultGpioPin<P, K> = GpioPin<P, K, DEFAULT_EVQ_CAPACITY>;

impl<P, K, const C: usize> GpioPin<P, K, C>
where
    P: PinControl + 'static,
    K: Clock + 'static,
{
    /// Create a pin device configured as a floating input
    pub const fn new(ctrl: &'static GpioController<P, K>, pin: PinId) -> Self {
        Self::with_config(ctrl, pin, PinConfig::input())
    }

    pub const fn with_config(
        ctrl: &'static GpioController<P, K>,
        pin: PinId,
        config: PinConfig,
    ) -> Self {
        Self {
            ctx: PinContext::with_config(pin, config),
            ctrl,
        }
    }

    #[inline]
    pub fn pin(&self) -> PinId {
        self.ctx.pin()
    }

    /// Pin state shared with the interrupt handler
    #[inline]
    pub fn context(&self) -> &PinContext<C> {
        &self.ctx
    }

    /// Apply configuration and attach the interrupt handler
    ///
    /// The hardware trigger is left disabled until an edge is selected
    /// and interrupts are enabled through ioctl. Calling this twice
    /// installs the handler twice.
    pub fn open(&'static self) {
        self.ctrl.init();

        let pins = self.ctrl.pins();
        let pin = self.pin();
        let direction = self.ctx.direction();

        pins.configure(pin, direction, Pull::None);
        self.apply_pull(direction, self.ctx.pull());
        pins.install_handler(pin, self);
        pins.set_edge(pin, Edge::None);

        log::debug!("gpio{}: opened as {:?}", pin.0, direction);
    }

    /// Detach the interrupt handler
    ///
    /// The interrupt-enable flag and queued events are left as they are.
    pub fn close(&self) {
        self.ctrl.pins().remove_handler(self.pin());
        log::debug!("gpio{}: closed", self.pin().0);
    }

    /// Drain events into `buf` or fall back to a level sample
    ///
    /// Returns the number of bytes written: a multiple of
    /// `EVENT_RECORD_SIZE` in event mode, 1 for a level sample, 0 only
    /// for an empty buffer.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        if buf.len() >= EVENT_RECORD_SIZE {
            let mut written = 0;
            for record in buf.chunks_exact_mut(EVENT_RECORD_SIZE) {
                let Some(event) = self.ctx.events().try_pop() else {
                    break;
                };
                record.copy_from_slice(&event.encode());
                written += EVENT_RECORD_SIZE;
            }
            if written > 0 {
                return written;
            }
        }

        match buf.first_mut() {
            Some(first) => {
                *first = self.sample_level().as_u8();
                1
            }
            None => 0,
        }
    }

    /// Drain queued events into `out`, oldest first
    ///
    /// Never samples the pin; returns 0 when the queue is empty.
    pub fn read_events(&self, out: &mut [EdgeEvent]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.ctx.events().try_pop() {
                Some(event) => {
                    *slot = event;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Drain queued events into a fixed-capacity vector until it is full
    pub fn drain_into<const N: usize>(&self, out: &mut heapless::Vec<EdgeEvent, N>) -> usize {
        let mut count = 0;
        while !out.is_full() {
            let Some(event) = self.ctx.events().try_pop() else {
                break;
            };
            // Cannot fail, the vector was not full
            let _ = out.push(event);
            count += 1;
        }
        count
    }

    /// Instantaneous pin level
    pub fn sample_level(&self) -> Level {
        self.ctrl.pins().get_level(self.pin())
    }

    /// Drive the pin from the first byte of `buf` (nonzero = high)
    ///
    /// Returns the number of bytes interpreted: 1, or 0 for an empty
    /// buffer. Fails with `NotConfigured` on an input pin without
    /// touching the hardware.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        if self.ctx.direction() != Direction::Output {
            log::warn!("gpio{}: write refused, pin is an input", self.pin().0);
            return Err(GpioError::NotConfigured);
        }

        let Some(&first) = buf.first() else {
            return Ok(0);
        };

        let level = Level::from(first != 0);
        self.ctrl.pins().set_level(self.pin(), level);
        Ok(1)
    }

    /// Handle a GPIO ioctl request
    pub fn ioctl(&self, request: u32, arg: IoctlArg<'_>) -> Result<i32> {
        let request = GpioRequest::try_from(request)?;
        let pins = self.ctrl.pins();
        let pin = self.pin();

        log::trace!("gpio{}: ioctl {:?}", pin.0, request);

        match request {
            GpioRequest::GetInfo => {
                let IoctlArg::Info(info) = arg else {
                    return Err(GpioError::InvalidArgument);
                };
                *info = GpioInfo {
                    pin: pin.0,
                    bpp: 1,
                    has_irq: 1,
                };
            }
            GpioRequest::SetDir => {
                let direction = Direction::from_arg(arg.value()?);
                self.ctx.set_direction(direction);
                pins.configure(pin, direction, self.ctx.pull());
            }
            GpioRequest::SetPull => {
                let pull = Pull::from_arg(arg.value()?).ok_or(GpioError::InvalidArgument)?;
                self.ctx.set_pull(pull);
                let direction = self.ctx.direction();
                pins.configure(pin, direction, Pull::None);
                self.apply_pull(direction, pull);
            }
            GpioRequest::GetLevel => {
                let IoctlArg::Level(out) = arg else {
                    return Err(GpioError::InvalidArgument);
                };
                *out = self.sample_level().as_u8() as i32;
            }
            GpioRequest::SetIrqEdge => {
                let edge = Edge::from_arg(arg.value()?).ok_or(GpioError::InvalidArgument)?;
                self.ctx.set_edge(edge);
                pins.set_edge(pin, edge);
            }
            GpioRequest::EnableIrq => {
                self.ctx.set_irq_enabled(true);
                pins.enable_interrupt(pin);
            }
            GpioRequest::DisableIrq => {
                // Line off first so no interrupt sees a half-disabled pin
                pins.disable_interrupt(pin);
                self.ctx.set_irq_enabled(false);
            }
            GpioRequest::ClearQueue => {
                self.ctx.events().clear();
            }
        }

        Ok(0)
    }

    /// Enable the requested pull resistor; pulls must already be off
    fn apply_pull(&self, direction: Direction, pull: Pull) {
        if pull != Pull::None {
            self.ctrl.pins().configure(self.pin(), direction, pull);
        }
    }
}

impl<P, K, const C: usize> EdgeHandler for GpioPin<P, K, C>
where
    P: PinControl + 'static,
    K: Clock + 'static,
{
    /// Interrupt top-half
    fn on_edge(&self) {
        if !self.ctx.irq_enabled() {
            return;
        }

        let level = self.ctrl.pins().get_level(self.pin());
        let timestamp_us = self.ctrl.clock().now_micros();

        // Full queue: the event is dropped and counted by the queue
        let _ = self.ctx.events().try_push(EdgeEvent::new(timestamp_us, level));
    }
}

impl<P, K, const C: usize> Device for GpioPin<P, K, C>
where
    P: PinControl + 'static,
    K: Clock + 'static,
{
    fn open(&'static self) -> core::result::Result<(), Errno> {
        GpioPin::open(self);
        Ok(())
    }

    fn close(&self) -> core::result::Result<(), Errno> {
        GpioPin::close(self);
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) -> core::result::Result<usize, Errno> {
        Ok(GpioPin::read(self, buf))
    }

    fn write(&self, buf: &[u8]) -> core::result::Result<usize, Errno> {
        GpioPin::write(self, buf).map_err(Errno::from)
    }

    fn ioctl(&self, request: u32, arg: IoctlArg<'_>) -> core::result::Result<i32, Errno> {
        GpioPin::ioctl(self, request, arg).map_err(Errno::from)
    }
}

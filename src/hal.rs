/*
 * Pin Control Facade
 *
 * The driver does not touch GPIO registers itself. The platform provides
 * an implementation of `PinControl` (direction, pull, level, edge trigger,
 * interrupt line, handler registration) and a `Clock` giving monotonic
 * microseconds.
 *
 * `GpioController` bundles both for all pins of one platform and makes
 * installation of the shared GPIO interrupt service explicit and
 * idempotent.
 */

use spin::Once;

use crate::gpio::context::{Direction, Edge, PinId, Pull};
use crate::gpio::event::Level;

/// Callback registered with the interrupt controller for one pin
///
/// Called in interrupt context: implementations must not block, must
/// not allocate and must return in bounded time.
pub trait EdgeHandler: Sync {
    fn on_edge(&self);
}

/// Hardware access for GPIO pins
///
/// Methods that may run in interrupt context (`get_level`) must be
/// callable there without locking.
pub trait PinControl: Sync {
    /// Install the platform's shared GPIO interrupt service
    fn install_isr_service(&self);

    /// Apply direction and pull resistors to `pin`
    fn configure(&self, pin: PinId, direction: Direction, pull: Pull);

    /// Current input level
    fn get_level(&self, pin: PinId) -> Level;

    /// Drive an output level
    fn set_level(&self, pin: PinId, level: Level);

    /// Select which edges raise the pin interrupt
    fn set_edge(&self, pin: PinId, edge: Edge);

    fn enable_interrupt(&self, pin: PinId);

    fn disable_interrupt(&self, pin: PinId);

    /// Route the pin's interrupt to `handler`
    fn install_handler(&self, pin: PinId, handler: &'static dyn EdgeHandler);

    fn remove_handler(&self, pin: PinId);
}

/// Monotonic microsecond time source
pub trait Clock: Sync {
    fn now_micros(&self) -> u64;
}

/// Platform services shared by every GPIO pin device
pub struct GpioController<P, K> {
    pins: P,
    clock: K,
    isr_service: Once<()>,
}

impl<P: PinControl, K: Clock> GpioController<P, K> {
    pub const fn new(pins: P, clock: K) -> Self {
        Self {
            pins,
            clock,
            isr_service: Once::new(),
        }
    }

    /// Install the GPIO interrupt service
    ///
    /// Safe to call any number of times; the platform sees a single
    /// installation per controller.
    pub fn init(&self) {
        self.isr_service.call_once(|| {
            self.pins.install_isr_service();
            log::info!("GPIO interrupt service installed");
        });
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.isr_service.is_completed()
    }

    #[inline]
    pub fn pins(&self) -> &P {
        &self.pins
    }

    #[inline]
    pub fn clock(&self) -> &K {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ManualClock, MockPins, PinCall};

    #[test]
    fn test_init_is_idempotent() {
        let ctrl = GpioController::new(MockPins::new(), ManualClock::new(0));
        assert!(!ctrl.is_initialized());

        ctrl.init();
        ctrl.init();
        ctrl.init();

        assert!(ctrl.is_initialized());
        assert_eq!(ctrl.pins().count(|c| matches!(c, PinCall::InstallIsrService)), 1);
    }
}

/*
 * Per-Pin Context
 *
 * Holds the configuration of one GPIO pin and its edge event queue.
 *
 * Every field is an atomic because the interrupt handler reads the
 * context while a task may be reconfiguring it. Configuration fields are
 * written from task context only; the interrupt handler only ever
 * writes the queue's producer side.
 */

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::queue::EventQueue;

/// Hardware pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(pub u8);

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Input = 0,
    Output = 1,
}

impl Direction {
    /// Decode an ioctl argument: any nonzero value selects output
    pub const fn from_arg(arg: usize) -> Self {
        if arg != 0 { Direction::Output } else { Direction::Input }
    }

    const fn from_raw(raw: u8) -> Self {
        if raw != 0 { Direction::Output } else { Direction::Input }
    }
}

/// Pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Pull {
    #[default]
    None = 0,
    PullUp = 1,
    PullDown = 2,
}

impl Pull {
    /// Decode an ioctl argument (0 = off, 1 = up, 2 = down)
    pub const fn from_arg(arg: usize) -> Option<Self> {
        match arg {
            0 => Some(Pull::None),
            1 => Some(Pull::PullUp),
            2 => Some(Pull::PullDown),
            _ => None,
        }
    }
}

/// Interrupt trigger edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Edge {
    #[default]
    None = 0,
    Rising = 1,
    Falling = 2,
    Both = 3,
}

impl Edge {
    /// Decode an ioctl argument (0 = none, 1 = rising, 2 = falling, 3 = both)
    pub const fn from_arg(arg: usize) -> Option<Self> {
        match arg {
            0 => Some(Edge::None),
            1 => Some(Edge::Rising),
            2 => Some(Edge::Falling),
            3 => Some(Edge::Both),
            _ => None,
        }
    }
}

/// Initial configuration applied when a pin is created
///
/// The interrupt trigger always starts disabled; it is selected later
/// with `GPIO_IOCTL_SET_IRQ_EDGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinConfig {
    pub direction: Direction,
    pub pull: Pull,
}

impl PinConfig {
    /// Floating input
    pub const fn input() -> Self {
        Self {
            direction: Direction::Input,
            pull: Pull::None,
        }
    }

    /// Push-pull output
    pub const fn output() -> Self {
        Self {
            direction: Direction::Output,
            pull: Pull::None,
        }
    }

    pub const fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }
}

/// Mutable state of one GPIO pin
pub struct PinContext<const C: usize> {
    pin: PinId,
    direction: AtomicU8,
    pull: AtomicU8,
    edge: AtomicU8,
    irq_enabled: AtomicBool,
    events: EventQueue<C>,
}

impl<const C: usize> PinContext<C> {
    /// Create a context for `pin` using the default (input) configuration
    pub const fn new(pin: PinId) -> Self {
        Self::with_config(pin, PinConfig::input())
    }

    pub const fn with_config(pin: PinId, config: PinConfig) -> Self {
        Self {
            pin,
            direction: AtomicU8::new(config.direction as u8),
            pull: AtomicU8::new(config.pull as u8),
            edge: AtomicU8::new(Edge::None as u8),
            irq_enabled: AtomicBool::new(false),
            events: EventQueue::new(),
        }
    }

    #[inline]
    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn direction(&self) -> Direction {
        Direction::from_raw(self.direction.load(Ordering::Acquire))
    }

    pub fn set_direction(&self, direction: Direction) {
        self.direction.store(direction as u8, Ordering::Release);
    }

    pub fn pull(&self) -> Pull {
        // Only values produced by `Pull as u8` are ever stored
        Pull::from_arg(self.pull.load(Ordering::Acquire) as usize).unwrap_or_default()
    }

    pub fn set_pull(&self, pull: Pull) {
        self.pull.store(pull as u8, Ordering::Release);
    }

    pub fn edge(&self) -> Edge {
        Edge::from_arg(self.edge.load(Ordering::Acquire) as usize).unwrap_or_default()
    }

    pub fn set_edge(&self, edge: Edge) {
        self.edge.store(edge as u8, Ordering::Release);
    }

    /// Whether the interrupt handler should record edges
    #[inline]
    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled.load(Ordering::Acquire)
    }

    pub fn set_irq_enabled(&self, enabled: bool) {
        self.irq_enabled.store(enabled, Ordering::Release);
    }

    /// The pin's edge event queue
    #[inline]
    pub fn events(&self) -> &EventQueue<C> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_defaults() {
        let ctx: PinContext<4> = PinContext::new(PinId(2));
        assert_eq!(ctx.pin(), PinId(2));
        assert_eq!(ctx.direction(), Direction::Input);
        assert_eq!(ctx.pull(), Pull::None);
        assert_eq!(ctx.edge(), Edge::None);
        assert!(!ctx.irq_enabled());
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = PinConfig::output().with_pull(Pull::PullDown);
        let ctx: PinContext<4> = PinContext::with_config(PinId(35), config);
        assert_eq!(ctx.direction(), Direction::Output);
        assert_eq!(ctx.pull(), Pull::PullDown);
        assert_eq!(ctx.edge(), Edge::None);

        ctx.set_edge(Edge::Both);
        assert_eq!(ctx.edge(), Edge::Both);
    }

    #[test]
    fn test_arg_decoding() {
        assert_eq!(Direction::from_arg(0), Direction::Input);
        assert_eq!(Direction::from_arg(7), Direction::Output);
        assert_eq!(Pull::from_arg(2), Some(Pull::PullDown));
        assert_eq!(Pull::from_arg(3), None);
        assert_eq!(Edge::from_arg(3), Some(Edge::Both));
        assert_eq!(Edge::from_arg(4), None);
    }
}

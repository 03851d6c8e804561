/*
 * Mock Pin Control Facade
 *
 * Recording implementation of `PinControl` and `Clock` for tests.
 * Configuration calls are appended to a bounded log so tests can check
 * exactly which hardware operations the driver issued.
 *
 * Input levels live in an atomic bitmask, so `get_level` works from a
 * simulated interrupt without taking the log lock.
 */

use core::sync::atomic::{AtomicU64, Ordering};

use heapless::Vec;
use spin::Mutex;

use crate::gpio::context::{Direction, Edge, PinId, Pull};
use crate::gpio::event::Level;
use crate::hal::{Clock, EdgeHandler, PinControl};

/// Number of pins the mock can model
pub const MOCK_PIN_COUNT: usize = 64;

/// Capacity of the call log
pub const CALL_LOG_CAPACITY: usize = 128;

/// A hardware operation issued by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    InstallIsrService,
    Configure {
        pin: PinId,
        direction: Direction,
        pull: Pull,
    },
    SetLevel {
        pin: PinId,
        level: Level,
    },
    SetEdge {
        pin: PinId,
        edge: Edge,
    },
    EnableInterrupt(PinId),
    DisableInterrupt(PinId),
    InstallHandler(PinId),
    RemoveHandler(PinId),
}

struct MockState {
    calls: Vec<PinCall, CALL_LOG_CAPACITY>,
    handlers: [Option<&'static dyn EdgeHandler>; MOCK_PIN_COUNT],
    edges: [Edge; MOCK_PIN_COUNT],
    irq_lines: u64,
}

/// Recording GPIO facade
pub struct MockPins {
    levels: AtomicU64,
    state: Mutex<MockState>,
}

fn bit(pin: PinId) -> u64 {
    if (pin.0 as usize) < MOCK_PIN_COUNT { 1 << pin.0 } else { 0 }
}

impl MockPins {
    pub const fn new() -> Self {
        Self {
            levels: AtomicU64::new(0),
            state: Mutex::new(MockState {
                calls: Vec::new(),
                handlers: [None; MOCK_PIN_COUNT],
                edges: [Edge::None; MOCK_PIN_COUNT],
                irq_lines: 0,
            }),
        }
    }

    fn record(&self, call: PinCall) {
        // A full log keeps the oldest entries; tests clear it between phases
        let _ = self.state.lock().calls.push(call);
    }

    /// Force the level seen on `pin` without triggering an interrupt
    pub fn set_input_level(&self, pin: PinId, level: Level) {
        match level {
            Level::High => self.levels.fetch_or(bit(pin), Ordering::SeqCst),
            Level::Low => self.levels.fetch_and(!bit(pin), Ordering::SeqCst),
        };
    }

    /// Simulate an external signal change on `pin`
    ///
    /// The installed handler runs only if the interrupt line is enabled
    /// and the configured trigger matches the transition, like real
    /// edge-detect hardware. Returns whether the handler ran.
    pub fn drive_edge(&self, pin: PinId, level: Level) -> bool {
        let previous = self.get_level(pin);
        self.set_input_level(pin, level);

        let trigger = match self.edge_of(pin) {
            Edge::None => false,
            Edge::Rising => previous == Level::Low && level == Level::High,
            Edge::Falling => previous == Level::High && level == Level::Low,
            Edge::Both => previous != level,
        };
        trigger && self.fire(pin)
    }

    /// Invoke the handler of `pin` if one is installed and its line enabled
    pub fn fire(&self, pin: PinId) -> bool {
        let handler = {
            let state = self.state.lock();
            if state.irq_lines & bit(pin) == 0 {
                return false;
            }
            state.handlers.get(pin.0 as usize).copied().flatten()
        };

        // Lock released: the handler reads levels through this facade
        match handler {
            Some(handler) => {
                handler.on_edge();
                true
            }
            None => false,
        }
    }

    /// Trigger currently programmed for `pin`
    pub fn edge_of(&self, pin: PinId) -> Edge {
        let state = self.state.lock();
        state.edges.get(pin.0 as usize).copied().unwrap_or_default()
    }

    pub fn interrupt_enabled(&self, pin: PinId) -> bool {
        self.state.lock().irq_lines & bit(pin) != 0
    }

    pub fn handler_installed(&self, pin: PinId) -> bool {
        let state = self.state.lock();
        matches!(state.handlers.get(pin.0 as usize), Some(Some(_)))
    }

    /// Snapshot of the call log
    pub fn calls(&self) -> Vec<PinCall, CALL_LOG_CAPACITY> {
        self.state.lock().calls.clone()
    }

    pub fn last_call(&self) -> Option<PinCall> {
        self.state.lock().calls.last().copied()
    }

    /// Number of logged calls matching `pred`
    pub fn count(&self, pred: impl Fn(&PinCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl Default for MockPins {
    fn default() -> Self {
        Self::new()
    }
}

impl PinControl for MockPins {
    fn install_isr_service(&self) {
        self.record(PinCall::InstallIsrService);
    }

    fn configure(&self, pin: PinId, direction: Direction, pull: Pull) {
        self.record(PinCall::Configure {
            pin,
            direction,
            pull,
        });
    }

    fn get_level(&self, pin: PinId) -> Level {
        Level::from(self.levels.load(Ordering::SeqCst) & bit(pin) != 0)
    }

    fn set_level(&self, pin: PinId, level: Level) {
        self.set_input_level(pin, level);
        self.record(PinCall::SetLevel { pin, level });
    }

    fn set_edge(&self, pin: PinId, edge: Edge) {
        {
            let mut state = self.state.lock();
            if let Some(slot) = state.edges.get_mut(pin.0 as usize) {
                *slot = edge;
            }
        }
        self.record(PinCall::SetEdge { pin, edge });
    }

    fn enable_interrupt(&self, pin: PinId) {
        self.state.lock().irq_lines |= bit(pin);
        self.record(PinCall::EnableInterrupt(pin));
    }

    fn disable_interrupt(&self, pin: PinId) {
        self.state.lock().irq_lines &= !bit(pin);
        self.record(PinCall::DisableInterrupt(pin));
    }

    fn install_handler(&self, pin: PinId, handler: &'static dyn EdgeHandler) {
        {
            let mut state = self.state.lock();
            if let Some(slot) = state.handlers.get_mut(pin.0 as usize) {
                *slot = Some(handler);
            }
        }
        self.record(PinCall::InstallHandler(pin));
    }

    fn remove_handler(&self, pin: PinId) {
        {
            let mut state = self.state.lock();
            if let Some(slot) = state.handlers.get_mut(pin.0 as usize) {
                *slot = None;
            }
        }
        self.record(PinCall::RemoveHandler(pin));
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub const fn new(start_us: u64) -> Self {
        Self {
            now: AtomicU64::new(start_us),
        }
    }

    pub fn set(&self, now_us: u64) {
        self.now.store(now_us, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_us: u64) {
        self.now.fetch_add(delta_us, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/*
 * Device Table
 *
 * Fixed table of registered character devices. Each entry maps a
 * fixed handle to a device and is forwarded to unchanged: the table does
 * no path resolution and allocates no descriptors, the registration
 * layer decides both.
 *
 * Entries hold `'static` references; the driver subsystem owns the
 * devices themselves.
 */

use heapless::Vec;

use crate::device::Device;
use crate::error::{Errno, GpioError};
use crate::gpio::ioctl::IoctlArg;

/// Kind of driver behind an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DriverType {
    Chr = 0,
    Net = 1,
    Blk = 2,
    Mnt = 3,
}

/// One registered device
#[derive(Clone, Copy)]
pub struct DevEntry {
    /// Name the registration layer publishes the device under
    pub path: &'static str,
    pub kind: DriverType,
    pub device: &'static dyn Device,
    /// Handle callers use to reach this device
    pub fixed_fd: i16,
}

impl core::fmt::Debug for DevEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DevEntry")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("fixed_fd", &self.fixed_fd)
            .finish()
    }
}

/// Handle → device dispatch table with room for `N` entries
pub struct DeviceTable<const N: usize> {
    entries: Vec<DevEntry, N>,
}

impl<const N: usize> DeviceTable<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry
    ///
    /// Fails with `InvalidArgument` if the handle is already taken and
    /// with `TableFull` if there is no room left.
    pub fn register(&mut self, entry: DevEntry) -> Result<(), GpioError> {
        if self.entries.iter().any(|e| e.fixed_fd == entry.fixed_fd) {
            return Err(GpioError::InvalidArgument);
        }
        self.entries.push(entry).map_err(|_| GpioError::TableFull)?;
        log::debug!("devtab: {} registered as handle {}", entry.path, entry.fixed_fd);
        Ok(())
    }

    /// Get the entry for a handle
    pub fn get(&self, handle: i16) -> Result<&DevEntry, GpioError> {
        self.entries
            .iter()
            .find(|e| e.fixed_fd == handle)
            .ok_or(GpioError::BadHandle)
    }

    /// All registered entries, in registration order
    pub fn entries(&self) -> &[DevEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn device(&self, handle: i16) -> Result<&'static dyn Device, Errno> {
        Ok(self.get(handle)?.device)
    }

    pub fn open(&self, handle: i16) -> Result<(), Errno> {
        self.device(handle)?.open()
    }

    pub fn close(&self, handle: i16) -> Result<(), Errno> {
        self.device(handle)?.close()
    }

    pub fn read(&self, handle: i16, buf: &mut [u8]) -> Result<usize, Errno> {
        self.device(handle)?.read(buf)
    }

    pub fn write(&self, handle: i16, buf: &[u8]) -> Result<usize, Errno> {
        self.device(handle)?.write(buf)
    }

    pub fn ioctl(&self, handle: i16, request: u32, arg: IoctlArg<'_>) -> Result<i32, Errno> {
        self.device(handle)?.ioctl(request, arg)
    }
}

impl<const N: usize> Default for DeviceTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::S_ISCHR;
    use crate::gpio::context::{PinConfig, PinId};
    use crate::gpio::event::{EVENT_RECORD_SIZE, EdgeEvent, Level};
    use crate::gpio::ioctl::*;
    use crate::gpio::pin::GpioPin;
    use crate::hal::{GpioController, PinControl};
    use crate::mock::{ManualClock, MockPins, PinCall};

    type TestCtrl = GpioController<MockPins, ManualClock>;
    type TestPin = GpioPin<MockPins, ManualClock, 8>;

    /// Two pins wired the way a board file registers them
    fn board() -> (&'static TestCtrl, DeviceTable<4>) {
        let ctrl: &'static TestCtrl =
            Box::leak(Box::new(GpioController::new(MockPins::new(), ManualClock::new(0))));
        let gpio2: &'static TestPin = Box::leak(Box::new(GpioPin::new(ctrl, PinId(2))));
        let gpio35: &'static TestPin =
            Box::leak(Box::new(GpioPin::with_config(ctrl, PinId(35), PinConfig::output())));

        let mut table = DeviceTable::new();
        table
            .register(DevEntry {
                path: "/gpio2",
                kind: DriverType::Chr,
                device: gpio2,
                fixed_fd: 0,
            })
            .unwrap();
        table
            .register(DevEntry {
                path: "/gpio4",
                kind: DriverType::Chr,
                device: gpio35,
                fixed_fd: 1,
            })
            .unwrap();
        (ctrl, table)
    }

    #[test]
    fn test_register_and_lookup() {
        let (_, table) = board();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().path, "/gpio4");
        assert!(S_ISCHR(table.get(0).unwrap().device.stat().st_mode));
        assert_eq!(table.get(7).err(), Some(GpioError::BadHandle));
    }

    #[test]
    fn test_duplicate_handle_and_full_table() {
        let (_, mut table) = board();
        let dev = table.get(0).unwrap().device;
        let entry = |fd| DevEntry {
            path: "/gpioX",
            kind: DriverType::Chr,
            device: dev,
            fixed_fd: fd,
        };

        assert_eq!(table.register(entry(0)), Err(GpioError::InvalidArgument));
        assert_eq!(table.register(entry(2)), Ok(()));
        assert_eq!(table.register(entry(3)), Ok(()));
        assert_eq!(table.register(entry(4)), Err(GpioError::TableFull));
    }

    #[test]
    fn test_operations_forward_to_device() {
        let (ctrl, table) = board();
        let pins = ctrl.pins();

        table.open(0).unwrap();
        table.open(1).unwrap();
        assert_eq!(pins.count(|c| *c == PinCall::InstallIsrService), 1);

        // Output pin accepts writes, input pin refuses them
        assert_eq!(table.write(1, &[1]), Ok(1));
        assert_eq!(pins.get_level(PinId(35)), Level::High);
        assert_eq!(table.write(0, &[1]), Err(Errno::EPERM));

        // Edge capture on the input pin
        table.ioctl(0, GPIO_IOCTL_SET_IRQ_EDGE, IoctlArg::Value(1)).unwrap();
        table.ioctl(0, GPIO_IOCTL_ENABLE_IRQ, IoctlArg::None).unwrap();
        ctrl.clock().set(42);
        assert!(pins.drive_edge(PinId(2), Level::High));

        let mut buf = [0u8; 16];
        assert_eq!(table.read(0, &mut buf), Ok(EVENT_RECORD_SIZE));
        assert_eq!(EdgeEvent::decode(&buf), Some(EdgeEvent::new(42, Level::High)));

        table.close(0).unwrap();
        assert_eq!(pins.last_call(), Some(PinCall::RemoveHandler(PinId(2))));
    }

    #[test]
    fn test_unknown_handle() {
        let (_, table) = board();
        assert_eq!(table.open(9), Err(Errno::EBADF));
        assert_eq!(table.read(9, &mut [0u8; 4]), Err(Errno::EBADF));
        assert_eq!(table.ioctl(9, GPIO_IOCTL_CLEAR_QUEUE, IoctlArg::None), Err(Errno::EBADF));
    }
}

use crate::device::*;
use crate::map::GPIO_WINDOW;

/// GPIO controller IP block
///
/// 32 lines, one bit per line in every register.
///
/// | Offset | Register  | Access | Contents |
/// |--------|-----------|--------|----------|
/// | 0x00   | DATA      | R/W    | Output level for lines configured as outputs. |
/// | 0x04   | DIRECTION | R/W    | 1 = output, 0 = input. |
/// | 0x08   | READBACK  | RO     | Physical pin level, regardless of direction. |
///
/// DATA bits of input lines are stored but do not drive the pin.
///
pub struct Gpio<A>
where A: RegisterAccess,
{
    access: A,
    window: Window,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpioSnapshot {
    pub data: RegisterValue,
    pub direction: RegisterValue,
    pub readback: RegisterValue,
}

impl<A> Gpio<A>
where A: RegisterAccess,
{
    pub const DATA: RegisterOffset = 0x00;
    pub const DIRECTION: RegisterOffset = 0x04;
    pub const READBACK: RegisterOffset = 0x08;

    pub const WINDOW_SIZE: usize = GPIO_WINDOW.size();

    pub fn new(access: A, base: RegisterAddress) -> Self {
        Self {
            access,
            window: Window::new(base, Self::WINDOW_SIZE),
        }
    }

    fn register<M>(&self, offset: RegisterOffset) -> Access<'_, A, M> {
        Access::new(&self.access, self.window, offset)
    }

    pub fn data              (&self) -> Access<A, ReadWrite> { self.register(Self::DATA) }
    pub fn direction_register(&self) -> Access<A, ReadWrite> { self.register(Self::DIRECTION) }
    pub fn readback          (&self) -> Access<A, ReadOnly>  { self.register(Self::READBACK) }

    /// Sets the direction of every line with a single store.
    pub fn set_direction(&self, mask: RegisterValue) {
        self.direction_register().write(mask);
    }

    pub fn direction(&self) -> RegisterValue {
        self.direction_register().read()
    }

    pub fn write_data(&self, value: RegisterValue) {
        self.data().write(value);
    }

    /// Last value written to DATA (not the pin levels, see [`Gpio::read_pins`]).
    pub fn read_data(&self) -> RegisterValue {
        self.data().read()
    }

    pub fn read_pins(&self) -> RegisterValue {
        self.readback().read()
    }

    /// Establishes new outputs: DIRECTION is written before DATA, so a stale
    /// DATA bit is only ever driven for as long as the caller intended it to be.
    pub fn drive(&self, direction: RegisterValue, value: RegisterValue) {
        self.set_direction(direction);
        self.write_data(value);
    }

    pub fn snapshot(&self) -> GpioSnapshot {
        GpioSnapshot {
            data: self.read_data(),
            direction: self.direction(),
            readback: self.read_pins(),
        }
    }
}

impl<A> Block for Gpio<A>
where A: RegisterAccess,
{
    type Access = A;

    const NAME: &'static str = "GPIO";
    const REGISTERS: &'static [RegisterInfo] = &[
        RegisterInfo::new("DATA",      0x00, Mode::ReadWrite),
        RegisterInfo::new("DIRECTION", 0x04, Mode::ReadWrite),
        RegisterInfo::new("READBACK",  0x08, Mode::ReadOnly),
    ];

    fn window(&self) -> Window {
        self.window
    }

    fn access(&self) -> &A {
        &self.access
    }
}

use core::marker::PhantomData;

pub type RegisterAddress = usize;
pub type RegisterOffset = usize;
pub type RegisterValue = u32;

/// Ordered 32-bit load/store at a physical address.
///
/// Every call reaches the bus: implementations must not cache, buffer,
/// merge or reorder accesses, since reads and writes have side effects on
/// the peripheral. There is no failure path. An access either completes or
/// the address was never valid in the first place, which is a programming
/// error caught by [`Window`] before the access is issued.
pub trait RegisterAccess {
    fn read(&self, base: RegisterAddress, offset: RegisterOffset) -> RegisterValue;
    fn write(&self, base: RegisterAddress, offset: RegisterOffset, value: RegisterValue);
}

impl<A> RegisterAccess for &A
where A: RegisterAccess + ?Sized,
{
    fn read(&self, base: RegisterAddress, offset: RegisterOffset) -> RegisterValue {
        (**self).read(base, offset)
    }

    fn write(&self, base: RegisterAddress, offset: RegisterOffset, value: RegisterValue) {
        (**self).write(base, offset, value)
    }
}

/// Volatile access to physically mapped registers.
#[derive(Copy, Clone, Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every window later accessed through this handle must be mapped at its
    /// physical address, readable and writable as 32-bit words, and not
    /// aliased by anything the compiler believes to be ordinary memory.
    pub const unsafe fn new() -> Self {
        Self {
            _private: (),
        }
    }
}

impl RegisterAccess for Mmio {
    fn read(&self, base: RegisterAddress, offset: RegisterOffset) -> RegisterValue {
        let p = (base + offset) as *const u32;
        unsafe {
            p.read_volatile()
        }
    }

    fn write(&self, base: RegisterAddress, offset: RegisterOffset, value: RegisterValue) {
        let p = (base + offset) as *mut u32;
        unsafe {
            p.write_volatile(value);
        }
    }
}

///////////////////////////////////////////////////////////////////////
// Address windows

/// The address window occupied by one peripheral instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    base: RegisterAddress,
    size: usize,
}

impl Window {
    pub const fn new(base: RegisterAddress, size: usize) -> Self {
        assert!(base & 0x3 == 0, "base & 0x3 == 0");
        assert!(size & 0x3 == 0, "size & 0x3 == 0");
        assert!(size > 0, "size > 0");
        assert!(base.checked_add(size).is_some(), "base + size does not overflow");

        Self {
            base,
            size,
        }
    }

    pub const fn base(&self) -> RegisterAddress {
        self.base
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn end(&self) -> RegisterAddress {
        self.base + self.size
    }

    /// Validates a register offset against this window.
    pub fn check(&self, offset: RegisterOffset) -> RegisterOffset {
        assert!(offset & 0x3 == 0, "offset & 0x3 == 0");
        assert!(offset < self.size, "offset < size");
        offset
    }

    pub fn address(&self, offset: RegisterOffset) -> RegisterAddress {
        self.base + self.check(offset)
    }

    pub const fn contains(&self, address: RegisterAddress) -> bool {
        address >= self.base && address < self.end()
    }

    pub const fn overlaps(&self, other: &Window) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

///////////////////////////////////////////////////////////////////////
// Registers

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    ReadWrite,
    ReadOnly,
}

/// One entry of a register map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    pub name: &'static str,
    pub offset: RegisterOffset,
    pub mode: Mode,
}

impl RegisterInfo {
    pub const fn new(name: &'static str, offset: RegisterOffset, mode: Mode) -> Self {
        assert!(offset & 0x3 == 0, "offset & 0x3 == 0");
        Self {
            name,
            offset,
            mode,
        }
    }
}

pub struct ReadWrite;
pub struct ReadOnly;

/// Handle on a single register of a peripheral window.
pub struct Access<'a, A, M>
where A: RegisterAccess,
{
    access: &'a A,
    window: Window,
    offset: RegisterOffset,
    m: PhantomData<M>,
}

impl<'a, A, M> Access<'a, A, M>
where A: RegisterAccess,
{
    pub(crate) fn new(access: &'a A, window: Window, offset: RegisterOffset) -> Self {
        Self {
            access,
            window,
            offset: window.check(offset),
            m: PhantomData,
        }
    }

    pub fn address(&self) -> RegisterAddress {
        self.window.base() + self.offset
    }

    pub fn read(&self) -> RegisterValue {
        self.access.read(self.window.base(), self.offset)
    }
}

impl<A> Access<'_, A, ReadWrite>
where A: RegisterAccess,
{
    pub fn write(&self, value: RegisterValue) {
        self.access.write(self.window.base(), self.offset, value)
    }

    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(RegisterValue) -> RegisterValue,
    {
        let value = self.read();
        let new_value = f(value);
        self.write(new_value)
    }
}

///////////////////////////////////////////////////////////////////////
// Blocks

/// A peripheral instance: a register map placed in an address window.
pub trait Block {
    type Access: RegisterAccess;

    const NAME: &'static str;
    const REGISTERS: &'static [RegisterInfo];

    fn window(&self) -> Window;
    fn access(&self) -> &Self::Access;

    fn register_read(&self, info: &RegisterInfo) -> RegisterValue {
        let window = self.window();
        self.access().read(window.base(), window.check(info.offset))
    }
}

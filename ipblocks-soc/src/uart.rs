use core::fmt;

use ipblocks_pac::device::{RegisterAccess, RegisterAddress, RegisterOffset, Window};

/// Offensively dumb UART, completely blocks on every transmitted byte.
///
/// Only the transmit side is used: it is the console the bring-up status
/// lines go to.
///
pub struct Uart<A>
where A: RegisterAccess,
{
    access: A,
    window: Window,
}

impl<A> Uart<A>
where A: RegisterAccess,
{
    const TX_DATA: RegisterOffset = 0x10;
    const TX_RDY: RegisterOffset = 0x14;

    pub fn new(access: A, base: RegisterAddress) -> Self {
        Self {
            access,
            window: Window::new(base, 0x18),
        }
    }

    fn tx_data(&self, v: u32) {
        self.access.write(self.window.base(), self.window.check(Self::TX_DATA), v);
    }

    fn tx_rdy(&self) -> bool {
        self.access.read(self.window.base(), self.window.check(Self::TX_RDY)) != 0
    }

    pub fn write_char(&self, c: u8) {
        while !self.tx_rdy() {}
        self.tx_data(c as u32);
    }
}

impl<A> fmt::Write for Uart<A>
where A: RegisterAccess,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &c in s.as_bytes() {
            if c == b'\n' {
                Self::write_char(self, b'\r');
            }
            Self::write_char(self, c);
        }
        Ok(())
    }
}

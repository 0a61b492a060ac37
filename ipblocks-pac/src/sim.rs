//! Hosted model of the GPIO and PWM IP blocks.
//!
//! Behaves like the RTL as far as software can observe it through the
//! register interface. Also keeps a journal of every bus transaction, so
//! ordering of writes can be checked.

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use crate::device::*;
use crate::map::{GPIO_BASE, PWM_BASE};

/// Flags presented in the simulated PWM STATUS register.
pub mod status {
    use crate::device::RegisterValue;

    /// Current level of the PWM output.
    pub const OUTPUT: RegisterValue = 1 << 0;
    /// Generator is running.
    pub const ENABLED: RegisterValue = 1 << 1;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Read { address: RegisterAddress, value: RegisterValue },
    Write { address: RegisterAddress, value: RegisterValue },
}

#[derive(Default)]
struct GpioModel {
    data: Cell<u32>,
    direction: Cell<u32>,
    inputs: Cell<u32>,
}

impl GpioModel {
    fn readback(&self) -> u32 {
        let direction = self.direction.get();
        (self.data.get() & direction) | (self.inputs.get() & !direction)
    }

    fn read(&self, offset: RegisterOffset) -> u32 {
        match offset {
            0x00 => self.data.get(),
            0x04 => self.direction.get(),
            0x08 => self.readback(),
            _ => 0,
        }
    }

    fn write(&self, offset: RegisterOffset, value: u32) {
        match offset {
            0x00 => self.data.set(value),
            0x04 => self.direction.set(value),
            _ => log::trace!("sim: gpio: write to read-only offset {:#04x} ignored", offset),
        }
    }
}

#[derive(Default)]
struct PwmModel {
    control: Cell<u32>,
    period: Cell<u32>,
    duty: Cell<u32>,
    /// Duty cycle the generator is currently producing.
    active_duty: Cell<u32>,
    counter: Cell<u32>,
}

impl PwmModel {
    fn enabled(&self) -> bool {
        self.control.get() & 1 != 0
    }

    fn status(&self) -> u32 {
        if !self.enabled() {
            return 0;
        }

        let mut status = status::ENABLED;
        if self.counter.get() < self.active_duty.get() {
            status |= status::OUTPUT;
        }
        status
    }

    fn tick(&self) {
        if !self.enabled() {
            return;
        }

        let next = self.counter.get().wrapping_add(1);
        if next >= self.period.get() {
            self.counter.set(0);
            self.active_duty.set(self.duty.get());
        } else {
            self.counter.set(next);
        }
    }

    fn read(&self, offset: RegisterOffset) -> u32 {
        match offset {
            0x00 => self.control.get(),
            0x04 => self.period.get(),
            0x08 => self.duty.get(),
            0x0c => self.status(),
            _ => 0,
        }
    }

    fn write(&self, offset: RegisterOffset, value: u32) {
        match offset {
            0x00 => {
                let was_enabled = self.enabled();
                self.control.set(value);
                if was_enabled && !self.enabled() {
                    self.counter.set(0);
                }
                if !self.enabled() {
                    self.active_duty.set(self.duty.get());
                }
            },
            0x04 => self.period.set(value),
            0x08 => {
                self.duty.set(value);
                // A running generator picks up the new duty at the next period boundary.
                if !self.enabled() {
                    self.active_duty.set(value);
                }
            },
            _ => log::trace!("sim: pwm: write to read-only offset {:#04x} ignored", offset),
        }
    }
}

/// A simulated SoC with one GPIO and one PWM instance.
pub struct Simulator {
    gpio_window: Window,
    pwm_window: Window,
    gpio: GpioModel,
    pwm: PwmModel,
    journal: RefCell<Vec<Transaction>>,
}

impl Simulator {
    /// Simulator with both blocks at their SoC addresses.
    pub fn new() -> Self {
        Self::with_bases(GPIO_BASE, PWM_BASE)
    }

    pub fn with_bases(gpio_base: RegisterAddress, pwm_base: RegisterAddress) -> Self {
        let gpio_window = Window::new(gpio_base, crate::map::GPIO_WINDOW.size());
        let pwm_window = Window::new(pwm_base, crate::map::PWM_WINDOW.size());
        assert!(!gpio_window.overlaps(&pwm_window), "GPIO and PWM windows are disjoint");

        Self {
            gpio_window,
            pwm_window,
            gpio: GpioModel::default(),
            pwm: PwmModel::default(),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// Levels driven onto the pins from outside the chip. Only visible in
    /// READBACK for lines configured as inputs.
    pub fn set_input_levels(&self, levels: RegisterValue) {
        self.gpio.inputs.set(levels);
    }

    /// Advances the PWM counter by `ticks` timer ticks.
    pub fn tick(&self, ticks: u32) {
        for _ in 0..ticks {
            self.pwm.tick();
        }
    }

    pub fn journal(&self) -> Vec<Transaction> {
        self.journal.borrow().clone()
    }

    /// Every write issued so far, as `(address, value)`.
    pub fn writes(&self) -> Vec<(RegisterAddress, RegisterValue)> {
        self.journal.borrow().iter().filter_map(|t| match *t {
            Transaction::Write { address, value } => Some((address, value)),
            Transaction::Read { .. } => None,
        }).collect()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    fn decode(&self, base: RegisterAddress, offset: RegisterOffset) -> (RegisterAddress, bool) {
        assert!(offset & 0x3 == 0, "offset & 0x3 == 0");
        let address = base + offset;
        if self.gpio_window.contains(address) {
            (address - self.gpio_window.base(), true)
        } else if self.pwm_window.contains(address) {
            (address - self.pwm_window.base(), false)
        } else {
            panic!("access to unmapped address {:#010x}", address);
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAccess for Simulator {
    fn read(&self, base: RegisterAddress, offset: RegisterOffset) -> RegisterValue {
        let value = match self.decode(base, offset) {
            (offset, true) => self.gpio.read(offset),
            (offset, false) => self.pwm.read(offset),
        };
        let address = base + offset;
        log::trace!("sim: read  {:#010x} -> {:#010x}", address, value);
        self.journal.borrow_mut().push(Transaction::Read { address, value });
        value
    }

    fn write(&self, base: RegisterAddress, offset: RegisterOffset, value: RegisterValue) {
        match self.decode(base, offset) {
            (offset, true) => self.gpio.write(offset, value),
            (offset, false) => self.pwm.write(offset, value),
        }
        let address = base + offset;
        log::trace!("sim: write {:#010x} <- {:#010x}", address, value);
        self.journal.borrow_mut().push(Transaction::Write { address, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_mixes_outputs_and_inputs() {
        let sim = Simulator::new();
        sim.set_input_levels(0xffff_ffff);
        sim.write(GPIO_BASE, 0x04, 0xff00_0000);
        sim.write(GPIO_BASE, 0x00, 0x0000_0000);
        assert_eq!(sim.read(GPIO_BASE, 0x08), 0x00ff_ffff);
    }

    #[test]
    fn read_only_registers_ignore_writes() {
        let sim = Simulator::new();
        sim.write(GPIO_BASE, 0x08, 0xffff_ffff);
        assert_eq!(sim.read(GPIO_BASE, 0x08), 0);
        sim.write(PWM_BASE, 0x0c, 0xffff_ffff);
        assert_eq!(sim.read(PWM_BASE, 0x0c), 0);
    }

    #[test]
    fn duty_change_waits_for_period_boundary() {
        let sim = Simulator::new();
        sim.write(PWM_BASE, 0x04, 4);
        sim.write(PWM_BASE, 0x08, 1);
        sim.write(PWM_BASE, 0x00, 1);

        sim.tick(1);
        assert_eq!(sim.read(PWM_BASE, 0x0c) & status::OUTPUT, 0);

        sim.write(PWM_BASE, 0x08, 3);
        sim.tick(1);
        assert_eq!(sim.read(PWM_BASE, 0x0c) & status::OUTPUT, 0);

        // Boundary.
        sim.tick(2);
        assert_eq!(sim.read(PWM_BASE, 0x0c) & status::OUTPUT, status::OUTPUT);
        sim.tick(2);
        assert_eq!(sim.read(PWM_BASE, 0x0c) & status::OUTPUT, status::OUTPUT);
        sim.tick(1);
        assert_eq!(sim.read(PWM_BASE, 0x0c) & status::OUTPUT, 0);
    }

    #[test]
    fn journal_records_transactions_in_order() {
        let sim = Simulator::new();
        sim.write(PWM_BASE, 0x04, 1000);
        let _ = sim.read(PWM_BASE, 0x04);

        assert_eq!(sim.journal(), [
            Transaction::Write { address: PWM_BASE + 4, value: 1000 },
            Transaction::Read { address: PWM_BASE + 4, value: 1000 },
        ]);

        sim.clear_journal();
        assert!(sim.journal().is_empty());
    }

    #[test]
    #[should_panic(expected="access to unmapped address 0x30000000")]
    fn unmapped_access() {
        let sim = Simulator::new();
        let _ = sim.read(0x3000_0000, 0);
    }

    #[test]
    #[should_panic(expected="offset & 0x3 == 0")]
    fn misaligned_access() {
        let sim = Simulator::new();
        sim.write(GPIO_BASE, 0x6, 0);
    }
}

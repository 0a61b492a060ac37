//! Bring-up sequences for the GPIO and PWM blocks.
//!
//! Each sequence drives a controller through a fixed set of operations and
//! reports register contents as status lines of the form
//! `GPIO_DIRECTION = 0xffffffff` to any [`core::fmt::Write`] sink. Nothing
//! here judges the values read back. A mismatch is for the person reading
//! the console to spot.

use core::fmt::{self, Write};

use crate::device::*;
use crate::gpio::Gpio;
use crate::pwm::Pwm;

pub const DEFAULT_PACE_ITERATIONS: u32 = 100_000;

/// Approximate pacing between steps of a sequence.
pub trait Pace {
    fn pace(&mut self);
}

impl<F: FnMut()> Pace for F {
    fn pace(&mut self) {
        self()
    }
}

/// Spins for a fixed number of iterations.
///
/// The iteration count has no time unit. It only makes transitions slow
/// enough to see on an LED or a scope.
#[derive(Copy, Clone, Debug)]
pub struct BusyWait {
    iterations: u32,
}

impl BusyWait {
    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations,
        }
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for BusyWait {
    fn default() -> Self {
        Self::new(DEFAULT_PACE_ITERATIONS)
    }
}

impl Pace for BusyWait {
    fn pace(&mut self) {
        for i in 0..self.iterations {
            core::hint::black_box(i);
        }
    }
}

/// External request to stop a running sequence. Polled before every step.
pub trait Cancel {
    fn is_cancelled(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Cancel for F {
    fn is_cancelled(&mut self) -> bool {
        self()
    }
}

/// Never cancels: the sequence runs until reset.
#[derive(Copy, Clone, Debug, Default)]
pub struct Forever;

impl Cancel for Forever {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

/// Allows `n` steps, then cancels.
#[derive(Copy, Clone, Debug)]
pub struct Steps(pub usize);

impl Cancel for Steps {
    fn is_cancelled(&mut self) -> bool {
        match self.0 {
            0 => true,
            _ => {
                self.0 -= 1;
                false
            },
        }
    }
}

pub fn report<W: Write>(out: &mut W, block: &str, register: &str, value: RegisterValue) -> fmt::Result {
    writeln!(out, "{}_{} = 0x{:08x}", block, register, value)
}

/// Reports every register of a block.
pub fn dump<B: Block, W: Write>(block: &B, out: &mut W) -> fmt::Result {
    for info in B::REGISTERS {
        report(out, B::NAME, info.name, block.register_read(info))?;
    }
    Ok(())
}

///////////////////////////////////////////////////////////////////////
// GPIO

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpioSequence {
    /// Direction for the first step, usually every line an output.
    pub outputs: RegisterValue,
    pub pattern: RegisterValue,
    /// Direction after narrowing.
    pub narrowed: RegisterValue,
}

impl Default for GpioSequence {
    fn default() -> Self {
        Self {
            outputs: 0xffff_ffff,
            pattern: 0x1234_5678,
            narrowed: 0xffff_0000,
        }
    }
}

/// Register values observed while running a [`GpioSequence`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GpioReport {
    pub direction: RegisterValue,
    pub data: RegisterValue,
    pub readback: RegisterValue,
    pub narrowed_direction: RegisterValue,
    pub narrowed_data: RegisterValue,
    pub narrowed_readback: RegisterValue,
}

pub fn exercise_gpio<A, W>(gpio: &Gpio<A>, sequence: &GpioSequence, out: &mut W) -> Result<GpioReport, fmt::Error>
where A: RegisterAccess,
      W: Write,
{
    let mut r = GpioReport::default();

    writeln!(out, "=== GPIO Control IP Software Test ===")?;

    writeln!(out, "[TEST 1] Setting GPIO_DIRECTION to 0x{:08x}", sequence.outputs)?;
    gpio.set_direction(sequence.outputs);
    r.direction = gpio.direction();
    report(out, "GPIO", "DIRECTION", r.direction)?;

    writeln!(out, "[TEST 2] Writing 0x{:08x} to GPIO_DATA", sequence.pattern)?;
    gpio.write_data(sequence.pattern);
    r.data = gpio.read_data();
    r.readback = gpio.read_pins();
    report(out, "GPIO", "DATA", r.data)?;
    report(out, "GPIO", "READBACK", r.readback)?;

    writeln!(out, "[TEST 3] Setting GPIO_DIRECTION to 0x{:08x}", sequence.narrowed)?;
    gpio.set_direction(sequence.narrowed);
    r.narrowed_direction = gpio.direction();
    r.narrowed_data = gpio.read_data();
    r.narrowed_readback = gpio.read_pins();
    report(out, "GPIO", "DIRECTION", r.narrowed_direction)?;
    report(out, "GPIO", "DATA", r.narrowed_data)?;
    report(out, "GPIO", "READBACK", r.narrowed_readback)?;

    writeln!(out, "=== All software tests complete ===")?;

    Ok(r)
}

///////////////////////////////////////////////////////////////////////
// PWM

pub const DEFAULT_PERIOD: RegisterValue = 1000;
pub const DEFAULT_DUTIES: [RegisterValue; 3] = [100, 500, 900];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PwmSequence<'a> {
    period: RegisterValue,
    duties: &'a [RegisterValue],
}

impl<'a> PwmSequence<'a> {
    pub fn new(period: RegisterValue, duties: &'a [RegisterValue]) -> Self {
        assert!(period > 0, "period > 0");
        assert!(!duties.is_empty(), "!duties.is_empty()");
        assert!(duties.iter().all(|&d| d <= period), "duty <= period");

        Self {
            period,
            duties,
        }
    }

    pub fn period(&self) -> RegisterValue {
        self.period
    }

    pub fn duties(&self) -> &'a [RegisterValue] {
        self.duties
    }
}

impl Default for PwmSequence<'static> {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, &DEFAULT_DUTIES)
    }
}

/// Configures the period, enables the output, then steps through the duty
/// values until cancelled, wrapping around at the end of the list.
///
/// Returns the number of duty steps applied.
pub fn cycle_pwm<A, P, C, W>(pwm: &Pwm<A>, sequence: &PwmSequence, pace: &mut P, cancel: &mut C, out: &mut W) -> Result<usize, fmt::Error>
where A: RegisterAccess,
      P: Pace,
      C: Cancel,
      W: Write,
{
    writeln!(out, "=== PWM duty cycle ===")?;

    let duties = sequence.duties();
    pwm.configure(sequence.period(), duties[0]);
    pwm.enable();
    report(out, "PWM", "PERIOD", pwm.period())?;
    report(out, "PWM", "CONTROL", pwm.control())?;

    let mut steps = 0;
    for &duty in duties.iter().cycle() {
        if cancel.is_cancelled() {
            break;
        }

        // The first duty went out with PERIOD.
        if steps > 0 {
            pwm.set_duty(duty);
        }
        report(out, "PWM", "DUTY", pwm.duty())?;
        report(out, "PWM", "STATUS", pwm.read_status())?;
        steps += 1;

        pace.pace();
    }

    writeln!(out, "=== PWM stopped after {} steps ===", steps)?;

    Ok(steps)
}

/// Configures and enables the output once, then watches STATUS until
/// cancelled, reporting every change.
///
/// Returns the number of STATUS polls.
pub fn hold_pwm<A, P, C, W>(pwm: &Pwm<A>, period: RegisterValue, duty: RegisterValue, pace: &mut P, cancel: &mut C, out: &mut W) -> Result<usize, fmt::Error>
where A: RegisterAccess,
      P: Pace,
      C: Cancel,
      W: Write,
{
    writeln!(out, "=== PWM hold ===")?;

    pwm.configure(period, duty);
    pwm.enable();
    report(out, "PWM", "PERIOD", pwm.period())?;
    report(out, "PWM", "DUTY", pwm.duty())?;
    report(out, "PWM", "CONTROL", pwm.control())?;

    let mut polls = 0;
    let mut last = None;
    while !cancel.is_cancelled() {
        let status = pwm.read_status();
        polls += 1;
        if last != Some(status) {
            report(out, "PWM", "STATUS", status)?;
            last = Some(status);
        }

        pace.pace();
    }

    writeln!(out, "=== PWM hold stopped after {} polls ===", polls)?;

    Ok(polls)
}

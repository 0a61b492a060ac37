#![no_std]
#![no_main]

extern crate panic_halt;

use core::fmt::Write;

use riscv_rt::entry;

use ipblocks_pac::device::{Mmio, RegisterAddress};
use ipblocks_pac::gpio::Gpio;
use ipblocks_pac::harness::{self, Forever, GpioSequence, Pace, PwmSequence, Cancel};
use ipblocks_pac::map::{GPIO_BASE, PWM_BASE};
use ipblocks_pac::pwm::Pwm;

#[cfg(feature = "calibrated-delay")]
mod delay;
mod uart;

use uart::Uart;

const UART_BASE: RegisterAddress = 0x4000_0000;

#[cfg(feature = "calibrated-delay")]
const CPU_HZ: u32 = 60_000_000;
#[cfg(feature = "calibrated-delay")]
const PACE_MS: u32 = 500;

fn run_gpio(gpio: &Gpio<Mmio>, uart: &mut Uart<Mmio>) {
    if harness::exercise_gpio(gpio, &GpioSequence::default(), uart).is_err() {
        let _ = uart.write_str("gpio: console write failed\n");
    }
}

fn run_pwm<P: Pace, C: Cancel>(pwm: &Pwm<Mmio>, pace: &mut P, cancel: &mut C, uart: &mut Uart<Mmio>) {
    let sequence = PwmSequence::default();
    if harness::cycle_pwm(pwm, &sequence, pace, cancel, uart).is_err() {
        let _ = uart.write_str("pwm: console write failed\n");
    }
}

#[entry]
fn main() -> ! {
    // SAFETY: The GPIO, PWM and UART windows are wired into the SoC bus at
    // the addresses of the memory map, and nothing else references them.
    let mmio = unsafe { Mmio::new() };

    let mut uart = Uart::new(mmio, UART_BASE);
    let gpio = Gpio::new(mmio, GPIO_BASE);
    let pwm = Pwm::new(mmio, PWM_BASE);

    run_gpio(&gpio, &mut uart);

    #[cfg(feature = "calibrated-delay")]
    let mut pace = delay::DelayPace::new(riscv::delay::McycleDelay::new(CPU_HZ), PACE_MS);
    #[cfg(not(feature = "calibrated-delay"))]
    let mut pace = harness::BusyWait::default();

    if cfg!(feature = "bringup") {
        let mut once = harness::Steps(PwmSequence::default().duties().len());
        run_pwm(&pwm, &mut pace, &mut once, &mut uart);
    } else {
        run_pwm(&pwm, &mut pace, &mut Forever, &mut uart);
    }

    loop {
        // SAFETY: No interrupts are enabled, so this only idles the hart.
        unsafe { riscv::asm::wfi() };
    }
}

//! Physical memory map of the SoC.

use crate::device::{RegisterAddress, Window};

pub const GPIO_BASE: RegisterAddress = 0x2000_0000;
pub const GPIO_WINDOW: Window = Window::new(GPIO_BASE, 0x10);

pub const PWM_BASE: RegisterAddress = 0x4000_1000;
pub const PWM_WINDOW: Window = Window::new(PWM_BASE, 0x10);

const _: () = assert!(!GPIO_WINDOW.overlaps(&PWM_WINDOW), "GPIO and PWM windows overlap");

//! Register-level access to the GPIO controller and PWM generator IP blocks.
//!
//! Controllers are generic over [`device::RegisterAccess`], so the same code
//! drives the hardware through [`device::Mmio`], a hosted mapping of the
//! physical windows, or the [`sim`] model.

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod device;
pub mod gpio;
pub mod harness;
pub mod map;
pub mod pwm;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

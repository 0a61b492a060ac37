use embedded_hal::blocking::delay::DelayMs;

use ipblocks_pac::harness::Pace;

/// Paces in milliseconds through any `embedded-hal` delay provider.
pub struct DelayPace<D> {
    delay: D,
    ms: u32,
}

impl<D> DelayPace<D>
where D: DelayMs<u32>,
{
    pub fn new(delay: D, ms: u32) -> Self {
        Self {
            delay,
            ms,
        }
    }
}

impl<D> Pace for DelayPace<D>
where D: DelayMs<u32>,
{
    fn pace(&mut self) {
        self.delay.delay_ms(self.ms);
    }
}

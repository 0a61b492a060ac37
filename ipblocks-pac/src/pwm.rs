use crate::device::*;
use crate::map::PWM_WINDOW;

/// PWM generator IP block
///
/// | Offset | Register | Access | Contents |
/// |--------|----------|--------|----------|
/// | 0x00   | CONTROL  | R/W    | bit 0: enable. Other bits reserved. |
/// | 0x04   | PERIOD   | R/W    | Period in timer ticks. Must be non-zero. |
/// | 0x08   | DUTY     | R/W    | On-time in timer ticks, `0 <= duty <= period`. |
/// | 0x0C   | STATUS   | RO     | Implementation-defined flags. |
///
/// The generator applies a new DUTY at the next period boundary, so duty
/// may be changed while enabled. Out-of-range duty values are clamped by
/// the hardware to always-on or always-off.
///
pub struct Pwm<A>
where A: RegisterAccess,
{
    access: A,
    window: Window,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PwmSnapshot {
    pub control: RegisterValue,
    pub period: RegisterValue,
    pub duty: RegisterValue,
    pub status: RegisterValue,
}

impl<A> Pwm<A>
where A: RegisterAccess,
{
    pub const CONTROL: RegisterOffset = 0x00;
    pub const PERIOD: RegisterOffset = 0x04;
    pub const DUTY: RegisterOffset = 0x08;
    pub const STATUS: RegisterOffset = 0x0c;

    pub const CONTROL_ENABLE: RegisterValue = 1 << 0;

    pub const WINDOW_SIZE: usize = PWM_WINDOW.size();

    pub fn new(access: A, base: RegisterAddress) -> Self {
        Self {
            access,
            window: Window::new(base, Self::WINDOW_SIZE),
        }
    }

    fn register<M>(&self, offset: RegisterOffset) -> Access<'_, A, M> {
        Access::new(&self.access, self.window, offset)
    }

    pub fn control_register(&self) -> Access<A, ReadWrite> { self.register(Self::CONTROL) }
    pub fn period_register (&self) -> Access<A, ReadWrite> { self.register(Self::PERIOD) }
    pub fn duty_register   (&self) -> Access<A, ReadWrite> { self.register(Self::DUTY) }
    pub fn status_register (&self) -> Access<A, ReadOnly>  { self.register(Self::STATUS) }

    /// Programs PERIOD, then DUTY.
    ///
    /// `period` must be non-zero and `duty` no larger than `period` for the
    /// duty ratio to be defined. Neither is enforced; the hardware decides
    /// what happens otherwise.
    pub fn configure(&self, period: RegisterValue, duty: RegisterValue) {
        if period == 0 {
            log::warn!("pwm: period is zero, duty ratio is undefined");
        } else if duty > period {
            log::warn!("pwm: duty {} exceeds period {}", duty, period);
        }

        self.period_register().write(period);
        self.duty_register().write(duty);
    }

    pub fn enable(&self) {
        self.control_register().modify(|m| m | Self::CONTROL_ENABLE);
    }

    pub fn disable(&self) {
        self.control_register().modify(|m| m & !Self::CONTROL_ENABLE);
    }

    pub fn is_enabled(&self) -> bool {
        self.control() & Self::CONTROL_ENABLE != 0
    }

    /// Changes DUTY alone, leaving PERIOD and CONTROL untouched.
    pub fn set_duty(&self, duty: RegisterValue) {
        self.duty_register().write(duty);
    }

    pub fn control(&self) -> RegisterValue {
        self.control_register().read()
    }

    pub fn period(&self) -> RegisterValue {
        self.period_register().read()
    }

    pub fn duty(&self) -> RegisterValue {
        self.duty_register().read()
    }

    pub fn read_status(&self) -> RegisterValue {
        self.status_register().read()
    }

    pub fn snapshot(&self) -> PwmSnapshot {
        PwmSnapshot {
            control: self.control(),
            period: self.period(),
            duty: self.duty(),
            status: self.read_status(),
        }
    }
}

impl<A> Block for Pwm<A>
where A: RegisterAccess,
{
    type Access = A;

    const NAME: &'static str = "PWM";
    const REGISTERS: &'static [RegisterInfo] = &[
        RegisterInfo::new("CONTROL", 0x00, Mode::ReadWrite),
        RegisterInfo::new("PERIOD",  0x04, Mode::ReadWrite),
        RegisterInfo::new("DUTY",    0x08, Mode::ReadWrite),
        RegisterInfo::new("STATUS",  0x0c, Mode::ReadOnly),
    ];

    fn window(&self) -> Window {
        self.window
    }

    fn access(&self) -> &A {
        &self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PWM_BASE;
    use crate::sim::Simulator;

    type SimPwm<'a> = Pwm<&'a Simulator>;

    fn pwm(sim: &Simulator) -> SimPwm<'_> {
        Pwm::new(sim, PWM_BASE)
    }

    #[test]
    fn configure_reads_back() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.configure(1000, 500);
        assert_eq!(pwm.period(), 1000);
        assert_eq!(pwm.duty(), 500);

        for (period, duty) in [(1, 0), (1, 1), (0xffff_ffff, 0x8000_0000), (250, 250)] {
            pwm.configure(period, duty);
            assert_eq!(pwm.period(), period);
            assert_eq!(pwm.duty(), duty);
        }
    }

    #[test]
    fn configure_writes_out_of_range_values_unchanged() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.configure(0, 5);
        assert_eq!((pwm.period(), pwm.duty()), (0, 5));

        pwm.configure(10, 20);
        assert_eq!((pwm.period(), pwm.duty()), (10, 20));

        assert_eq!(sim.writes(), [
            (PWM_BASE + SimPwm::PERIOD, 0),
            (PWM_BASE + SimPwm::DUTY, 5),
            (PWM_BASE + SimPwm::PERIOD, 10),
            (PWM_BASE + SimPwm::DUTY, 20),
        ]);
    }

    #[test]
    fn configure_writes_period_before_duty() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.configure(1000, 100);

        assert_eq!(sim.writes(), [
            (PWM_BASE + SimPwm::PERIOD, 1000),
            (PWM_BASE + SimPwm::DUTY, 100),
        ]);
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.enable();
        assert_eq!(pwm.control() & 1, 1);
        pwm.enable();
        assert_eq!(pwm.control() & 1, 1);
        assert!(pwm.is_enabled());

        pwm.disable();
        assert_eq!(pwm.control() & 1, 0);
        pwm.disable();
        assert_eq!(pwm.control() & 1, 0);
        assert!(!pwm.is_enabled());
    }

    #[test]
    fn enable_and_disable_preserve_reserved_bits() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.control_register().write(0xa5a5_a5a4);

        pwm.enable();
        assert_eq!(pwm.control(), 0xa5a5_a5a5);
        pwm.enable();
        assert_eq!(pwm.control(), 0xa5a5_a5a5);

        pwm.disable();
        assert_eq!(pwm.control(), 0xa5a5_a5a4);
        pwm.disable();
        assert_eq!(pwm.control(), 0xa5a5_a5a4);
    }

    #[test]
    fn set_duty_leaves_period_alone() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        let period = pwm.period();
        pwm.set_duty(700);
        assert_eq!(pwm.period(), period);
        assert_eq!(pwm.duty(), 700);

        pwm.configure(1000, 500);
        pwm.set_duty(900);
        assert_eq!(pwm.period(), 1000);
        assert_eq!(pwm.duty(), 900);
        assert_eq!(sim.writes().last(), Some(&(PWM_BASE + SimPwm::DUTY, 900)));
    }

    #[test]
    fn status_reflects_output() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.configure(10, 3);
        assert_eq!(pwm.read_status(), 0);

        pwm.enable();
        assert_eq!(pwm.read_status(), 0b11);
        sim.tick(3);
        assert_eq!(pwm.read_status(), 0b10);
        sim.tick(7);
        assert_eq!(pwm.read_status(), 0b11);
    }

    #[test]
    fn snapshot() {
        let sim = Simulator::new();
        let pwm = pwm(&sim);

        pwm.configure(1000, 500);
        pwm.enable();
        assert_eq!(pwm.snapshot(), PwmSnapshot {
            control: 1,
            period: 1000,
            duty: 500,
            status: 0b11,
        });
    }
}

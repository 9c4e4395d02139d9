use embedded_hal::digital::InputPin;

/// Hardware alert outputs of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertLine {
    PowerValid,
    Critical,
    Warning,
    TimingControl,
}

impl AlertLine {
    pub const ALL: [AlertLine; 4] = [
        AlertLine::PowerValid,
        AlertLine::Critical,
        AlertLine::Warning,
        AlertLine::TimingControl,
    ];
}

/// Source of the instantaneous alert line levels.
pub trait AlertInput {
    type Error;

    fn is_asserted(&mut self, line: AlertLine) -> Result<bool, Self::Error>;
}

/// Alert lines wired to GPIO inputs.
///
/// The outputs are open-drain and active low, so a line reading low is asserted.
pub struct AlertPins<P> {
    pub power_valid: P,
    pub critical: P,
    pub warning: P,
    pub timing_control: P,
}

impl<P> AlertPins<P> {
    fn pin(&mut self, line: AlertLine) -> &mut P {
        match line {
            AlertLine::PowerValid => &mut self.power_valid,
            AlertLine::Critical => &mut self.critical,
            AlertLine::Warning => &mut self.warning,
            AlertLine::TimingControl => &mut self.timing_control,
        }
    }
}

impl<P> AlertInput for AlertPins<P>
where
    P: InputPin,
{
    type Error = P::Error;

    fn is_asserted(&mut self, line: AlertLine) -> Result<bool, Self::Error> {
        self.pin(line).is_low()
    }
}

/// Placeholder for a device without alert lines connected.
pub struct NoAlertPins;

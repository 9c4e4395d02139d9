#![no_std]

use embedded_hal::i2c::I2c;
use register_access::{RegisterReader, RegisterWriter, SmbusI2c, WordAccess};

#[macro_use]
mod fmt;

pub mod alert;
pub mod descriptors;
pub mod ll;
pub mod status;
pub mod units;

pub use alert::{AlertInput, AlertLine, AlertPins, NoAlertPins};
pub use descriptors::{AveragingMode, Configuration, ConversionTime, MaskEnable, OperatingMode};
pub use status::{describe_config, AlertLevels, ConfigDescription};

use crate::units::Limit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed. The error is passed on unchanged.
    Bus(E),
    /// Channel number outside of 1..=3.
    InvalidChannel(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

impl<E> From<InvalidChannel> for Error<E> {
    fn from(err: InvalidChannel) -> Self {
        Error::InvalidChannel(err.0)
    }
}

/// One of the three measurement channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Ch1, Channel::Ch2, Channel::Ch3];

    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Address of this channel's instance of a channel-indexed register.
    ///
    /// Channel registers are interleaved, so consecutive channels are two addresses apart.
    pub const fn register(self, first: u8) -> u8 {
        first + (self as u8 - 1) * 2
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        match channel {
            1 => Ok(Channel::Ch1),
            2 => Ok(Channel::Ch2),
            3 => Ok(Channel::Ch3),
            _ => Err(InvalidChannel(channel)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// 7-bit device address.
    pub address: u8,

    /// Shunt resistor value, in Ohms. The same resistor value is assumed on every channel.
    pub shunt_resistor_ohms: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: ll::DEFAULT_ADDRESS,
            shunt_resistor_ohms: 0.1,
        }
    }
}

/// INA3221 driver.
///
/// The handle caches the last configuration word it read or wrote. It does no locking of its
/// own: when shared between threads, every call must be serialized by the owner.
pub struct Ina3221<B, A = NoAlertPins> {
    iface: ll::Ina3221Interface<B>,
    alerts: A,
    shunt_resistor_ohms: f32,
    config: Configuration,
}

impl<B> Ina3221<B>
where
    B: WordAccess,
{
    /// Creates a driver and reads the current configuration from the device.
    pub fn new(bus: B, settings: Settings) -> Result<Self, Error<B::Error>> {
        let mut this = Self::unconfigured(bus, settings);
        this.config = Configuration::read(&mut this.iface).map_err(Error::Bus)?;
        Ok(this)
    }

    /// Creates a driver and writes `config` to the device.
    pub fn with_configuration(
        bus: B,
        settings: Settings,
        config: Configuration,
    ) -> Result<Self, Error<B::Error>> {
        let mut this = Self::unconfigured(bus, settings);
        this.write_configuration(config)?;
        Ok(this)
    }

    fn unconfigured(bus: B, settings: Settings) -> Self {
        Self {
            iface: ll::Ina3221Interface {
                bus,
                address: settings.address,
            },
            alerts: NoAlertPins,
            shunt_resistor_ohms: settings.shunt_resistor_ohms,
            config: Configuration::default(),
        }
    }
}

impl<I> Ina3221<SmbusI2c<I>>
where
    I: I2c,
{
    pub fn new_i2c(i2c: I, settings: Settings) -> Result<Self, Error<I::Error>> {
        Self::new(SmbusI2c::new(i2c), settings)
    }
}

impl<B, A> Ina3221<B, A> {
    /// Attaches the alert line inputs.
    pub fn with_alert_pins<P>(self, alerts: P) -> Ina3221<B, P>
    where
        P: AlertInput,
    {
        Ina3221 {
            iface: self.iface,
            alerts,
            shunt_resistor_ohms: self.shunt_resistor_ohms,
            config: self.config,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            address: self.iface.address,
            shunt_resistor_ohms: self.shunt_resistor_ohms,
        }
    }

    /// Returns the last configuration read from or written to the device.
    pub fn configuration(&self) -> Configuration {
        self.config
    }

    pub fn interface(&mut self) -> &mut ll::Ina3221Interface<B> {
        &mut self.iface
    }

    pub fn release(self) -> (B, A) {
        (self.iface.bus, self.alerts)
    }
}

impl<B, A> Ina3221<B, A>
where
    B: WordAccess,
{
    pub fn read_configuration(&mut self) -> Result<Configuration, Error<B::Error>> {
        let config = Configuration::read(&mut self.iface).map_err(Error::Bus)?;
        self.config = config;
        Ok(config)
    }

    /// Writes the configuration register. This is also how conversions are triggered in the
    /// single-shot modes.
    pub fn write_configuration(&mut self, config: Configuration) -> Result<(), Error<B::Error>> {
        debug!("INA3221 configuration: {}", config.bits());
        config.write(&mut self.iface).map_err(Error::Bus)?;
        self.config = config;
        Ok(())
    }

    /// Resets every register to its power-on default. The device clears the reset bit itself.
    ///
    /// The cached configuration is set to the power-on default without reading it back. Call
    /// [`Self::read_configuration`] to refresh it from the device.
    pub fn reset(&mut self) -> Result<(), Error<B::Error>> {
        debug!("INA3221 reset");
        Configuration::from_bits(0)
            .reset()
            .write(true)
            .write(&mut self.iface)
            .map_err(Error::Bus)?;
        self.config = Configuration::default();
        Ok(())
    }

    /// Puts the device into power down.
    ///
    /// This replaces the whole configuration word: channel enables, averaging and conversion
    /// times are cleared too and must be written again before measuring.
    pub fn power_down(&mut self) -> Result<(), Error<B::Error>> {
        debug!("INA3221 power down");
        let config = Configuration::from_bits(0)
            .mode()
            .write(OperatingMode::PowerDown2);
        self.write_configuration(config)
    }

    pub fn raw_bus_voltage(&mut self, channel: Channel) -> Result<i16, Error<B::Error>> {
        self.read_signed(channel.register(ll::BUS_VOLTAGE_1))
    }

    pub fn raw_shunt_voltage(&mut self, channel: Channel) -> Result<i16, Error<B::Error>> {
        self.read_signed(channel.register(ll::SHUNT_VOLTAGE_1))
    }

    /// Returns the bus voltage in V.
    pub fn bus_voltage_v(&mut self, channel: Channel) -> Result<f32, Error<B::Error>> {
        self.raw_bus_voltage(channel)
            .map(units::raw_to_bus_voltage_v)
    }

    /// Returns the shunt voltage in mV.
    pub fn shunt_voltage_mv(&mut self, channel: Channel) -> Result<f32, Error<B::Error>> {
        self.raw_shunt_voltage(channel)
            .map(units::raw_to_shunt_voltage_mv)
    }

    /// Returns the current through the shunt resistor in mA.
    pub fn current_ma(&mut self, channel: Channel) -> Result<f32, Error<B::Error>> {
        let shunt_mv = self.shunt_voltage_mv(channel)?;
        Ok(units::shunt_voltage_to_current_ma(
            shunt_mv,
            self.shunt_resistor_ohms,
        ))
    }

    pub fn critical_alert_limit_mv(&mut self, channel: Channel) -> Result<f32, Error<B::Error>> {
        self.read_signed(channel.register(ll::CRITICAL_ALERT_LIMIT_1))
            .map(units::raw_to_shunt_voltage_mv)
    }

    pub fn set_critical_alert_limit_mv(
        &mut self,
        channel: Channel,
        limit_mv: f32,
    ) -> Result<(), Error<B::Error>> {
        self.write_limit(
            channel.register(ll::CRITICAL_ALERT_LIMIT_1),
            Limit::Shunt,
            limit_mv,
        )
    }

    pub fn warning_alert_limit_mv(&mut self, channel: Channel) -> Result<f32, Error<B::Error>> {
        self.read_signed(channel.register(ll::WARNING_ALERT_LIMIT_1))
            .map(units::raw_to_shunt_voltage_mv)
    }

    pub fn set_warning_alert_limit_mv(
        &mut self,
        channel: Channel,
        limit_mv: f32,
    ) -> Result<(), Error<B::Error>> {
        self.write_limit(
            channel.register(ll::WARNING_ALERT_LIMIT_1),
            Limit::Shunt,
            limit_mv,
        )
    }

    /// Returns the sum of the shunt voltages of the channels selected in Mask/Enable, in mV.
    pub fn shunt_voltage_sum_mv(&mut self) -> Result<f32, Error<B::Error>> {
        self.read_signed(ll::SHUNT_VOLTAGE_SUM)
            .map(units::raw_to_shunt_voltage_mv)
    }

    pub fn shunt_voltage_sum_limit_mv(&mut self) -> Result<f32, Error<B::Error>> {
        self.read_signed(ll::SHUNT_VOLTAGE_SUM_LIMIT)
            .map(units::raw_to_shunt_voltage_mv)
    }

    pub fn set_shunt_voltage_sum_limit_mv(&mut self, limit_mv: f32) -> Result<(), Error<B::Error>> {
        self.write_limit(ll::SHUNT_VOLTAGE_SUM_LIMIT, Limit::ShuntSum, limit_mv)
    }

    pub fn power_valid_upper_limit_v(&mut self) -> Result<f32, Error<B::Error>> {
        self.read_signed(ll::POWER_VALID_UPPER_LIMIT)
            .map(units::raw_to_power_valid_v)
    }

    pub fn set_power_valid_upper_limit_v(&mut self, limit_v: f32) -> Result<(), Error<B::Error>> {
        self.write_limit(ll::POWER_VALID_UPPER_LIMIT, Limit::PowerValid, limit_v)
    }

    pub fn power_valid_lower_limit_v(&mut self) -> Result<f32, Error<B::Error>> {
        self.read_signed(ll::POWER_VALID_LOWER_LIMIT)
            .map(units::raw_to_power_valid_v)
    }

    pub fn set_power_valid_lower_limit_v(&mut self, limit_v: f32) -> Result<(), Error<B::Error>> {
        self.write_limit(ll::POWER_VALID_LOWER_LIMIT, Limit::PowerValid, limit_v)
    }

    /// Reads the warning and critical limits of every channel.
    pub fn read_alert_levels(&mut self) -> Result<AlertLevels, Error<B::Error>> {
        let mut levels = AlertLevels::default();
        for (idx, channel) in Channel::ALL.into_iter().enumerate() {
            levels.warning_mv[idx] = self.warning_alert_limit_mv(channel)?;
            levels.critical_mv[idx] = self.critical_alert_limit_mv(channel)?;
        }
        Ok(levels)
    }

    pub fn read_mask_enable(&mut self) -> Result<MaskEnable, Error<B::Error>> {
        MaskEnable::read(&mut self.iface).map_err(Error::Bus)
    }

    pub fn write_mask_enable(&mut self, mask: MaskEnable) -> Result<(), Error<B::Error>> {
        debug!("INA3221 mask/enable: {}", mask.bits());
        mask.write(&mut self.iface).map_err(Error::Bus)
    }

    pub fn power_valid_flag(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.pvf().read())
    }

    pub fn timing_control_flag(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.tcf().read())
    }

    pub fn summation_flag(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.sf().read())
    }

    pub fn conversion_ready(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.cvrf().read())
    }

    pub fn critical_flag(&mut self, channel: Channel) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.critical_flag(channel))
    }

    pub fn warning_flag(&mut self, channel: Channel) -> Result<bool, Error<B::Error>> {
        Ok(self.read_mask_enable()?.warning_flag(channel))
    }

    fn read_signed(&mut self, register: u8) -> Result<i16, Error<B::Error>> {
        self.iface.read_signed(register).map_err(Error::Bus)
    }

    fn write_limit(&mut self, register: u8, limit: Limit, value: f32) -> Result<(), Error<B::Error>> {
        if !limit.fits_register(value) {
            warn!("INA3221 limit {} does not fit register {}", value, register);
        }

        self.iface
            .write_word(register, limit.to_raw(value))
            .map_err(Error::Bus)
    }
}

impl<B, A> Ina3221<B, A>
where
    A: AlertInput,
{
    /// Returns the present level of an alert output. No debouncing or edge detection.
    pub fn is_alert_asserted(&mut self, line: AlertLine) -> Result<bool, A::Error> {
        self.alerts.is_asserted(line)
    }

    pub fn power_valid_pin(&mut self) -> Result<bool, A::Error> {
        self.is_alert_asserted(AlertLine::PowerValid)
    }

    pub fn critical_pin(&mut self) -> Result<bool, A::Error> {
        self.is_alert_asserted(AlertLine::Critical)
    }

    pub fn warning_pin(&mut self) -> Result<bool, A::Error> {
        self.is_alert_asserted(AlertLine::Warning)
    }

    pub fn timing_control_pin(&mut self) -> Result<bool, A::Error> {
        self.is_alert_asserted(AlertLine::TimingControl)
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec;

    use embedded_hal_mock::eh1::{
        digital::{Mock as PinMock, State, Transaction as PinTransaction},
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    use super::*;
    use crate::ll::test::{BusFault, FakeBus};

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    fn driver() -> Ina3221<FakeBus> {
        let mut bus = FakeBus::new(ll::DEFAULT_ADDRESS);
        bus.set(ll::CONFIG, 0x7127);
        Ina3221::new(bus, Settings::default()).unwrap()
    }

    #[test]
    fn new_reads_and_caches_configuration() {
        let mut ina = driver();

        assert_eq!(ina.configuration().bits(), 0x7127);
        assert_eq!(ina.interface().bus.writes, 0);
    }

    #[test]
    fn with_configuration_writes_and_caches() {
        let config = Configuration::default().averaging().write(AveragingMode::_16);
        let mut ina = Ina3221::with_configuration(
            FakeBus::new(0x41),
            Settings {
                address: 0x41,
                ..Settings::default()
            },
            config,
        )
        .unwrap();

        assert_eq!(ina.configuration(), config);
        assert_eq!(ina.interface().bus.get(ll::CONFIG), config.bits());
        assert_eq!(ina.settings().address, 0x41);
    }

    #[test]
    fn construction_propagates_bus_errors() {
        let mut bus = FakeBus::new(ll::DEFAULT_ADDRESS);
        bus.fail = true;

        assert!(matches!(
            Ina3221::new(bus, Settings::default()),
            Err(Error::Bus(BusFault))
        ));
    }

    #[test]
    fn read_configuration_refreshes_cache() {
        let mut ina = driver();
        ina.interface().bus.set(ll::CONFIG, 0x0127);

        assert_eq!(ina.read_configuration().unwrap().bits(), 0x0127);
        assert_eq!(ina.configuration().bits(), 0x0127);
    }

    #[test]
    fn channel_validation() {
        assert_eq!(Channel::try_from(0), Err(InvalidChannel(0)));
        assert_eq!(Channel::try_from(4), Err(InvalidChannel(4)));
        assert_eq!(Channel::try_from(1), Ok(Channel::Ch1));
        assert_eq!(Channel::try_from(2), Ok(Channel::Ch2));
        assert_eq!(Channel::try_from(3), Ok(Channel::Ch3));

        fn read(ina: &mut Ina3221<FakeBus>, channel: u8) -> Result<i16, Error<BusFault>> {
            ina.raw_bus_voltage(Channel::try_from(channel)?)
        }

        let mut ina = driver();
        assert_eq!(read(&mut ina, 0), Err(Error::InvalidChannel(0)));
        assert_eq!(read(&mut ina, 4), Err(Error::InvalidChannel(4)));
        for channel in 1..=3 {
            assert!(read(&mut ina, channel).is_ok());
        }
    }

    #[test]
    fn channel_registers_are_interleaved() {
        assert_eq!(Channel::Ch1.register(ll::SHUNT_VOLTAGE_1), 0x01);
        assert_eq!(Channel::Ch2.register(ll::SHUNT_VOLTAGE_1), 0x03);
        assert_eq!(Channel::Ch3.register(ll::SHUNT_VOLTAGE_1), 0x05);
        assert_eq!(Channel::Ch1.register(ll::BUS_VOLTAGE_1), 0x02);
        assert_eq!(Channel::Ch3.register(ll::BUS_VOLTAGE_1), 0x06);
        assert_eq!(Channel::Ch2.register(ll::CRITICAL_ALERT_LIMIT_1), 0x09);
        assert_eq!(Channel::Ch3.register(ll::WARNING_ALERT_LIMIT_1), 0x0C);
    }

    #[test]
    fn raw_voltages_are_signed() {
        let mut ina = driver();
        ina.interface().bus.set(0x04, 0x8000);
        ina.interface().bus.set(0x05, 0xFF9C);

        assert_eq!(ina.raw_bus_voltage(Channel::Ch2), Ok(-32768));
        assert_eq!(ina.raw_shunt_voltage(Channel::Ch3), Ok(-100));
    }

    #[test]
    fn measurements_in_physical_units() {
        let mut ina = driver();
        ina.interface().bus.set(0x02, 12000);
        ina.interface().bus.set(0x01, 100);
        ina.interface().bus.set(0x03, (-100i16) as u16);
        ina.interface().bus.set(0x05, 10000);

        assert_close(ina.bus_voltage_v(Channel::Ch1).unwrap(), 12.0);
        assert_close(ina.shunt_voltage_mv(Channel::Ch1).unwrap(), 0.5);
        assert_close(ina.shunt_voltage_mv(Channel::Ch2).unwrap(), -0.5);
        // 50 mV across 0.1 Ohm
        assert_close(ina.current_ma(Channel::Ch3).unwrap(), 500.0);
    }

    #[test]
    fn current_uses_configured_shunt() {
        let mut bus = FakeBus::new(ll::DEFAULT_ADDRESS);
        bus.set(0x01, 10000);
        let mut ina = Ina3221::new(
            bus,
            Settings {
                shunt_resistor_ohms: 0.05,
                ..Settings::default()
            },
        )
        .unwrap();

        assert_close(ina.current_ma(Channel::Ch1).unwrap(), 1000.0);
    }

    #[test]
    fn critical_limit_round_trip() {
        let mut ina = driver();

        ina.set_critical_alert_limit_mv(Channel::Ch2, 40.0).unwrap();

        assert_eq!(ina.interface().bus.get(0x09), 8000);
        assert_close(ina.critical_alert_limit_mv(Channel::Ch2).unwrap(), 40.0);
    }

    #[test]
    fn warning_limit_round_trip() {
        let mut ina = driver();

        ina.set_warning_alert_limit_mv(Channel::Ch3, 12.0).unwrap();

        assert_eq!(ina.interface().bus.get(0x0C), 2400);
        assert_close(ina.warning_alert_limit_mv(Channel::Ch3).unwrap(), 12.0);
    }

    #[test]
    fn shunt_sum_uses_one_bit_shift() {
        let mut ina = driver();

        ina.set_shunt_voltage_sum_limit_mv(40.0).unwrap();
        assert_eq!(ina.interface().bus.get(ll::SHUNT_VOLTAGE_SUM_LIMIT), 2000);
        assert_close(ina.shunt_voltage_sum_limit_mv().unwrap(), 10.0);

        ina.interface().bus.set(ll::SHUNT_VOLTAGE_SUM, (-200i16) as u16);
        assert_close(ina.shunt_voltage_sum_mv().unwrap(), -1.0);
    }

    #[test]
    fn power_valid_limits() {
        let mut ina = driver();

        ina.set_power_valid_upper_limit_v(10.0).unwrap();
        ina.set_power_valid_lower_limit_v(9.0).unwrap();

        assert_eq!(ina.interface().bus.get(ll::POWER_VALID_UPPER_LIMIT), 10000);
        assert_eq!(ina.interface().bus.get(ll::POWER_VALID_LOWER_LIMIT), 9000);
        assert_close(ina.power_valid_upper_limit_v().unwrap(), 10.0);
        assert_close(ina.power_valid_lower_limit_v().unwrap(), 9.0);
    }

    #[test]
    fn read_alert_levels_reads_every_channel() {
        let mut ina = driver();
        for (channel, mv) in Channel::ALL.into_iter().zip([4.0, 8.0, 12.0]) {
            ina.set_warning_alert_limit_mv(channel, mv).unwrap();
            ina.set_critical_alert_limit_mv(channel, mv * 2.0).unwrap();
        }

        let levels = ina.read_alert_levels().unwrap();

        assert_close(levels.warning(Channel::Ch1), 4.0);
        assert_close(levels.critical(Channel::Ch1), 8.0);
        assert_close(levels.warning(Channel::Ch3), 12.0);
        assert_close(levels.critical(Channel::Ch3), 24.0);
    }

    #[test]
    fn reset_writes_only_the_reset_bit() {
        let mut ina = driver();
        ina.write_configuration(Configuration::from_bits(0x0123))
            .unwrap();

        ina.reset().unwrap();

        assert_eq!(ina.interface().bus.get(ll::CONFIG), 0x8000);
        assert_eq!(ina.configuration(), Configuration::default());

        // the device clears the reset bit on its own
        ina.interface().bus.set(ll::CONFIG, 0x7127);
        assert_eq!(ina.read_configuration().unwrap(), ina.configuration());
    }

    #[test]
    fn out_of_range_limit_is_written_wrapped() {
        let mut ina = driver();

        ina.set_critical_alert_limit_mv(Channel::Ch1, 200.0).unwrap();

        // 5000 steps shifted by 3 overflow the signed register
        assert_eq!(ina.interface().bus.get(ll::CRITICAL_ALERT_LIMIT_1), 40000);
        assert!(ina.critical_alert_limit_mv(Channel::Ch1).unwrap() < 0.0);
    }

    #[test]
    fn power_down_overwrites_the_configuration() {
        let mut ina = driver();

        ina.power_down().unwrap();

        let config = ina.configuration();
        assert_eq!(config.bits(), 0x0004);
        assert!(config.mode().read().is_power_down());
        for channel in Channel::ALL {
            assert!(!config.channel_enabled(channel));
        }
        assert_eq!(ina.read_configuration().unwrap(), config);
    }

    #[test]
    fn mask_enable_flags_are_independent() {
        let mut ina = driver();

        for bit in 0..15 {
            let mask = MaskEnable::from_bits(1 << bit);
            ina.write_mask_enable(mask).unwrap();

            let read_back = ina.read_mask_enable().unwrap();
            assert_eq!(read_back, mask);

            assert_eq!(ina.conversion_ready().unwrap(), bit == 0);
            assert_eq!(ina.timing_control_flag().unwrap(), bit == 1);
            assert_eq!(ina.power_valid_flag().unwrap(), bit == 2);
            assert_eq!(ina.warning_flag(Channel::Ch3).unwrap(), bit == 3);
            assert_eq!(ina.warning_flag(Channel::Ch2).unwrap(), bit == 4);
            assert_eq!(ina.warning_flag(Channel::Ch1).unwrap(), bit == 5);
            assert_eq!(ina.summation_flag().unwrap(), bit == 6);
            assert_eq!(ina.critical_flag(Channel::Ch3).unwrap(), bit == 7);
            assert_eq!(ina.critical_flag(Channel::Ch2).unwrap(), bit == 8);
            assert_eq!(ina.critical_flag(Channel::Ch1).unwrap(), bit == 9);
        }
    }

    #[test]
    fn measurement_errors_propagate() {
        let mut ina = driver();
        ina.interface().bus.fail = true;

        assert_eq!(
            ina.shunt_voltage_mv(Channel::Ch1),
            Err(Error::Bus(BusFault))
        );
        assert_eq!(
            ina.set_critical_alert_limit_mv(Channel::Ch1, 1.0),
            Err(Error::Bus(BusFault))
        );
        assert_eq!(ina.power_down(), Err(Error::Bus(BusFault)));
        // failed writes leave the cache untouched
        assert_eq!(ina.configuration().bits(), 0x7127);
    }

    #[test]
    fn i2c_end_to_end() {
        let expectations = [
            // configuration arrives MSB first
            I2cTransaction::write_read(0x40, vec![0x00], vec![0x71, 0x27]),
            // 12 V on channel 2
            I2cTransaction::write_read(0x40, vec![0x04], vec![0x2E, 0xE0]),
            // 40 mV critical limit on channel 1
            I2cTransaction::write(0x40, vec![0x07, 0x1F, 0x40]),
        ];
        let mut ina = Ina3221::new_i2c(I2cMock::new(&expectations), Settings::default()).unwrap();

        assert_eq!(ina.configuration().bits(), 0x7127);
        assert_close(ina.bus_voltage_v(Channel::Ch2).unwrap(), 12.0);
        ina.set_critical_alert_limit_mv(Channel::Ch1, 40.0).unwrap();

        let (bus, _) = ina.release();
        bus.into_inner().done();
    }

    #[test]
    fn alert_pins() {
        let pins = AlertPins {
            power_valid: PinMock::new(&[PinTransaction::get(State::High)]),
            critical: PinMock::new(&[PinTransaction::get(State::Low)]),
            warning: PinMock::new(&[PinTransaction::get(State::High)]),
            timing_control: PinMock::new(&[PinTransaction::get(State::Low)]),
        };
        let mut ina = driver().with_alert_pins(pins);

        assert_eq!(ina.power_valid_pin(), Ok(false));
        assert_eq!(ina.critical_pin(), Ok(true));
        assert_eq!(ina.warning_pin(), Ok(false));
        assert_eq!(ina.timing_control_pin(), Ok(true));

        let (_, mut pins) = ina.release();
        pins.power_valid.done();
        pins.critical.done();
        pins.warning.done();
        pins.timing_control.done();
    }
}

#![allow(non_camel_case_types)]

use device_descriptor::*;

use crate::Channel;

field_enum! {
    /// Number of samples averaged per conversion.
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum AveragingMode: 3 {
        _1 = 0 => "1",
        _4 = 1 => "4",
        _16 = 2 => "16",
        _64 = 3 => "64",
        _128 = 4 => "128",
        _256 = 5 => "256",
        _512 = 6 => "512",
        _1024 = 7 => "1024",
    }
}

impl AveragingMode {
    pub const fn samples(self) -> u16 {
        1 << match self {
            AveragingMode::_1 => 0,
            AveragingMode::_4 => 2,
            AveragingMode::_16 => 4,
            AveragingMode::_64 => 6,
            AveragingMode::_128 => 7,
            AveragingMode::_256 => 8,
            AveragingMode::_512 => 9,
            AveragingMode::_1024 => 10,
        }
    }
}

field_enum! {
    /// Bus and shunt voltage conversion time.
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum ConversionTime: 3 {
        _140us = 0 => "140 us",
        _204us = 1 => "204 us",
        _332us = 2 => "332 us",
        _588us = 3 => "588 us",
        _1_1ms = 4 => "1.1 ms",
        _2_116ms = 5 => "2.116 ms",
        _4_156ms = 6 => "4.156 ms",
        _8_244ms = 7 => "8.244 ms",
    }
}

impl ConversionTime {
    pub const fn micros(self) -> u32 {
        match self {
            ConversionTime::_140us => 140,
            ConversionTime::_204us => 204,
            ConversionTime::_332us => 332,
            ConversionTime::_588us => 588,
            ConversionTime::_1_1ms => 1_100,
            ConversionTime::_2_116ms => 2_116,
            ConversionTime::_4_156ms => 4_156,
            ConversionTime::_8_244ms => 8_244,
        }
    }
}

field_enum! {
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum OperatingMode: 3 {
        PowerDown = 0 => "Power down",
        ShuntSingleShot = 1 => "Shunt voltage, single-shot (triggered)",
        BusSingleShot = 2 => "Bus voltage, single-shot (triggered)",
        ShuntAndBusSingleShot = 3 => "Shunt and bus, single-shot (triggered)",
        /// Alternative encoding of power down. This is the one the driver writes.
        PowerDown2 = 4 => "Power down",
        ShuntContinuous = 5 => "Shunt voltage, continuous",
        BusContinuous = 6 => "Bus voltage, continuous",
        ShuntAndBusContinuous = 7 => "Shunt and bus, continuous",
    }
}

impl OperatingMode {
    pub const fn is_power_down(self) -> bool {
        matches!(self, OperatingMode::PowerDown | OperatingMode::PowerDown2)
    }

    pub const fn is_continuous(self) -> bool {
        self.bits() & 0b100 != 0 && !self.is_power_down()
    }
}

register! {
    /// Operating mode, enabled channels, averaging and conversion times.
    Configuration(addr = 0x00, default = 0x7127) {
        /// Writing 1 resets every register to its default. Self-clearing.
        reset @ 15 => bool,
        ch1_enable @ 14 => bool,
        ch2_enable @ 13 => bool,
        ch3_enable @ 12 => bool,
        averaging @ 9..12 => AveragingMode,
        bus_conversion_time @ 6..9 => ConversionTime,
        shunt_conversion_time @ 3..6 => ConversionTime,
        mode @ 0..3 => OperatingMode,
    }
}

register! {
    /// Alert configuration and status flags.
    MaskEnable(addr = 0x0F, default = 0x0002) {
        /// Summation channel control, include channel 1 in the shunt voltage sum.
        scc1 @ 14 => bool,
        scc2 @ 13 => bool,
        scc3 @ 12 => bool,
        /// Warning alert latch enable.
        wen @ 11 => bool,
        /// Critical alert latch enable.
        cen @ 10 => bool,
        cf1 @ 9 => bool,
        cf2 @ 8 => bool,
        cf3 @ 7 => bool,
        /// Summation alert flag.
        sf @ 6 => bool,
        wf1 @ 5 => bool,
        wf2 @ 4 => bool,
        wf3 @ 3 => bool,
        /// Power-valid alert flag.
        pvf @ 2 => bool,
        /// Timing-control alert flag.
        tcf @ 1 => bool,
        /// Conversion ready flag.
        cvrf @ 0 => bool,
    }
}

impl Configuration {
    pub fn channel_enabled(self, channel: Channel) -> bool {
        match channel {
            Channel::Ch1 => self.ch1_enable().read(),
            Channel::Ch2 => self.ch2_enable().read(),
            Channel::Ch3 => self.ch3_enable().read(),
        }
    }

    pub fn with_channel_enabled(self, channel: Channel, enabled: bool) -> Self {
        match channel {
            Channel::Ch1 => self.ch1_enable().write(enabled),
            Channel::Ch2 => self.ch2_enable().write(enabled),
            Channel::Ch3 => self.ch3_enable().write(enabled),
        }
    }
}

impl MaskEnable {
    pub fn critical_flag(self, channel: Channel) -> bool {
        match channel {
            Channel::Ch1 => self.cf1().read(),
            Channel::Ch2 => self.cf2().read(),
            Channel::Ch3 => self.cf3().read(),
        }
    }

    pub fn warning_flag(self, channel: Channel) -> bool {
        match channel {
            Channel::Ch1 => self.wf1().read(),
            Channel::Ch2 => self.wf2().read(),
            Channel::Ch3 => self.wf3().read(),
        }
    }

    /// Whether the channel is included in the shunt voltage sum.
    pub fn summation_control(self, channel: Channel) -> bool {
        match channel {
            Channel::Ch1 => self.scc1().read(),
            Channel::Ch2 => self.scc2().read(),
            Channel::Ch3 => self.scc3().read(),
        }
    }

    pub fn with_summation_control(self, channel: Channel, enabled: bool) -> Self {
        match channel {
            Channel::Ch1 => self.scc1().write(enabled),
            Channel::Ch2 => self.scc2().write(enabled),
            Channel::Ch3 => self.scc3().write(enabled),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Configuration {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Configuration({=u16:#x})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MaskEnable {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "MaskEnable({=u16:#x})", self.bits())
    }
}

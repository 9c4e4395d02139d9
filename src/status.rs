use core::fmt;

use crate::{
    descriptors::{AveragingMode, Configuration, ConversionTime, OperatingMode},
    Channel,
};

const FIELD_BITS: [&str; 8] = ["000", "001", "010", "011", "100", "101", "110", "111"];

/// Decoded configuration word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigDescription {
    pub reset: bool,
    pub channels_enabled: [bool; 3],
    pub averaging: AveragingMode,
    pub bus_conversion_time: ConversionTime,
    pub shunt_conversion_time: ConversionTime,
    pub mode: OperatingMode,
}

impl ConfigDescription {
    pub fn channel_enabled(&self, channel: Channel) -> bool {
        self.channels_enabled[(channel.number() - 1) as usize]
    }
}

impl Configuration {
    pub fn describe(self) -> ConfigDescription {
        ConfigDescription {
            reset: self.reset().read(),
            channels_enabled: Channel::ALL.map(|channel| self.channel_enabled(channel)),
            averaging: self.averaging().read(),
            bus_conversion_time: self.bus_conversion_time().read(),
            shunt_conversion_time: self.shunt_conversion_time().read(),
            mode: self.mode().read(),
        }
    }
}

/// Decodes every field of a configuration word. Total over all 16-bit inputs.
pub fn describe_config(word: u16) -> ConfigDescription {
    Configuration::from_bits(word).describe()
}

const HEADER: &str = "Config Register RST CH1 CH2 CH3 AVERAGES VBUSCT        VSHCT         MODE";
const ROW_INDENT: &str = "                ";

impl ConfigDescription {
    /// Table cells after the channel columns: field code, description and column width.
    fn coded_cells(&self) -> [(&'static str, &'static str, usize); 4] {
        [
            (
                FIELD_BITS[self.averaging.bits() as usize],
                self.averaging.description(),
                8,
            ),
            (
                FIELD_BITS[self.bus_conversion_time.bits() as usize],
                self.bus_conversion_time.description(),
                13,
            ),
            (
                FIELD_BITS[self.shunt_conversion_time.bits() as usize],
                self.shunt_conversion_time.description(),
                13,
            ),
            (
                FIELD_BITS[self.mode.bits() as usize],
                self.mode.description(),
                0,
            ),
        ]
    }

    fn flags(&self) -> [u8; 4] {
        let [ch1, ch2, ch3] = self.channels_enabled.map(u8::from);
        [u8::from(self.reset), ch1, ch2, ch3]
    }
}

/// Padding that left-aligns a `code-description` cell in a column of `width`.
fn cell_padding(description: &str, width: usize) -> usize {
    width.saturating_sub(4 + description.len())
}

impl fmt::Display for ConfigDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        f.write_str(ROW_INDENT)?;
        for flag in self.flags() {
            write!(f, "{flag:>3} ")?;
        }
        for (idx, (code, description, width)) in self.coded_cells().into_iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(
                f,
                "{code}-{description}{:pad$}",
                "",
                pad = cell_padding(description, width)
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt-impl")]
impl ufmt::uDisplay for ConfigDescription {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(HEADER)?;
        f.write_str("\n")?;
        f.write_str(ROW_INDENT)?;
        for flag in self.flags() {
            ufmt::uwrite!(f, "  {} ", flag)?;
        }
        for (idx, (code, description, width)) in self.coded_cells().into_iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            ufmt::uwrite!(f, "{}-{}", code, description)?;
            for _ in 0..cell_padding(description, width) {
                f.write_char(' ')?;
            }
        }
        Ok(())
    }
}

/// Warning and critical alert limits of all channels, in mV.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertLevels {
    pub warning_mv: [f32; 3],
    pub critical_mv: [f32; 3],
}

impl AlertLevels {
    pub fn warning(&self, channel: Channel) -> f32 {
        self.warning_mv[(channel.number() - 1) as usize]
    }

    pub fn critical(&self, channel: Channel) -> f32 {
        self.critical_mv[(channel.number() - 1) as usize]
    }
}

impl fmt::Display for AlertLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Alert Levels (mV) {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "WarnCh1", "CritCh1", "WarnCh2", "CritCh2", "WarnCh3", "CritCh3"
        )?;
        write!(f, "                 ")?;
        for channel in Channel::ALL {
            write!(
                f,
                " {:8.2} {:8.2}",
                self.warning(channel),
                self.critical(channel)
            )?;
        }
        Ok(())
    }
}

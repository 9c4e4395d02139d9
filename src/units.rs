//! Conversions between raw register words and physical units.
//!
//! Shunt related registers keep their three lowest bits reserved. The read scale factors
//! already account for that, so raw words are scaled directly without shifting them first.

/// Bus voltage LSB, in volts.
pub const BUS_VOLTAGE_LSB_V: f32 = 0.001;

/// Shunt voltage LSB (including the 3 reserved bits), in millivolts.
pub const SHUNT_VOLTAGE_LSB_MV: f32 = 0.005;

/// Alert limit resolution, in millivolts.
pub const LIMIT_STEP_MV: f32 = 0.04;

/// Power-valid limit resolution, in volts.
pub const POWER_VALID_STEP_V: f32 = 0.008;

/// Recovers the signed value of a two's complement register word.
///
/// ```rust
/// # use ina3221::units::sign_extend;
/// assert_eq!(sign_extend(0x0000), 0);
/// assert_eq!(sign_extend(0x7FFF), 32767);
/// assert_eq!(sign_extend(0x8000), -32768);
/// assert_eq!(sign_extend(0xFFFF), -1);
/// ```
#[inline]
pub const fn sign_extend(word: u16) -> i16 {
    word as i16
}

/// Converts a raw bus voltage value to volts.
///
/// ```rust
/// # use ina3221::units::raw_to_bus_voltage_v;
/// assert!((raw_to_bus_voltage_v(12000) - 12.0).abs() < 1e-4);
/// assert_eq!(raw_to_bus_voltage_v(0), 0.0);
/// ```
#[inline]
pub fn raw_to_bus_voltage_v(raw: i16) -> f32 {
    raw as f32 * BUS_VOLTAGE_LSB_V
}

/// Converts a raw shunt voltage (or shunt voltage limit or sum) value to millivolts.
///
/// ```rust
/// # use ina3221::units::raw_to_shunt_voltage_mv;
/// assert!((raw_to_shunt_voltage_mv(100) - 0.5).abs() < 1e-6);
/// assert!((raw_to_shunt_voltage_mv(-100) + 0.5).abs() < 1e-6);
/// assert!((raw_to_shunt_voltage_mv(8000) - 40.0).abs() < 1e-4);
/// ```
#[inline]
pub fn raw_to_shunt_voltage_mv(raw: i16) -> f32 {
    raw as f32 * SHUNT_VOLTAGE_LSB_MV
}

/// Converts a shunt voltage to the current flowing through the shunt resistor, in mA.
///
/// ```rust
/// # use ina3221::units::shunt_voltage_to_current_ma;
/// assert!((shunt_voltage_to_current_ma(50.0, 0.1) - 500.0).abs() < 1e-3);
/// ```
#[inline]
pub fn shunt_voltage_to_current_ma(shunt_mv: f32, shunt_resistor_ohms: f32) -> f32 {
    shunt_mv / shunt_resistor_ohms
}

/// Number of whole limit steps in `value`, truncated towards zero.
#[inline]
fn steps(value: f32, step: f32) -> i32 {
    (value / step) as i32
}

/// Threshold registers and their encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Limit {
    /// Per-channel critical and warning limits, in mV.
    Shunt,
    /// Shunt voltage sum limit, in mV. Its field is shifted by one bit only.
    ShuntSum,
    /// Power-valid upper and lower limits, in V.
    PowerValid,
}

impl Limit {
    const fn step(self) -> f32 {
        match self {
            Limit::Shunt | Limit::ShuntSum => LIMIT_STEP_MV,
            Limit::PowerValid => POWER_VALID_STEP_V,
        }
    }

    const fn shift(self) -> u32 {
        match self {
            Limit::Shunt | Limit::PowerValid => 3,
            Limit::ShuntSum => 1,
        }
    }

    #[inline]
    pub(crate) fn to_raw(self, value: f32) -> u16 {
        (steps(value, self.step()) << self.shift()) as u16
    }

    /// Checks whether `value` survives the 16-bit register without wrapping.
    pub(crate) fn fits_register(self, value: f32) -> bool {
        let raw = steps(value, self.step()) as i64 * (1 << self.shift());
        raw >= i16::MIN as i64 && raw <= i16::MAX as i64
    }
}

/// Converts a critical or warning alert limit in millivolts to its register word.
///
/// ```rust
/// # use ina3221::units::shunt_limit_mv_to_raw;
/// assert_eq!(shunt_limit_mv_to_raw(40.0), 8000);
/// assert_eq!(shunt_limit_mv_to_raw(0.0), 0);
/// assert_eq!(shunt_limit_mv_to_raw(-0.08), 0xFFF0);
/// ```
#[inline]
pub fn shunt_limit_mv_to_raw(limit_mv: f32) -> u16 {
    Limit::Shunt.to_raw(limit_mv)
}

/// Converts a shunt voltage sum limit in millivolts to its register word.
///
/// ```rust
/// # use ina3221::units::shunt_sum_limit_mv_to_raw;
/// assert_eq!(shunt_sum_limit_mv_to_raw(40.0), 2000);
/// ```
#[inline]
pub fn shunt_sum_limit_mv_to_raw(limit_mv: f32) -> u16 {
    Limit::ShuntSum.to_raw(limit_mv)
}

/// Converts a power-valid limit in volts to its register word.
///
/// ```rust
/// # use ina3221::units::power_valid_v_to_raw;
/// assert_eq!(power_valid_v_to_raw(10.0), 10000);
/// assert_eq!(power_valid_v_to_raw(9.0), 9000);
/// ```
#[inline]
pub fn power_valid_v_to_raw(limit_v: f32) -> u16 {
    Limit::PowerValid.to_raw(limit_v)
}

/// Converts a power-valid limit register value to volts.
#[inline]
pub fn raw_to_power_valid_v(raw: i16) -> f32 {
    raw_to_bus_voltage_v(raw)
}

use device_descriptor::{ReadOnlyRegister, Register};
use register_access::{RegisterAccess, WordAccess};

/// Address with A0 tied to GND.
pub const DEFAULT_ADDRESS: u8 = 0x40;

pub const CONFIG: u8 = 0x00;
pub const SHUNT_VOLTAGE_1: u8 = 0x01;
pub const BUS_VOLTAGE_1: u8 = 0x02;
pub const CRITICAL_ALERT_LIMIT_1: u8 = 0x07;
pub const WARNING_ALERT_LIMIT_1: u8 = 0x08;
pub const SHUNT_VOLTAGE_SUM: u8 = 0x0D;
pub const SHUNT_VOLTAGE_SUM_LIMIT: u8 = 0x0E;
pub const MASK_ENABLE: u8 = 0x0F;
pub const POWER_VALID_UPPER_LIMIT: u8 = 0x10;
pub const POWER_VALID_LOWER_LIMIT: u8 = 0x11;

/// Register codec. Hides the transport's word order from everything above it.
///
/// The chip sends the most significant byte first, while the transport assembles words low
/// byte first, so every word is swapped on the way in and out.
pub struct Ina3221Interface<B> {
    pub bus: B,
    pub address: u8,
}

impl<B> Ina3221Interface<B>
where
    B: WordAccess,
{
    pub fn read_word(&mut self, register: u8) -> Result<u16, B::Error> {
        let value = self.bus.read_word(self.address, register)?.swap_bytes();
        trace!("INA3221 read {} = {}", register, value);
        Ok(value)
    }

    pub fn write_word(&mut self, register: u8, value: u16) -> Result<(), B::Error> {
        trace!("INA3221 write {} = {}", register, value);
        self.bus
            .write_word(self.address, register, value.swap_bytes())
    }

    pub fn read_signed(&mut self, register: u8) -> Result<i16, B::Error> {
        self.read_word(register).map(crate::units::sign_extend)
    }
}

impl<B> RegisterAccess for Ina3221Interface<B>
where
    B: WordAccess,
{
    type Error = B::Error;

    fn read_register<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister,
    {
        self.read_word(R::ADDRESS).map(R::from_bits)
    }

    fn write_register<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register,
    {
        self.write_word(R::ADDRESS, reg.bits())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use register_access::{RegisterReader, RegisterWriter};

    use super::*;
    use crate::descriptors::{Configuration, MaskEnable};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BusFault;

    /// In-memory transport. Stores words exactly as the transport would see them.
    pub struct FakeBus {
        pub address: u8,
        pub words: [u16; 0x12],
        pub writes: usize,
        pub fail: bool,
    }

    impl FakeBus {
        pub fn new(address: u8) -> Self {
            Self {
                address,
                words: [0; 0x12],
                writes: 0,
                fail: false,
            }
        }

        /// Sets the register as the chip would hold it.
        pub fn set(&mut self, register: u8, value: u16) {
            self.words[register as usize] = value.swap_bytes();
        }

        /// Reads the register as the chip would hold it.
        pub fn get(&self, register: u8) -> u16 {
            self.words[register as usize].swap_bytes()
        }
    }

    impl WordAccess for FakeBus {
        type Error = BusFault;

        fn read_byte(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
            self.read_word(address, register).map(|word| word as u8)
        }

        fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
            assert_eq!(address, self.address);
            if self.fail {
                return Err(BusFault);
            }
            Ok(self.words[register as usize])
        }

        fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
            assert_eq!(address, self.address);
            if self.fail {
                return Err(BusFault);
            }
            self.writes += 1;
            self.words[register as usize] = value;
            Ok(())
        }
    }

    fn interface() -> Ina3221Interface<FakeBus> {
        Ina3221Interface {
            bus: FakeBus::new(DEFAULT_ADDRESS),
            address: DEFAULT_ADDRESS,
        }
    }

    #[test]
    fn words_are_byte_swapped_on_the_transport() {
        let mut iface = interface();

        iface.write_word(CONFIG, 0x7127).unwrap();
        assert_eq!(iface.bus.words[CONFIG as usize], 0x2771);

        iface.bus.words[MASK_ENABLE as usize] = 0x0200;
        assert_eq!(iface.read_word(MASK_ENABLE), Ok(0x0002));
    }

    #[test]
    fn write_then_read_returns_the_written_word() {
        let mut iface = interface();

        for value in 0..=u16::MAX {
            iface.write_word(SHUNT_VOLTAGE_SUM_LIMIT, value).unwrap();
            assert_eq!(iface.read_word(SHUNT_VOLTAGE_SUM_LIMIT), Ok(value));
        }
    }

    #[test]
    fn signed_reads_sign_extend() {
        let mut iface = interface();

        iface.bus.set(BUS_VOLTAGE_1, 0x8000);
        assert_eq!(iface.read_signed(BUS_VOLTAGE_1), Ok(-32768));

        iface.bus.set(BUS_VOLTAGE_1, 0x7FFF);
        assert_eq!(iface.read_signed(BUS_VOLTAGE_1), Ok(32767));

        iface.bus.set(BUS_VOLTAGE_1, 0x0000);
        assert_eq!(iface.read_signed(BUS_VOLTAGE_1), Ok(0));
    }

    #[test]
    fn typed_registers_use_their_address() {
        let mut iface = interface();

        Configuration::from_bits(0x4127).write(&mut iface).unwrap();
        assert_eq!(iface.bus.get(CONFIG), 0x4127);

        iface.bus.set(MASK_ENABLE, 0x0204);
        let mask = MaskEnable::read(&mut iface).unwrap();
        assert!(mask.cf1().read());
        assert!(mask.pvf().read());
    }

    #[test]
    fn transport_errors_propagate() {
        let mut iface = interface();
        iface.bus.fail = true;

        assert_eq!(iface.read_word(CONFIG), Err(BusFault));
        assert_eq!(iface.write_word(CONFIG, 0), Err(BusFault));
    }
}

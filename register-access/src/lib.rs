#![no_std]

use device_descriptor::{ReadOnlyRegister, Register};
use embedded_hal::i2c::I2c;

/// Byte and word oriented register transport.
///
/// Words are transferred in SMBus order: the first byte on the wire is the low byte of the
/// returned value. Devices that send their registers MSB first therefore arrive byte-swapped.
pub trait WordAccess {
    type Error;

    fn read_byte(&mut self, address: u8, register: u8) -> Result<u8, Self::Error>;
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error>;
    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error>;
}

impl<T> WordAccess for &mut T
where
    T: WordAccess + ?Sized,
{
    type Error = T::Error;

    fn read_byte(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        T::read_byte(self, address, register)
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        T::read_word(self, address, register)
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        T::write_word(self, address, register, value)
    }
}

/// SMBus-style register access on top of an `embedded-hal` I2C bus.
pub struct SmbusI2c<I> {
    i2c: I,
}

impl<I> SmbusI2c<I> {
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.i2c
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I> WordAccess for SmbusI2c<I>
where
    I: I2c,
{
    type Error = I::Error;

    fn read_byte(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut data = [0; 1];
        self.i2c.write_read(address, &[register], &mut data)?;
        Ok(data[0])
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let mut data = [0; 2];
        self.i2c.write_read(address, &[register], &mut data)?;
        Ok(u16::from_le_bytes(data))
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c.write(address, &[register, lo, hi])
    }
}

pub trait RegisterAccess {
    type Error;

    fn read_register<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister;
    fn write_register<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register;
}

pub trait RegisterReader: Sized {
    fn read<E>(iface: &mut impl RegisterAccess<Error = E>) -> Result<Self, E>;
}

pub trait RegisterWriter {
    fn write<E>(self, iface: &mut impl RegisterAccess<Error = E>) -> Result<(), E>;
}

impl<T> RegisterReader for T
where
    T: ReadOnlyRegister,
{
    fn read<E>(iface: &mut impl RegisterAccess<Error = E>) -> Result<Self, E> {
        iface.read_register()
    }
}

impl<T> RegisterWriter for T
where
    T: Register,
{
    fn write<E>(self, iface: &mut impl RegisterAccess<Error = E>) -> Result<(), E> {
        iface.write_register(self)
    }
}

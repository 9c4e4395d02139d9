#![no_std]

use core::marker::PhantomData;

pub trait Proxy: Copy {
    fn bits(&self) -> u16;
    fn from_bits(bits: u16) -> Self;
}

pub trait ReadOnlyRegister: Proxy {
    const ADDRESS: u8;
    const NAME: &'static str;
}

pub trait Register: ReadOnlyRegister {
    const DEFAULT_VALUE: u16;

    #[inline(always)]
    fn new(f: impl Fn(Self) -> Self) -> Self {
        f(Self::from_bits(Self::DEFAULT_VALUE))
    }

    #[inline(always)]
    fn modify(self, f: impl Fn(Self) -> Self) -> Self {
        f(self)
    }
}

/// A value that can be stored in a register field.
///
/// Decoding is total: every bit pattern that fits the field maps to a value.
pub trait FieldValue: Sized {
    fn from_field_bits(bits: u16) -> Self;
    fn into_field_bits(self) -> u16;
}

impl FieldValue for bool {
    #[inline(always)]
    fn from_field_bits(bits: u16) -> Self {
        bits != 0
    }

    #[inline(always)]
    fn into_field_bits(self) -> u16 {
        self as u16
    }
}

impl FieldValue for u16 {
    #[inline(always)]
    fn from_field_bits(bits: u16) -> Self {
        bits
    }

    #[inline(always)]
    fn into_field_bits(self) -> u16 {
        self
    }
}

pub struct Field<const POS: u8, const WIDTH: u8, DataType, P> {
    _marker: PhantomData<DataType>,
    reg: P,
}

impl<const POS: u8, const WIDTH: u8, DataType, P> Field<POS, WIDTH, DataType, P>
where
    DataType: FieldValue,
    P: Proxy,
{
    const _CONST_CHECK: () = assert!(WIDTH > 0 && POS as u32 + WIDTH as u32 <= 16);

    const MASK: u16 = ((1u32 << WIDTH) - 1) as u16;

    #[inline(always)]
    pub fn new(reg: P) -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::_CONST_CHECK;

        Field {
            _marker: PhantomData,
            reg,
        }
    }

    #[inline(always)]
    pub fn read_field_bits(&self) -> u16 {
        (self.reg.bits() >> POS) & Self::MASK
    }

    #[inline(always)]
    pub fn read(&self) -> DataType {
        DataType::from_field_bits(self.read_field_bits())
    }

    #[inline(always)]
    fn write_field(data: u16, value: u16) -> u16 {
        // make sure value fits into field
        debug_assert!(value <= Self::MASK);

        let shifted_mask = Self::MASK << POS;
        let masked_field = data & !shifted_mask;

        masked_field | ((value & Self::MASK) << POS)
    }

    #[inline(always)]
    pub fn write(self, value: DataType) -> P {
        P::from_bits(Self::write_field(self.reg.bits(), value.into_field_bits()))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! field_width {
    ($pos:literal) => {
        1
    };
    ($pos:literal, $end:literal) => {
        $end - $pos
    };
}

/// Declares an enum that covers every bit pattern of a `width`-bit field.
///
/// Variants must be listed in ascending order starting from 0, and there must be exactly
/// `1 << width` of them. Each variant carries a human readable description.
#[macro_export]
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $width:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $desc:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            pub const VARIANTS: [Self; 1 << $width] = [$($name::$variant),+];

            const _ORDER_CHECK: () = {
                let mut i = 0;
                while i < Self::VARIANTS.len() {
                    assert!(Self::VARIANTS[i] as usize == i);
                    i += 1;
                }
            };

            #[inline]
            pub const fn bits(self) -> u16 {
                self as u16
            }

            pub const fn description(self) -> &'static str {
                match self {
                    $( $name::$variant => $desc ),+
                }
            }
        }

        impl $crate::FieldValue for $name {
            #[inline]
            fn from_field_bits(bits: u16) -> Self {
                #[allow(clippy::let_unit_value)]
                let _ = Self::_ORDER_CHECK;

                Self::VARIANTS[(bits as usize) & (Self::VARIANTS.len() - 1)]
            }

            #[inline]
            fn into_field_bits(self) -> u16 {
                self.bits()
            }
        }
    };
}

/// Declares a 16-bit register with named fields.
///
/// Single bit fields are written as `name @ bit => Type`, multi-bit fields as
/// `name @ first..end => Type` where `end` is exclusive.
#[macro_export]
macro_rules! register {
    (
        $(#[$meta:meta])*
        $reg:ident(addr = $addr:literal, default = $default:literal) {
            $( $(#[$fmeta:meta])* $field:ident @ $pos:literal $(.. $end:literal)? => $type:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq)]
        #[must_use]
        pub struct $reg {
            value: u16,
        }

        impl $crate::Proxy for $reg {
            #[inline(always)]
            fn from_bits(bits: u16) -> Self {
                Self { value: bits }
            }

            #[inline(always)]
            fn bits(&self) -> u16 {
                self.value
            }
        }

        impl $crate::ReadOnlyRegister for $reg {
            const ADDRESS: u8 = $addr;
            const NAME: &'static str = stringify!($reg);
        }

        impl $crate::Register for $reg {
            const DEFAULT_VALUE: u16 = $default;
        }

        impl Default for $reg {
            #[inline(always)]
            fn default() -> Self {
                Self { value: $default }
            }
        }

        impl core::fmt::Debug for $reg {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:#06x})", stringify!($reg), self.value)
            }
        }

        impl $reg {
            #[inline(always)]
            pub const fn from_bits(bits: u16) -> Self {
                Self { value: bits }
            }

            #[inline(always)]
            pub const fn bits(self) -> u16 {
                self.value
            }

            $(
                $(#[$fmeta])*
                #[inline(always)]
                pub fn $field(
                    self,
                ) -> $crate::Field<$pos, { $crate::field_width!($pos $(, $end)?) }, $type, Self> {
                    $crate::Field::new(self)
                }
            )*
        }
    };
}

//! Status-packet error byte.

use core::fmt;

/// One condition a device reports through its error byte, listed in bit order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum Fault {
    #[error("input voltage outside the configured operating range")]
    InputVoltage = 0,
    #[error("goal position outside the configured angle limits")]
    AngleLimit = 1,
    #[error("internal temperature above the configured limit")]
    Overheating = 2,
    #[error("instruction used an out-of-range value")]
    Range = 3,
    #[error("checksum of the instruction packet was wrong")]
    Checksum = 4,
    #[error("current load cannot be controlled with the set maximum torque")]
    Overload = 5,
    #[error("undefined instruction, or action without a registered write")]
    Instruction = 6,
}

impl Fault {
    /// Bit position to fault, for bits 0 through 6. Bit 7 is unused.
    pub const BY_BIT: [Self; 7] = [
        Self::InputVoltage,
        Self::AngleLimit,
        Self::Overheating,
        Self::Range,
        Self::Checksum,
        Self::Overload,
        Self::Instruction,
    ];

    #[inline(always)]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }
}

/// Every fault set in one error byte.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Faults(u8);

impl Faults {
    pub const NONE: Self = Self(0);

    #[inline(always)]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, fault: Fault) -> bool {
        self.0 & fault.mask() != 0
    }

    #[inline]
    pub fn iter(self) -> impl Iterator<Item = Fault> {
        Fault::BY_BIT
            .into_iter()
            .filter(move |&fault| self.contains(fault))
    }
}

impl fmt::Display for Faults {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no faults");
        }
        for (i, fault) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{fault}")?;
        }
        Ok(())
    }
}

impl From<Fault> for Faults {
    #[inline(always)]
    fn from(fault: Fault) -> Self {
        Self(fault.mask())
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        quickcheck::{Arbitrary, Gen},
        quickcheck_macros::quickcheck,
        strum::VariantArray,
    };

    impl Arbitrary for Fault {
        #[inline]
        fn arbitrary(g: &mut Gen) -> Self {
            let i = usize::arbitrary(g) % const { Self::VARIANTS.len() };
            Self::VARIANTS[i]
        }

        #[inline]
        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            let i = Self::VARIANTS
                .binary_search(self)
                .expect("Invalid enum variant");
            Box::new(i.shrink().filter_map(|j| Self::VARIANTS.get(j).copied()))
        }
    }

    #[test]
    fn input_voltage_and_overheating() {
        let faults = Faults::from_byte(0b0000_0101);
        assert_eq!(
            faults.iter().collect::<Vec<_>>(),
            [Fault::InputVoltage, Fault::Overheating]
        );
    }

    #[test]
    fn zero_is_clean() {
        assert!(Faults::from_byte(0).is_empty());
        assert_eq!(Faults::from_byte(0).iter().count(), 0);
    }

    #[test]
    fn bit_seven_is_ignored() {
        assert!(Faults::from_byte(0x80).is_empty());
    }

    #[test]
    fn bit_table_matches_discriminants() {
        for (bit, fault) in Fault::BY_BIT.iter().enumerate() {
            assert_eq!(fault.bit() as usize, bit);
        }
        assert_eq!(Fault::BY_BIT.len(), Fault::VARIANTS.len());
    }

    #[test]
    fn display_lists_every_fault() {
        let shown = format!("{}", Faults::from_byte(0b0010_0010));
        assert_eq!(
            shown,
            format!("{}, {}", Fault::AngleLimit, Fault::Overload)
        );
    }

    #[quickcheck]
    fn bits_reassemble(byte: u8) -> bool {
        let faults = Faults::from_byte(byte);
        let reassembled = faults.iter().fold(0, |acc, fault| acc | fault.mask());
        reassembled == byte & 0x7F
    }

    #[quickcheck]
    fn iteration_is_in_bit_order(byte: u8) -> bool {
        let bits: Vec<u8> = Faults::from_byte(byte).iter().map(Fault::bit).collect();
        bits.windows(2).all(|pair| pair[0] < pair[1])
    }

    #[quickcheck]
    fn single_fault_roundtrip(fault: Fault) -> bool {
        let faults = Faults::from(fault);
        faults.iter().eq([fault])
    }
}

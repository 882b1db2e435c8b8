//! AX-12A control table.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Read,
    ReadWrite,
}

pub trait Item {
    const ADDRESS: u8;
    const BYTES: u8;
    const ACCESS: Access;
    const DESCRIPTION: &str;
}

/// Runtime view of one `Item`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Register {
    pub name: &'static str,
    pub address: u8,
    pub bytes: u8,
    pub access: Access,
    pub description: &'static str,
}

impl Register {
    #[inline(always)]
    pub const fn of<I: Item>(name: &'static str) -> Self {
        Self {
            name,
            address: I::ADDRESS,
            bytes: I::BYTES,
            access: I::ACCESS,
            description: I::DESCRIPTION,
        }
    }
}

/// One past the last address in the table.
pub const END: u8 = 0x32;

macro_rules! registers {
    ($($id:ident @ $address:literal: $bytes:literal $access:ident $description:literal,)*) => {
        $(
            pub struct $id;
            impl Item for $id {
                const ADDRESS: u8 = $address;
                const BYTES: u8 = $bytes;
                const ACCESS: Access = Access::$access;
                const DESCRIPTION: &str = $description;
            }
        )*

        pub const TABLE: &[Register] = &[$(Register::of::<$id>(stringify!($id)),)*];
    };
}

registers! {
    ModelNumber @ 0x00: 2 Read "Model Number",
    FirmwareVersion @ 0x02: 1 Read "Firmware Version",
    Id @ 0x03: 1 ReadWrite "ID",
    BaudRate @ 0x04: 1 ReadWrite "Baud Rate",
    ReturnDelayTime @ 0x05: 1 ReadWrite "Return Delay Time",
    CwAngleLimit @ 0x06: 2 ReadWrite "CW Angle Limit",
    CcwAngleLimit @ 0x08: 2 ReadWrite "CCW Angle Limit",
    TemperatureLimit @ 0x0B: 1 ReadWrite "Temperature Limit",
    MinVoltageLimit @ 0x0C: 1 ReadWrite "Min Voltage Limit",
    MaxVoltageLimit @ 0x0D: 1 ReadWrite "Max Voltage Limit",
    MaxTorque @ 0x0E: 2 ReadWrite "Max Torque",
    StatusReturnLevel @ 0x10: 1 ReadWrite "Status Return Level",
    AlarmLed @ 0x11: 1 ReadWrite "Alarm LED",
    Shutdown @ 0x12: 1 ReadWrite "Shutdown",
    TorqueEnable @ 0x18: 1 ReadWrite "Torque Enable",
    Led @ 0x19: 1 ReadWrite "LED",
    CwComplianceMargin @ 0x1A: 1 ReadWrite "CW Compliance Margin",
    CcwComplianceMargin @ 0x1B: 1 ReadWrite "CCW Compliance Margin",
    CwComplianceSlope @ 0x1C: 1 ReadWrite "CW Compliance Slope",
    CcwComplianceSlope @ 0x1D: 1 ReadWrite "CCW Compliance Slope",
    GoalPosition @ 0x1E: 2 ReadWrite "Goal Position",
    MovingSpeed @ 0x20: 2 ReadWrite "Moving Speed",
    TorqueLimit @ 0x22: 2 ReadWrite "Torque Limit",
    PresentPosition @ 0x24: 2 Read "Present Position",
    PresentSpeed @ 0x26: 2 Read "Present Speed",
    PresentLoad @ 0x28: 2 Read "Present Load",
    PresentVoltage @ 0x2A: 1 Read "Present Voltage",
    PresentTemperature @ 0x2B: 1 Read "Present Temperature",
    Registered @ 0x2C: 1 Read "Registered",
    Moving @ 0x2E: 1 Read "Moving",
    Lock @ 0x2F: 1 ReadWrite "Lock",
    Punch @ 0x30: 2 ReadWrite "Punch",
}

#[inline]
pub fn lookup(name: &str) -> Option<&'static Register> {
    TABLE.iter().find(|register| register.name.eq_ignore_ascii_case(name))
}

/// Fails if `bytes` bytes starting at `address` would run past `END`.
#[inline]
pub const fn check_span(address: u8, bytes: usize) -> Result<(), crate::UsageError> {
    if address as usize + bytes > END as usize {
        return Err(crate::UsageError::RegisterOverflow { address, bytes });
    }
    Ok(())
}

/// Register value widths: one byte, or a little-endian word.
pub trait Value: Copy {
    const BYTES: u8;

    fn from_le(bytes: &[u8]) -> Option<Self>;
    fn push_le(self, buffer: &mut alloc::vec::Vec<u8>);
}

impl Value for u8 {
    const BYTES: u8 = 1;

    #[inline(always)]
    fn from_le(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [byte] => Some(byte),
            _ => None,
        }
    }

    #[inline(always)]
    fn push_le(self, buffer: &mut alloc::vec::Vec<u8>) {
        buffer.push(self)
    }
}

impl Value for u16 {
    const BYTES: u8 = 2;

    #[inline(always)]
    fn from_le(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [low, high] => Some(high as u16 * 256 + low as u16),
            _ => None,
        }
    }

    #[inline(always)]
    fn push_le(self, buffer: &mut alloc::vec::Vec<u8>) {
        buffer.extend_from_slice(&self.to_le_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_is_sorted_and_disjoint() {
        for pair in TABLE.windows(2) {
            assert!(
                pair[0].address + pair[0].bytes <= pair[1].address,
                "{} overlaps {}",
                pair[0].name,
                pair[1].name,
            );
        }
    }

    #[test]
    fn table_fits_before_end() {
        for register in TABLE {
            assert!(check_span(register.address, register.bytes as usize).is_ok());
        }
    }

    #[test]
    fn lookup_by_name() {
        let goal = lookup("goalposition").expect("GoalPosition is in the table");
        assert_eq!(goal.address, GoalPosition::ADDRESS);
        assert_eq!(goal.bytes, 2);
        assert_eq!(lookup("HomingOffset"), None);
    }

    #[test]
    fn overflow_past_end() {
        assert_eq!(
            check_span(Punch::ADDRESS, 4),
            Err(crate::UsageError::RegisterOverflow {
                address: Punch::ADDRESS,
                bytes: 4
            })
        );
        assert_eq!(check_span(Punch::ADDRESS, 2), Ok(()));
    }

    #[test]
    fn word_is_high_times_256_plus_low() {
        assert_eq!(<u16 as Value>::from_le(&[0x00, 0x02]), Some(512));
        assert_eq!(<u16 as Value>::from_le(&[0xFF, 0x03]), Some(1023));
        assert_eq!(<u16 as Value>::from_le(&[0xFF]), None);
        assert_eq!(<u8 as Value>::from_le(&[0x7F]), Some(0x7F));
    }
}

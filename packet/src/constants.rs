use {
    crate::{Reply, UsageError},
    num_enum::{TryFromPrimitive, TryFromPrimitiveError},
};

pub const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Header, ID, length, error byte, and checksum: a status packet with no parameters.
pub const STATUS_BASE_LENGTH: usize = 6;

/// Header, ID, length, instruction byte, and checksum.
pub const INSTRUCTION_BASE_LENGTH: usize = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Ping,
    Read,
    Write,
    RegWrite,
    Action,
    SyncWrite,
}

/// Numeric instruction codes. These belong to the device family, not the protocol engine,
/// so every packet is built against one of these tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InstructionSet {
    pub ping: u8,
    pub read: u8,
    pub write: u8,
    pub reg_write: u8,
    pub action: u8,
    pub sync_write: u8,
}

impl InstructionSet {
    pub const PROTOCOL_1: Self = Self {
        ping: 0x01,
        read: 0x02,
        write: 0x03,
        reg_write: 0x04,
        action: 0x05,
        sync_write: 0x83,
    };

    #[inline]
    pub const fn byte(&self, kind: Kind) -> u8 {
        match kind {
            Kind::Ping => self.ping,
            Kind::Read => self.read,
            Kind::Write => self.write,
            Kind::RegWrite => self.reg_write,
            Kind::Action => self.action,
            Kind::SyncWrite => self.sync_write,
        }
    }
}

impl Default for InstructionSet {
    #[inline(always)]
    fn default() -> Self {
        Self::PROTOCOL_1
    }
}

/// Status return level, as stored in the `StatusReturnLevel` register.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, TryFromPrimitive)]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum ReturnLevel {
    /// Only ping is answered.
    PingOnly = 0,
    /// Ping and reads are answered.
    Reads = 1,
    /// Every instruction addressed to one device is answered.
    All = 2,
}

/// Factory setting.
impl Default for ReturnLevel {
    #[inline(always)]
    fn default() -> Self {
        Self::All
    }
}

impl ReturnLevel {
    #[inline]
    pub const fn expects(self, reply: Reply) -> bool {
        match reply {
            Reply::Always => true,
            Reply::AtFullReturnLevel => matches!(self, Self::All),
            Reply::Never => false,
        }
    }
}

impl From<TryFromPrimitiveError<ReturnLevel>> for UsageError {
    #[inline]
    fn from(e: TryFromPrimitiveError<ReturnLevel>) -> Self {
        Self::InvalidReturnLevel { level: e.number }
    }
}

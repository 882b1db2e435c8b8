#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod checksum;
pub mod constants;
pub mod control_table;
pub mod fault;
pub mod packet;
pub mod parse;
pub mod recv;
pub mod send;

pub use {
    constants::{InstructionSet, Kind, ReturnLevel},
    fault::{Fault, Faults},
    packet::{decode_status, encode, recv::FrameError},
    recv::StatusPacket,
};

/// Lowest ID an individual actuator can answer to.
pub const MIN_ID: u8 = 0;
/// Highest ID an individual actuator can answer to.
pub const MAX_ID: u8 = 253;
/// Addresses every actuator on the bus at once. Nothing ever replies to it.
pub const BROADCAST_ID: u8 = 0xFE;

/// Which instructions elicit a status packet, before the return level is taken into account.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reply {
    /// Always answered (ping, read).
    Always,
    /// Answered only at `ReturnLevel::All`.
    AtFullReturnLevel,
    /// Never answered (sync-write).
    Never,
}

pub trait Instruction {
    const KIND: Kind;
    const REPLY: Reply;

    fn parameters(&self, buffer: &mut alloc::vec::Vec<u8>);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("Invalid Dynamixel ID: {id}")]
    InvalidId { id: u8 },
    #[error("Invalid status return level: {level} (expected 0, 1, or 2)")]
    InvalidReturnLevel { level: u8 },
    #[error("Invalid return delay: {units} (expected at most 254)")]
    InvalidReturnDelay { units: u8 },
    #[error("Nothing to write")]
    EmptyPayload,
    #[error("Sync-write batch has no devices")]
    EmptyBatch,
    #[error(
        "Sync-write payloads must all be the same length: ID {id} supplied {actual} values but the batch expects {expected}"
    )]
    MismatchedLengths {
        id: u8,
        expected: usize,
        actual: usize,
    },
    #[error("Writing {bytes} bytes at address {address:#04X} runs past the end of the control table")]
    RegisterOverflow { address: u8, bytes: usize },
    #[error("Packet would need a length field of {length}, but the field is a single byte")]
    FrameTooLong { length: usize },
}

#[inline]
pub const fn check_individual_id(id: u8) -> Result<(), UsageError> {
    if id > MAX_ID {
        return Err(UsageError::InvalidId { id });
    }
    Ok(())
}

#[inline]
pub const fn check_target_id(id: u8) -> Result<(), UsageError> {
    if id > MAX_ID && id != BROADCAST_ID {
        return Err(UsageError::InvalidId { id });
    }
    Ok(())
}

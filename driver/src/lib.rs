//! Blocking Dynamixel protocol 1.0 driver: one shared bus, many actuators.

pub mod actuator;
pub mod bus;
pub mod comm;
pub mod config;
pub mod joint;
pub mod mutex;
#[cfg(feature = "serialport")]
pub mod serial;
pub mod units;

#[cfg(test)]
mod test_util;

pub use {
    actuator::Actuator,
    bus::Bus,
    comm::Comm,
    config::{BusConfig, ConfigError},
    joint::{Joint, JointConfig},
    mutex::Mutex,
    servo_packet as packet,
    units::{Calibration, CalibrationError},
};

use {
    servo_packet::{FrameError, UsageError, fault::Faults, recv::StatusPacket},
    std::io,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error sending a packet: {0}")]
    Send(#[source] io::Error),
    #[error("Error receiving a packet: {0}")]
    Recv(#[source] io::Error),
    #[error("Transport accepted only {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("No status packet from ID {id} before the read timed out")]
    NoReply { id: u8 },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Expected a status packet from ID {expected} but ID {actual} answered")]
    WrongId { expected: u8, actual: u8 },
    #[error("ID {id} returned {actual} parameter bytes instead of {expected}")]
    ParameterCount {
        id: u8,
        expected: usize,
        actual: usize,
    },
    #[error("ID {id} reported: {faults}")]
    Device { id: u8, faults: Faults },
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("Angle {angle} rad is outside ID {id}'s soft limits [{min}, {max}] rad")]
    SoftLimit {
        id: u8,
        angle: f64,
        min: f64,
        max: f64,
    },
    #[error("Joint is configured for ID {config} but drives a session for ID {session}")]
    IdMismatch { config: u8, session: u8 },
    #[error("Mutex error while waiting to use the bus: {0}")]
    Lock(String),
    #[error("Synchronized joints must all share one bus")]
    MixedBuses,
}

/// Surface every fault set in a status packet's error byte.
#[inline]
pub(crate) fn check_faults(packet: &StatusPacket) -> Result<(), Error> {
    let faults = packet.faults();
    if faults.is_empty() {
        return Ok(());
    }
    log::warn!("ID {} reported: {faults}", packet.id);
    Err(Error::Device {
        id: packet.id,
        faults,
    })
}

#[cfg(test)]
mod test {
    use {super::*, servo_packet::fault::Fault};

    #[test]
    fn clean_status() {
        let packet = StatusPacket {
            id: 3,
            error: 0,
            parameters: vec![],
        };
        assert!(check_faults(&packet).is_ok());
    }

    #[test]
    fn every_fault_surfaces() {
        let packet = StatusPacket {
            id: 3,
            error: 0b0100_0101,
            parameters: vec![],
        };
        let Err(Error::Device { id, faults }) = check_faults(&packet) else {
            panic!("fault byte was ignored");
        };
        assert_eq!(id, 3);
        assert_eq!(
            faults.iter().collect::<Vec<_>>(),
            [Fault::InputVoltage, Fault::Overheating, Fault::Instruction]
        );
    }
}

pub mod recv;
pub mod send;

pub use send::{encode, new};

use {
    crate::{
        parse::{self, Fed},
        recv::StatusPacket,
    },
    recv::{FrameError, Malformation, WithChecksum},
};

/// Decode exactly one status packet occupying all of `raw`.
#[inline]
pub fn decode_status(raw: &[u8]) -> Result<StatusPacket, FrameError> {
    match parse::feed::<WithChecksum>(raw)? {
        Fed::Complete { output, consumed } => {
            if consumed != raw.len() {
                log::error!(
                    "{} stray bytes after a complete status packet: {:02X?}",
                    raw.len() - consumed,
                    &raw[consumed..],
                );
                return Err(Malformation::LengthMismatch {
                    expected: consumed,
                    received: raw.len(),
                }
                .into());
            }
            output.verify()
        }
        Fed::Exhausted(state) => Err(match state.declared_frame_length() {
            Some(expected) => Malformation::LengthMismatch {
                expected,
                received: raw.len(),
            },
            None => Malformation::Truncated {
                received: raw.len(),
            },
        }
        .into()),
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{checksum::Checksum, constants::InstructionSet, send},
        quickcheck::TestResult,
        quickcheck_macros::quickcheck,
    };

    /// Status packets share the instruction packet's framing, with the error byte in place of
    /// the instruction code.
    fn status(id: u8, error: u8, parameters: &[u8]) -> Vec<u8> {
        encode(id, error, parameters).expect("short enough to frame")
    }

    #[test]
    fn ping_frame() {
        let frame = new(&InstructionSet::PROTOCOL_1, 1, &send::Ping).expect("valid ID");
        assert_eq!(frame, [0xFF, 0xFF, 0x01, 0x02, 0x01, 0xFB]);
    }

    #[test]
    fn read_frame() {
        // Read the internal temperature of ID 1.
        let frame = new(
            &InstructionSet::PROTOCOL_1,
            1,
            &send::Read {
                address: 0x2B,
                count: 1,
            },
        )
        .expect("valid ID");
        assert_eq!(frame, [0xFF, 0xFF, 0x01, 0x04, 0x02, 0x2B, 0x01, 0xCC]);
    }

    #[test]
    fn goal_position_frame() {
        let frame = new(
            &InstructionSet::PROTOCOL_1,
            2,
            &send::Write {
                address: 0x1E,
                data: &[0x00, 0x02],
            },
        )
        .expect("valid ID");
        assert_eq!(frame.len(), 9);
        assert_eq!(frame[..7], [0xFF, 0xFF, 0x02, 0x05, 0x03, 0x1E, 0x00]);
        assert_eq!(frame[8], Checksum::over(&[0x02, 0x05, 0x03, 0x1E, 0x00, 0x02]));
    }

    #[test]
    fn parser_waits_on_the_error_byte() {
        use {crate::parse::State as _, recv::WithoutChecksum};

        let mut state = WithoutChecksum::INIT;
        for byte in [0xFF, 0xFF, 0x01, 0x03] {
            state = match state.push(byte) {
                Ok(parse::Status::Incomplete((state, ()))) => state,
                other => panic!("stopped early: {other:?}"),
            };
        }
        assert!(matches!(
            state,
            WithoutChecksum::ErrorByte {
                id: 1,
                parameters: 1,
                ..
            }
        ));
        assert_eq!(state.declared_frame_length(), Some(7));
        assert_eq!(
            decode_status(&status(1, 0x20, &[0x07])).map(|packet| (packet.error, packet.parameters)),
            Ok((0x20, vec![0x07]))
        );
    }

    #[test]
    fn custom_instruction_codes() {
        let instructions = InstructionSet {
            ping: 0x11,
            ..InstructionSet::PROTOCOL_1
        };
        let frame = new(&instructions, 3, &send::Ping).expect("valid ID");
        assert_eq!(frame[4], 0x11);
    }

    #[test]
    fn invalid_target() {
        assert_eq!(
            new(&InstructionSet::PROTOCOL_1, 0xFF, &send::Ping),
            Err(crate::UsageError::InvalidId { id: 0xFF })
        );
        assert!(new(&InstructionSet::PROTOCOL_1, crate::BROADCAST_ID, &send::Action).is_ok());
    }

    #[test]
    fn too_long_to_frame() {
        assert_eq!(
            encode(1, 0x03, &[0; 254]),
            Err(crate::UsageError::FrameTooLong { length: 256 })
        );
        assert!(encode(1, 0x03, &[0; 253]).is_ok());
    }

    #[test]
    fn decode_minimal() {
        let decoded = decode_status(&[0xFF, 0xFF, 0x01, 0x02, 0x00, 0xFC]).expect("well-formed");
        assert_eq!(
            decoded,
            StatusPacket {
                id: 1,
                error: 0,
                parameters: vec![],
            }
        );
    }

    #[test]
    fn decode_bad_header() {
        assert_eq!(
            decode_status(&[0xFF, 0xFE, 0x01, 0x02, 0x00, 0xFC]),
            Err(FrameError::Malformed(Malformation::Header {
                position: 1,
                actual: 0xFE
            }))
        );
    }

    #[test]
    fn decode_truncated() {
        assert_eq!(
            decode_status(&[0xFF, 0xFF, 0x01]),
            Err(FrameError::Malformed(Malformation::Truncated { received: 3 }))
        );
        assert_eq!(
            decode_status(&[]),
            Err(FrameError::Malformed(Malformation::Truncated { received: 0 }))
        );
    }

    #[test]
    fn decode_short_of_declared_length() {
        assert_eq!(
            decode_status(&[0xFF, 0xFF, 0x01, 0x04, 0x00, 0x20]),
            Err(FrameError::Malformed(Malformation::LengthMismatch {
                expected: 8,
                received: 6
            }))
        );
    }

    #[test]
    fn decode_trailing_bytes() {
        assert_eq!(
            decode_status(&[0xFF, 0xFF, 0x01, 0x02, 0x00, 0xFC, 0x00]),
            Err(FrameError::Malformed(Malformation::LengthMismatch {
                expected: 6,
                received: 7
            }))
        );
    }

    #[test]
    fn decode_impossible_length() {
        assert_eq!(
            decode_status(&[0xFF, 0xFF, 0x01, 0x01, 0x00]),
            Err(FrameError::Malformed(Malformation::LengthTooShort {
                declared: 1
            }))
        );
    }

    #[quickcheck]
    fn roundtrip(id: u8, error: u8, parameters: Vec<u8>) -> TestResult {
        if parameters.len() > 253 {
            return TestResult::discard();
        }
        let frame = status(id, error, &parameters);
        match decode_status(&frame) {
            Ok(decoded) if decoded.id == id && decoded.error == error && decoded.parameters == parameters => {
                TestResult::passed()
            }
            Ok(decoded) => TestResult::error(format!("{frame:02X?} -> {decoded:02X?}")),
            Err(e) => TestResult::error(format!("{frame:02X?} -> {e}")),
        }
    }

    #[quickcheck]
    fn single_byte_corruption(
        id: u8,
        error: u8,
        parameters: Vec<u8>,
        index: usize,
        flip: u8,
    ) -> TestResult {
        if parameters.len() > 253 || flip == 0 {
            return TestResult::discard();
        }
        let mut frame = status(id, error, &parameters);
        // ID, error byte, or any parameter; never the length field.
        let candidates: Vec<usize> = core::iter::once(2)
            .chain(4..frame.len() - 1)
            .collect();
        let target = candidates[index % candidates.len()];
        frame[target] ^= flip;
        match decode_status(&frame) {
            Err(FrameError::ChecksumMismatch { .. }) => TestResult::passed(),
            other => TestResult::error(format!(
                "Flipping {flip:08b} at byte {target} of {frame:02X?} gave {other:?}"
            )),
        }
    }
}

use {
    crate::{
        checksum::Checksum,
        constants::HEADER,
        parse::{self, State as _},
        recv::StatusPacket,
    },
    alloc::vec::Vec,
    core::fmt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Malformation {
    #[error("Header byte #{position} should be `xFF` but was `x{actual:02X}`")]
    Header { position: u8, actual: u8 },
    #[error("Declared length {declared} cannot hold an error byte and a checksum")]
    LengthTooShort { declared: u8 },
    #[error("Frame should be {expected} bytes long according to its length field, but {received} bytes arrived")]
    LengthMismatch { expected: usize, received: usize },
    #[error("Only {received} bytes arrived, too few to contain a length field")]
    Truncated { received: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("Malformed status packet: {0}")]
    Malformed(#[from] Malformation),
    #[error("Checksum mismatch: computed `x{expected:02X}` but received `x{actual:02X}`")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// Status packet whose trailing checksum has not yet been compared with the computed one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unverified {
    pub packet: StatusPacket,
    pub expected: u8,
    pub actual: u8,
}

impl Unverified {
    #[inline]
    pub fn verify(self) -> Result<StatusPacket, FrameError> {
        let Self {
            packet,
            expected,
            actual,
        } = self;
        if expected == actual {
            Ok(packet)
        } else {
            Err(FrameError::ChecksumMismatch { expected, actual })
        }
    }
}

/// Everything up to (not including) the checksum byte.
#[derive(Debug)]
pub enum WithoutChecksum {
    Header1,
    Header2,
    Id,
    Length {
        id: u8,
    },
    ErrorByte {
        id: u8,
        parameters: u8,
        checksum: Checksum,
    },
    Parameters {
        id: u8,
        error: u8,
        remaining: u8,
        parameters: Vec<u8>,
        checksum: Checksum,
    },
}

impl WithoutChecksum {
    /// Bytes the frame will occupy in total, once its length field has been seen.
    #[inline]
    pub fn declared_frame_length(&self) -> Option<usize> {
        match *self {
            Self::Header1 | Self::Header2 | Self::Id | Self::Length { .. } => None,
            Self::ErrorByte { parameters, .. } => Some(parameters as usize + 6),
            Self::Parameters {
                ref parameters,
                remaining,
                ..
            } => Some(parameters.len() + remaining as usize + 6),
        }
    }
}

impl parse::State<u8> for WithoutChecksum {
    type Output = (StatusPacket, u8);
    type SideEffect = ();
    type Error = Malformation;

    const INIT: Self = Self::Header1;

    #[inline]
    fn push(
        self,
        input: u8,
    ) -> Result<parse::Status<Self::Output, (Self, Self::SideEffect)>, Self::Error> {
        macro_rules! expect_header {
            ($position:literal, $next:ident) => {
                if input == HEADER[$position] {
                    Self::$next
                } else {
                    return Err(Malformation::Header {
                        position: $position,
                        actual: input,
                    });
                }
            };
        }

        Ok(parse::Status::Incomplete((
            match self {
                Self::Header1 => expect_header!(0, Header2),
                Self::Header2 => expect_header!(1, Id),
                Self::Id => Self::Length { id: input },
                Self::Length { id } => {
                    let Some(parameters) = input.checked_sub(2) else {
                        return Err(Malformation::LengthTooShort { declared: input });
                    };
                    let mut checksum = Checksum::new();
                    let () = checksum.push(id);
                    let () = checksum.push(input);
                    Self::ErrorByte {
                        id,
                        parameters,
                        checksum,
                    }
                }
                Self::ErrorByte {
                    id,
                    parameters,
                    mut checksum,
                } => {
                    let () = checksum.push(input);
                    if parameters == 0 {
                        return Ok(parse::Status::Complete((
                            StatusPacket {
                                id,
                                error: input,
                                parameters: Vec::new(),
                            },
                            checksum.collapse(),
                        )));
                    }
                    Self::Parameters {
                        id,
                        error: input,
                        remaining: parameters,
                        parameters: Vec::with_capacity(parameters as usize),
                        checksum,
                    }
                }
                Self::Parameters {
                    id,
                    error,
                    remaining,
                    mut parameters,
                    mut checksum,
                } => {
                    let () = checksum.push(input);
                    parameters.push(input);
                    let remaining = remaining - 1;
                    if remaining == 0 {
                        return Ok(parse::Status::Complete((
                            StatusPacket {
                                id,
                                error,
                                parameters,
                            },
                            checksum.collapse(),
                        )));
                    }
                    Self::Parameters {
                        id,
                        error,
                        remaining,
                        parameters,
                        checksum,
                    }
                }
            },
            (),
        )))
    }
}

impl fmt::Display for WithoutChecksum {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Header1 => write!(f, "Waiting for the first header byte"),
            Self::Header2 => write!(f, "Waiting for the second header byte"),
            Self::Id => write!(f, "Waiting for the ID"),
            Self::Length { id } => write!(f, "Waiting for the length (ID {id})"),
            Self::ErrorByte { id, parameters, .. } => write!(
                f,
                "Waiting for the error byte (ID {id}, expecting {parameters} parameters)"
            ),
            Self::Parameters {
                id,
                remaining,
                ref parameters,
                ..
            } => write!(
                f,
                "Waiting for {remaining} more parameters (ID {id}, already received {parameters:02X?})"
            ),
        }
    }
}

#[derive(Debug)]
pub enum WithChecksum {
    Body(WithoutChecksum),
    Checksum { packet: StatusPacket, expected: u8 },
}

impl WithChecksum {
    #[inline]
    pub fn declared_frame_length(&self) -> Option<usize> {
        match *self {
            Self::Body(ref body) => body.declared_frame_length(),
            Self::Checksum { ref packet, .. } => Some(packet.parameters.len() + 6),
        }
    }
}

impl parse::State<u8> for WithChecksum {
    type Output = Unverified;
    type SideEffect = ();
    type Error = Malformation;

    const INIT: Self = Self::Body(WithoutChecksum::INIT);

    #[inline]
    fn push(
        self,
        input: u8,
    ) -> Result<parse::Status<Self::Output, (Self, Self::SideEffect)>, Self::Error> {
        Ok(parse::Status::Incomplete((
            match self {
                Self::Body(body) => match body.push(input)? {
                    parse::Status::Complete((packet, expected)) => {
                        Self::Checksum { packet, expected }
                    }
                    parse::Status::Incomplete((body, ())) => Self::Body(body),
                },
                Self::Checksum { packet, expected } => {
                    return Ok(parse::Status::Complete(Unverified {
                        packet,
                        expected,
                        actual: input,
                    }));
                }
            },
            (),
        )))
    }
}

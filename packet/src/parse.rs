use core::fmt;

#[derive(Debug)]
pub enum Status<Output, SideEffect> {
    Complete(Output),
    Incomplete(SideEffect),
}

pub trait State<Input>: Sized {
    type Output;
    type SideEffect;
    type Error: fmt::Display;

    const INIT: Self;

    #[expect(clippy::type_complexity, reason = "the side effect rides along with the state")]
    fn push(
        self,
        input: Input,
    ) -> Result<Status<Self::Output, (Self, Self::SideEffect)>, Self::Error>;
}

/// Result of feeding a whole slice into a parser.
#[derive(Debug, Eq, PartialEq)]
pub enum Fed<Output, S> {
    /// The parser finished after consuming `consumed` bytes.
    Complete { output: Output, consumed: usize },
    /// The input ran out first.
    Exhausted(S),
}

#[inline]
pub fn feed<S: State<u8>>(bytes: &[u8]) -> Result<Fed<S::Output, S>, S::Error> {
    let mut state = S::INIT;
    for (i, &byte) in bytes.iter().enumerate() {
        state = match state.push(byte)? {
            Status::Complete(output) => {
                return Ok(Fed::Complete {
                    output,
                    consumed: i + 1,
                });
            }
            Status::Incomplete((updated, _)) => updated,
        };
    }
    Ok(Fed::Exhausted(state))
}

use {crate::fault::Faults, alloc::vec::Vec};

/// Status packet with its framing stripped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusPacket {
    pub id: u8,
    pub error: u8,
    pub parameters: Vec<u8>,
}

impl StatusPacket {
    #[inline(always)]
    pub const fn faults(&self) -> Faults {
        Faults::from_byte(self.error)
    }
}

use {
    crate::{
        Instruction, Reply, UsageError, check_individual_id, constants::Kind, control_table,
    },
    alloc::vec::Vec,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ping;

impl Instruction for Ping {
    const KIND: Kind = Kind::Ping;
    const REPLY: Reply = Reply::Always;

    #[inline(always)]
    fn parameters(&self, _: &mut Vec<u8>) {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Read {
    pub address: u8,
    pub count: u8,
}

impl Instruction for Read {
    const KIND: Kind = Kind::Read;
    const REPLY: Reply = Reply::Always;

    #[inline(always)]
    fn parameters(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&[self.address, self.count]);
    }
}

/// Applied as soon as the device receives it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Write<'data> {
    pub address: u8,
    pub data: &'data [u8],
}

impl Instruction for Write<'_> {
    const KIND: Kind = Kind::Write;
    const REPLY: Reply = Reply::AtFullReturnLevel;

    #[inline(always)]
    fn parameters(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.address);
        buffer.extend_from_slice(self.data);
    }
}

/// Buffered on the device until an `Action` arrives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegWrite<'data> {
    pub address: u8,
    pub data: &'data [u8],
}

impl Instruction for RegWrite<'_> {
    const KIND: Kind = Kind::RegWrite;
    const REPLY: Reply = Reply::AtFullReturnLevel;

    #[inline(always)]
    fn parameters(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.address);
        buffer.extend_from_slice(self.data);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Action;

impl Instruction for Action {
    const KIND: Kind = Kind::Action;
    const REPLY: Reply = Reply::AtFullReturnLevel;

    #[inline(always)]
    fn parameters(&self, _: &mut Vec<u8>) {}
}

/// One frame writing the same register span on many devices. Always broadcast, never answered.
///
/// Every value goes out as a little-endian word, even where the register is a single byte.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncWrite {
    address: u8,
    values_per_device: usize,
    /// `[id, low, high, low, high, ..., id, low, high, ...]`
    entries: Vec<u8>,
}

impl SyncWrite {
    #[inline]
    pub fn new<Values: AsRef<[u16]>>(
        address: u8,
        batch: impl IntoIterator<Item = (u8, Values)>,
    ) -> Result<Self, UsageError> {
        let mut values_per_device = None;
        let mut entries = Vec::new();
        for (id, values) in batch {
            let values = values.as_ref();
            let () = check_individual_id(id)?;
            let expected = *values_per_device.get_or_insert(values.len());
            if values.len() != expected {
                return Err(UsageError::MismatchedLengths {
                    id,
                    expected,
                    actual: values.len(),
                });
            }
            entries.push(id);
            for &value in values {
                entries.extend_from_slice(&value.to_le_bytes());
            }
        }
        let Some(values_per_device) = values_per_device else {
            return Err(UsageError::EmptyBatch);
        };
        if values_per_device == 0 {
            return Err(UsageError::EmptyPayload);
        }
        let () = control_table::check_span(address, 2 * values_per_device)?;
        Ok(Self {
            address,
            values_per_device,
            entries,
        })
    }

    #[inline(always)]
    pub const fn address(&self) -> u8 {
        self.address
    }

    #[inline(always)]
    pub const fn values_per_device(&self) -> usize {
        self.values_per_device
    }

    #[inline(always)]
    pub fn device_count(&self) -> usize {
        self.entries.len() / (2 * self.values_per_device + 1)
    }

    /// Value of the frame's length field: `(2n + 1) * d + 4`.
    #[inline(always)]
    pub fn length_field(&self) -> usize {
        (2 * self.values_per_device + 1) * self.device_count() + 4
    }
}

impl Instruction for SyncWrite {
    const KIND: Kind = Kind::SyncWrite;
    const REPLY: Reply = Reply::Never;

    #[inline]
    fn parameters(&self, buffer: &mut Vec<u8>) {
        // `check_span` bounds this by `control_table::END`.
        let bytes_per_device = (2 * self.values_per_device) as u8;
        buffer.extend_from_slice(&[self.address, bytes_per_device]);
        buffer.extend_from_slice(&self.entries);
    }
}

use {
    crate::{Error, check_faults, comm::Comm},
    servo_packet::{
        BROADCAST_ID, Instruction, InstructionSet, ReturnLevel, check_individual_id,
        constants::STATUS_BASE_LENGTH,
        control_table, decode_status, packet,
        recv::StatusPacket,
        send::{self, SyncWrite},
    },
};

/// The shared line. Every transaction is one write followed, when a reply is due, by one read.
pub struct Bus<C: Comm> {
    comm: C,
    instructions: InstructionSet,
}

impl<C: Comm> Bus<C> {
    #[inline(always)]
    pub const fn new(comm: C) -> Self {
        Self::with_instructions(comm, InstructionSet::PROTOCOL_1)
    }

    #[inline(always)]
    pub const fn with_instructions(comm: C, instructions: InstructionSet) -> Self {
        Self { comm, instructions }
    }

    #[inline(always)]
    pub const fn instructions(&self) -> &InstructionSet {
        &self.instructions
    }

    #[inline(always)]
    pub const fn comm(&self) -> &C {
        &self.comm
    }

    #[inline(always)]
    pub const fn comm_mut(&mut self) -> &mut C {
        &mut self.comm
    }

    #[inline(always)]
    pub fn into_comm(self) -> C {
        self.comm
    }

    #[inline]
    fn send<Insn: Instruction>(&mut self, id: u8, instruction: &Insn) -> Result<(), Error> {
        let frame = packet::new(&self.instructions, id, instruction)?;
        log::trace!("Sending {frame:02X?} to ID {id}");
        let written = self.comm.write(&frame).map_err(Error::Send)?;
        if written != frame.len() {
            return Err(Error::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        Ok(())
    }

    /// `None` if nothing arrived before the transport timed out.
    #[inline]
    fn receive(&mut self, id: u8, parameters: usize) -> Result<Option<StatusPacket>, Error> {
        let raw = self
            .comm
            .read(STATUS_BASE_LENGTH + parameters)
            .map_err(Error::Recv)?;
        if raw.is_empty() {
            return Ok(None);
        }
        log::trace!("Received {raw:02X?} from ID {id}");
        let packet = match decode_status(&raw) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("Discarding buffered input after a bad frame from ID {id}: {e}");
                let () = self.comm.discard_input().map_err(Error::Recv)?;
                return Err(Error::Frame(e));
            }
        };
        if packet.id != id {
            return Err(Error::WrongId {
                expected: id,
                actual: packet.id,
            });
        }
        Ok(Some(packet))
    }

    /// Send one instruction and read its reply if `level` says one is coming.
    #[inline]
    pub fn transact<Insn: Instruction>(
        &mut self,
        id: u8,
        instruction: &Insn,
        level: ReturnLevel,
        parameters: usize,
    ) -> Result<Option<StatusPacket>, Error> {
        let () = self.send(id, instruction)?;
        if id == BROADCAST_ID || !level.expects(Insn::REPLY) {
            return Ok(None);
        }
        self.receive(id, parameters)
    }

    /// `Ok(None)` means no device answered.
    #[inline]
    pub fn ping(&mut self, id: u8) -> Result<Option<StatusPacket>, Error> {
        let () = check_individual_id(id)?;
        let Some(status) = self.transact(id, &send::Ping, ReturnLevel::PingOnly, 0)? else {
            log::debug!("Nothing at ID {id}");
            return Ok(None);
        };
        let () = check_faults(&status)?;
        Ok(Some(status))
    }

    /// Reads are always answered. The error byte is left for the caller to inspect.
    #[inline]
    pub fn read(&mut self, id: u8, address: u8, count: u8) -> Result<StatusPacket, Error> {
        let () = check_individual_id(id)?;
        let () = control_table::check_span(address, count as usize)?;
        self.transact(
            id,
            &send::Read { address, count },
            ReturnLevel::PingOnly,
            count as usize,
        )?
        .ok_or(Error::NoReply { id })
    }

    /// Write now (`immediate`) or buffer until the next action.
    #[inline]
    pub fn write(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
        immediate: bool,
        level: ReturnLevel,
    ) -> Result<Option<StatusPacket>, Error> {
        if data.is_empty() {
            return Err(servo_packet::UsageError::EmptyPayload.into());
        }
        let () = control_table::check_span(address, data.len())?;
        let status = if immediate {
            self.transact(id, &send::Write { address, data }, level, 0)?
        } else {
            log::debug!("Buffering {data:02X?} at {address:#04X} on ID {id}");
            self.transact(id, &send::RegWrite { address, data }, level, 0)?
        };
        self.expect_if_due(id, level, status)
    }

    /// Apply buffered writes on `id`, or on every device if `id` is the broadcast ID.
    #[inline]
    pub fn action(&mut self, id: u8, level: ReturnLevel) -> Result<Option<StatusPacket>, Error> {
        let status = self.transact(id, &send::Action, level, 0)?;
        self.expect_if_due(id, level, status)
    }

    #[inline]
    pub fn action_all(&mut self) -> Result<(), Error> {
        self.send(BROADCAST_ID, &send::Action)
    }

    /// Fire and forget: nothing is read back.
    #[inline]
    pub fn sync_write(&mut self, batch: &SyncWrite) -> Result<(), Error> {
        log::debug!(
            "Sync-writing {} words to each of {} devices at {:#04X}",
            batch.values_per_device(),
            batch.device_count(),
            batch.address(),
        );
        self.send(BROADCAST_ID, batch)
    }

    /// IDs that answered a ping. A device reporting a fault is still present.
    #[inline]
    pub fn scan(&mut self, ids: impl IntoIterator<Item = u8>) -> Result<Vec<u8>, Error> {
        let mut present = vec![];
        for id in ids {
            match self.ping(id) {
                Ok(Some(_)) => present.push(id),
                Ok(None) => {}
                Err(Error::Device { id, faults }) => {
                    log::info!("ID {id} is present but reports: {faults}");
                    present.push(id)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(present)
    }

    #[inline]
    fn expect_if_due(
        &self,
        id: u8,
        level: ReturnLevel,
        status: Option<StatusPacket>,
    ) -> Result<Option<StatusPacket>, Error> {
        if status.is_none() && id != BROADCAST_ID && level == ReturnLevel::All {
            return Err(Error::NoReply { id });
        }
        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::test_util::MockComm,
        servo_packet::{
            checksum::Checksum,
            control_table::{GoalPosition, Item, MovingSpeed},
        },
    };

    #[test]
    fn ping_absent_device() {
        let mut bus = Bus::new(MockComm::new().silence());
        assert_eq!(bus.ping(7).expect("silence is not an error"), None);
        assert_eq!(bus.comm().written, [vec![0xFF, 0xFF, 0x07, 0x02, 0x01, 0xF5]]);
    }

    #[test]
    fn ping_present_device() {
        let mut bus = Bus::new(MockComm::new().status(7, 0, &[]));
        let status = bus.ping(7).expect("clean reply").expect("device answered");
        assert_eq!(status.id, 7);
    }

    #[test]
    fn ping_surfaces_faults() {
        let mut bus = Bus::new(MockComm::new().status(7, 0b0000_0100, &[]));
        assert!(matches!(bus.ping(7), Err(Error::Device { id: 7, .. })));
    }

    #[test]
    fn read_returns_parameters() {
        let mut bus = Bus::new(MockComm::new().status(1, 0, &[0x00, 0x02]));
        let status = bus.read(1, GoalPosition::ADDRESS, 2).expect("clean reply");
        assert_eq!(status.parameters, [0x00, 0x02]);
        assert_eq!(
            bus.comm().written,
            [vec![0xFF, 0xFF, 0x01, 0x04, 0x02, 0x1E, 0x02, 0xD8]]
        );
    }

    #[test]
    fn read_without_reply() {
        let mut bus = Bus::new(MockComm::new().silence());
        assert!(matches!(
            bus.read(1, GoalPosition::ADDRESS, 2),
            Err(Error::NoReply { id: 1 })
        ));
    }

    #[test]
    fn wrong_id_answers() {
        let mut bus = Bus::new(MockComm::new().status(2, 0, &[0x00, 0x02]));
        assert!(matches!(
            bus.read(1, GoalPosition::ADDRESS, 2),
            Err(Error::WrongId {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn bad_frame_discards_input() {
        let mut bus = Bus::new(MockComm::new().reply([0xFF, 0xFF, 0x01, 0x04, 0x00, 0x00, 0x02, 0x00]));
        assert!(matches!(
            bus.read(1, GoalPosition::ADDRESS, 2),
            Err(Error::Frame(servo_packet::FrameError::ChecksumMismatch { .. }))
        ));
        assert_eq!(bus.comm().discards, 1);
    }

    #[test]
    fn write_at_reads_level_reads_nothing() {
        let mut bus = Bus::new(MockComm::new());
        assert_eq!(
            bus.write(1, MovingSpeed::ADDRESS, &[0x00, 0x01], true, ReturnLevel::Reads)
                .expect("no reply expected"),
            None
        );
        assert_eq!(bus.comm().reads, 0);
        assert_eq!(bus.comm().written.len(), 1);
    }

    #[test]
    fn write_at_full_level_needs_reply() {
        let mut bus = Bus::new(MockComm::new().silence());
        assert!(matches!(
            bus.write(1, MovingSpeed::ADDRESS, &[0x00, 0x01], true, ReturnLevel::All),
            Err(Error::NoReply { id: 1 })
        ));
    }

    #[test]
    fn buffered_write_uses_reg_write() {
        let mut bus = Bus::new(MockComm::new().status(1, 0, &[]));
        let _ = bus
            .write(1, GoalPosition::ADDRESS, &[0x00, 0x02], false, ReturnLevel::All)
            .expect("clean reply");
        assert_eq!(bus.comm().written[0][4], InstructionSet::PROTOCOL_1.reg_write);
    }

    #[test]
    fn write_past_end_of_table() {
        let mut bus = Bus::new(MockComm::new());
        assert!(matches!(
            bus.write(1, 0x31, &[0, 0], true, ReturnLevel::Reads),
            Err(Error::Usage(servo_packet::UsageError::RegisterOverflow {
                address: 0x31,
                bytes: 2
            }))
        ));
        assert!(bus.comm().written.is_empty());
    }

    #[test]
    fn broadcast_action_reads_nothing() {
        let mut bus = Bus::new(MockComm::new());
        let () = bus.action_all().expect("nothing to go wrong");
        assert_eq!(bus.comm().reads, 0);
        let frame = &bus.comm().written[0];
        assert_eq!(frame[..5], [0xFF, 0xFF, BROADCAST_ID, 0x02, 0x05]);
        assert_eq!(frame[5], Checksum::over(&[BROADCAST_ID, 0x02, 0x05]));
    }

    #[test]
    fn sync_write_reads_nothing() {
        let batch = SyncWrite::new(
            GoalPosition::ADDRESS,
            [(1, [0x010_u16, 0x150]), (2, [0x220, 0x360])],
        )
        .expect("well-formed batch");
        let mut bus = Bus::new(MockComm::new());
        let () = bus.sync_write(&batch).expect("nothing to go wrong");
        assert_eq!(bus.comm().reads, 0);
        let frame = &bus.comm().written[0];
        assert_eq!(
            frame[..],
            [
                0xFF, 0xFF, 0xFE, 0x0E, 0x83, 0x1E, 0x04, //
                0x01, 0x10, 0x00, 0x50, 0x01, //
                0x02, 0x20, 0x02, 0x60, 0x03, //
                0x65,
            ]
        );
    }

    #[test]
    fn short_write() {
        let mut comm = MockComm::new();
        comm.accept = Some(3);
        let mut bus = Bus::new(comm);
        assert!(matches!(
            bus.action_all(),
            Err(Error::ShortWrite {
                written: 3,
                expected: 6
            })
        ));
    }

    #[test]
    fn scan_counts_faulty_devices() {
        let mut bus = Bus::new(
            MockComm::new()
                .silence()
                .status(2, 0b0010_0000, &[])
                .status(3, 0, &[]),
        );
        assert_eq!(bus.scan(1..=3).expect("no bus errors"), [2, 3]);
    }
}

use {
    crate::comm::Comm,
    servo_packet::packet,
    std::{collections::VecDeque, io},
};

/// Records every frame written and answers reads from a script.
#[derive(Debug, Default)]
pub struct MockComm {
    pub written: Vec<Vec<u8>>,
    pub replies: VecDeque<Vec<u8>>,
    pub reads: usize,
    pub discards: usize,
    /// Accept only this many bytes per write.
    pub accept: Option<usize>,
}

impl MockComm {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw reply.
    #[inline]
    pub fn reply(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.replies.push_back(bytes.into());
        self
    }

    /// Queue a well-formed status packet.
    #[inline]
    pub fn status(self, id: u8, error: u8, parameters: &[u8]) -> Self {
        let frame = packet::encode(id, error, parameters).expect("short enough to frame");
        self.reply(frame)
    }

    /// Queue a timeout.
    #[inline]
    pub fn silence(self) -> Self {
        self.reply(Vec::new())
    }
}

impl Comm for MockComm {
    #[inline]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.written.push(bytes.to_vec());
        Ok(self.accept.map_or(bytes.len(), |n| n.min(bytes.len())))
    }

    #[inline]
    fn read(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        self.reads += 1;
        let mut reply = self.replies.pop_front().unwrap_or_default();
        reply.truncate(max_len);
        Ok(reply)
    }

    #[inline]
    fn discard_input(&mut self) -> io::Result<()> {
        self.discards += 1;
        Ok(())
    }
}

use {
    crate::{comm::Comm, config::BusConfig},
    serialport::{ClearBuffer, SerialPort},
    std::{
        io::{self, Read as _, Write as _},
        time::Duration,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("No serial port configured")]
    NoPort,
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// A serial port carrying the bus.
pub struct SerialComm {
    port: Box<dyn SerialPort>,
}

impl SerialComm {
    #[inline]
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, OpenError> {
        log::debug!("Opening {path} at {baud_rate} baud ({timeout:?} read timeout)");
        let port = serialport::new(path, baud_rate).timeout(timeout).open()?;
        Ok(Self { port })
    }

    #[inline]
    pub fn from_config(config: &BusConfig) -> Result<Self, OpenError> {
        let Some(ref path) = config.port else {
            return Err(OpenError::NoPort);
        };
        Self::open(path, config.baud_rate, config.timeout())
    }

    #[inline(always)]
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl Comm for SerialComm {
    #[inline]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let () = self.port.write_all(bytes)?;
        let () = self.port.flush()?;
        Ok(bytes.len())
    }

    #[inline]
    fn read(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0; max_len];
        let mut filled = 0;
        'fill: while filled < max_len {
            match self.port.read(&mut buffer[filled..]) {
                Ok(0) => break 'fill,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break 'fill,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue 'fill,
                Err(e) => return Err(e),
            }
        }
        buffer.truncate(filled);
        Ok(buffer)
    }

    #[inline]
    fn discard_input(&mut self) -> io::Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(io::Error::from)
    }
}

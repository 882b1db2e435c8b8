use std::io;

/// Half-duplex byte channel to the bus.
pub trait Comm {
    /// Send `bytes`, returning how many the transport accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read up to `max_len` bytes. Fewer (possibly none) means the read timed out.
    fn read(&mut self, max_len: usize) -> io::Result<Vec<u8>>;

    /// Drop anything already received but not yet read.
    #[inline(always)]
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: Comm + ?Sized> Comm for &mut C {
    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    #[inline(always)]
    fn read(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_len)
    }

    #[inline(always)]
    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

impl<C: Comm + ?Sized> Comm for Box<C> {
    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    #[inline(always)]
    fn read(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_len)
    }

    #[inline(always)]
    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

/// Running protocol 1.0 checksum: the bitwise NOT of the byte-truncated sum of everything
/// between the header and the checksum itself.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Checksum {
    sum: u8,
}

impl Checksum {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    #[inline(always)]
    pub const fn push(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    #[inline(always)]
    pub const fn collapse(self) -> u8 {
        !self.sum
    }

    #[inline]
    pub fn over(bytes: &[u8]) -> u8 {
        let mut checksum = Self::new();
        for &byte in bytes {
            let () = checksum.push(byte);
        }
        checksum.collapse()
    }
}

#[cfg(test)]
mod test {
    use {super::*, quickcheck_macros::quickcheck};

    #[test]
    fn ping_id_1() {
        // FF FF 01 02 01 FB
        assert_eq!(Checksum::over(&[0x01, 0x02, 0x01]), 0xFB);
    }

    #[test]
    fn empty() {
        assert_eq!(Checksum::over(&[]), 0xFF);
    }

    #[quickcheck]
    fn matches_wide_sum(bytes: Vec<u8>) -> bool {
        let wide: u32 = bytes.iter().map(|&b| b as u32).sum();
        Checksum::over(&bytes) == ((!wide) & 0xFF) as u8
    }
}

use super::decode::Error;

/// A bounds-checked read position over a fixed input buffer.
///
/// Every read is checked against the remaining length before any byte is
/// touched; a failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, needed: usize) -> Result<(), Error> {
        let available = self.remaining();
        if needed > available {
            Err(Error::PrematureEnd { needed, available })
        } else {
            Ok(())
        }
    }

    pub fn peek(&self, n: usize) -> Result<&'a [u8], Error> {
        self.check(n)?;
        Ok(&self.data[self.offset..self.offset + n])
    }

    pub fn peek_u8(&self) -> Result<u8, Error> {
        self.check(1)?;
        Ok(self.data[self.offset])
    }

    pub fn advance(&mut self, n: usize) -> Result<(), Error> {
        self.check(n)?;
        self.offset += n;
        Ok(())
    }

    pub fn read(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let span = self.peek(n)?;
        self.offset += n;
        Ok(span)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let b = self.peek_u8()?;
        self.offset += 1;
        Ok(b)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }
}

use std::fs::File;
use std::io::{self, BufRead, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace};

use crate::error::{fatal, Error, Result};
use crate::handle::Handle;
use crate::{DEFAULT_BUF_SIZE, EOF, MIN_BUF_SIZE};

/// Read-ahead buffer shared by [`Reader`] and [`SeqReader`].
pub(crate) struct ReadBuf<R> {
    inner: R,
    buffer: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl<R> ReadBuf<R>
where
    R: Read,
{
    pub(crate) fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0; capacity.max(MIN_BUF_SIZE)].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes pulled from `inner` but not yet handed out.
    pub(crate) fn buffered(&self) -> usize {
        self.filled - self.pos
    }

    pub(crate) fn discard(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }

    fn read_inner(inner: &mut R, dst: &mut [u8]) -> io::Result<usize> {
        loop {
            match inner.read(dst) {
                Err(why) if why.kind() == ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }

    /// Reads until `dst` is full or the stream ends. An error is only
    /// returned if not a single byte could be read.
    pub(crate) fn read_full(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut bytes_read = 0;
        while bytes_read < dst.len() {
            match self.read(&mut dst[bytes_read..]) {
                Ok(0) => break,
                Ok(bytes) => bytes_read += bytes,
                Err(why) if why.kind() == ErrorKind::Interrupted => {}
                Err(why) if bytes_read == 0 => return Err(why.into()),
                Err(_) => break,
            }
        }
        Ok(bytes_read)
    }

    pub(crate) fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = match self.fill_buf() {
            Ok(available) => available.first().copied(),
            Err(why) => return Err(fatal("reading input")(why)),
        };
        if byte.is_some() {
            self.consume(1);
        }
        Ok(byte)
    }

    pub(crate) fn getc(&mut self) -> Result<i32> {
        Ok(self.read_byte()?.map_or(EOF, i32::from))
    }

    pub(crate) fn peek(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.capacity() {
            return Err(Error::BufferFull {
                requested: n,
                capacity: self.capacity(),
            });
        }
        while self.buffered() < n {
            if self.pos > 0 {
                self.buffer.copy_within(self.pos..self.filled, 0);
                self.filled -= self.pos;
                self.pos = 0;
            }
            let bytes = Self::read_inner(&mut self.inner, &mut self.buffer[self.filled..])?;
            if bytes == 0 {
                return Err(Error::Io(ErrorKind::UnexpectedEof.into()));
            }
            self.filled += bytes;
        }
        Ok(&self.buffer[self.pos..self.pos + n])
    }

    /// `None` signals a clean end of stream with nothing left to return.
    pub(crate) fn read_delimited(&mut self, delim: u8) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        BufRead::read_until(self, delim, &mut line).map_err(fatal("reading input"))?;
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

impl<R> Read for ReadBuf<R>
where
    R: Read,
{
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        // nothing buffered and a large request: skip the extra copy
        if self.pos == self.filled && dst.len() >= self.capacity() {
            self.discard();
            return Self::read_inner(&mut self.inner, dst);
        }
        let available = self.fill_buf()?;
        let bytes = available.len().min(dst.len());
        dst[..bytes].copy_from_slice(&available[..bytes]);
        self.consume(bytes);
        Ok(bytes)
    }
}

impl<R> BufRead for ReadBuf<R>
where
    R: Read,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.filled {
            self.filled = Self::read_inner(&mut self.inner, &mut self.buffer)?;
            self.pos = 0;
        }
        Ok(&self.buffer[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }
}

/// Buffered reader over a seekable handle whose [`offset`](Reader::offset)
/// and [`seek`](Reader::seek) account for read-ahead.
///
/// Errors marked fatal ([`Error::is_fatal`]) leave the reader in an unknown
/// position; it must not be used afterwards.
pub struct Reader<F>
where
    F: Read + Handle,
{
    buf: ReadBuf<F>,
}

impl Reader<File> {
    /// Opens the file at `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened {} for reading", path.display());
        Ok(Self::new(file))
    }
}

impl<F> Reader<F>
where
    F: Read + Handle,
{
    pub fn new(handle: F) -> Self {
        Self::with_capacity(DEFAULT_BUF_SIZE, handle)
    }

    /// Creates a new Reader with a read-ahead buffer of `capacity` bytes
    /// (at least [`MIN_BUF_SIZE`]). The handle is used from its current
    /// position on.
    pub fn with_capacity(capacity: usize, handle: F) -> Self {
        Self {
            buf: ReadBuf::with_capacity(capacity, handle),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn buffered(&self) -> usize {
        self.buf.buffered()
    }

    /// Reads at most `dst.len()` bytes; a short count is not an error.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        Ok(Read::read(&mut self.buf, dst)?)
    }

    /// Fills `dst` as far as the stream allows and returns the number of
    /// bytes read. End of stream gives a short count; an error is returned
    /// only if it prevented reading anything at all.
    pub fn read_full(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_full(dst)
    }

    /// Returns the next byte, or `None` at end of stream. Any other failure
    /// is fatal.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.buf.read_byte()
    }

    /// Like [`read_byte`](Reader::read_byte), with end of stream reported as [`EOF`].
    pub fn getc(&mut self) -> Result<i32> {
        self.buf.getc()
    }

    /// Returns the next `n` bytes without consuming them.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.buf.peek(n)
    }

    /// Returns the bytes up to and including the next `delim`, or the rest
    /// of the stream if there is no further `delim`. `None` means the stream
    /// was already exhausted.
    pub fn read_until(&mut self, delim: u8) -> Result<Option<Vec<u8>>> {
        self.buf.read_delimited(delim)
    }

    /// Moves the logical position and returns it. `SeekFrom::Current` is
    /// relative to the bytes the caller has consumed, not to the handle.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = match pos {
            SeekFrom::Current(delta) => {
                SeekFrom::Current(delta.saturating_sub(self.buf.buffered() as i64))
            }
            other => other,
        };
        let offset = self
            .buf
            .get_mut()
            .seek(target)
            .map_err(fatal("seeking in input"))?;
        self.buf.discard();
        trace!("input seek {:?} -> {}", pos, offset);
        Ok(offset)
    }

    /// Returns the logical position, i.e. the offset of the next byte to be read.
    pub fn offset(&mut self) -> Result<u64> {
        let raw = self
            .buf
            .get_mut()
            .stream_position()
            .map_err(fatal("seeking in input [0, 1]"))?;
        Ok(raw - self.buf.buffered() as u64)
    }

    pub fn close(self) -> Result<()> {
        debug!("closing input");
        Ok(self.buf.into_inner().release()?)
    }
}

impl<F> Read for Reader<F>
where
    F: Read + Handle,
{
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.buf.read(dst)
    }
}

impl<F> BufRead for Reader<F>
where
    F: Read + Handle,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.buf.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.buf.consume(amt)
    }
}

impl<F> Seek for Reader<F>
where
    F: Read + Handle,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(Reader::seek(self, pos)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.offset()?)
    }
}

/// Buffered reader over a plain stream. It offers everything [`Reader`]
/// does except seeking, since there is no position to correct.
pub struct SeqReader<R>
where
    R: Read,
{
    buf: ReadBuf<R>,
}

impl<R> SeqReader<R>
where
    R: Read,
{
    pub fn new(stream: R) -> Self {
        Self::with_capacity(DEFAULT_BUF_SIZE, stream)
    }

    pub fn with_capacity(capacity: usize, stream: R) -> Self {
        Self {
            buf: ReadBuf::with_capacity(capacity, stream),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        Ok(Read::read(&mut self.buf, dst)?)
    }

    pub fn read_full(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_full(dst)
    }

    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.buf.read_byte()
    }

    pub fn getc(&mut self) -> Result<i32> {
        self.buf.getc()
    }

    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.buf.peek(n)
    }

    pub fn read_until(&mut self, delim: u8) -> Result<Option<Vec<u8>>> {
        self.buf.read_delimited(delim)
    }

    /// Returns the wrapped stream. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.buf.into_inner()
    }
}

impl<R> Read for SeqReader<R>
where
    R: Read,
{
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.buf.read(dst)
    }
}

impl<R> BufRead for SeqReader<R>
where
    R: Read,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.buf.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.buf.consume(amt)
    }
}

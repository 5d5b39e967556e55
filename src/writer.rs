use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{fatal, Error, Result};
use crate::handle::Handle;
use crate::{DEFAULT_BUF_SIZE, MIN_BUF_SIZE};

/// Sink below the buffer that refuses to touch `inner` again once writing to
/// it has failed. Sitting under the [`BufWriter`], it also stops the flush
/// `BufWriter` attempts when dropped.
struct Guarded<W> {
    inner: W,
    failed: Option<(ErrorKind, String)>,
}

impl<W> Guarded<W> {
    fn check(&self) -> io::Result<()> {
        match &self.failed {
            Some((kind, message)) => Err(io::Error::new(
                *kind,
                format!("earlier write failed: {}", message),
            )),
            None => Ok(()),
        }
    }

    fn remember<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(why) = &result {
            if why.kind() != ErrorKind::Interrupted {
                self.failed = Some((why.kind(), why.to_string()));
            }
        }
        result
    }
}

impl<W> Write for Guarded<W>
where
    W: Write,
{
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.check()?;
        let result = self.inner.write(data);
        self.remember(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check()?;
        let result = self.inner.flush();
        self.remember(result)
    }
}

/// Write-behind buffer shared by [`Writer`] and [`SeqWriter`].
///
/// Once writing to the wrapped stream has failed, every later write or flush
/// reports that failure, and bytes still buffered are never written.
pub(crate) struct WriteBuf<W>
where
    W: Write,
{
    inner: BufWriter<Guarded<W>>,
}

impl<W> WriteBuf<W>
where
    W: Write,
{
    pub(crate) fn with_capacity(capacity: usize, inner: W) -> Self {
        let guarded = Guarded {
            inner,
            failed: None,
        };
        Self {
            inner: BufWriter::with_capacity(capacity.max(MIN_BUF_SIZE), guarded),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub(crate) fn buffered(&self) -> usize {
        self.inner.buffer().len()
    }

    pub(crate) fn get_mut(&mut self) -> &mut W {
        &mut self.inner.get_mut().inner
    }

    /// Gives up the handle without flushing; whatever is still buffered is dropped.
    pub(crate) fn into_inner_discarding(self) -> W {
        let (guarded, _unwritten) = self.inner.into_parts();
        guarded.inner
    }
}

impl<W> Write for WriteBuf<W>
where
    W: Write,
{
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        // small writes only reach the buffer, so check for an earlier failure here
        self.inner.get_ref().check()?;
        self.inner.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Buffered writer over a seekable handle. [`seek`](Writer::seek) and
/// [`offset`](Writer::offset) flush first, so buffered bytes always land where
/// they were written.
///
/// Dropping a `Writer` flushes it unless an earlier write already failed,
/// but only [`close`](Writer::close) reports whether that worked.
pub struct Writer<F>
where
    F: Write + Handle,
{
    buf: WriteBuf<F>,
}

impl Writer<File> {
    /// Creates (or truncates) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("created {} for writing", path.display());
        Ok(Self::new(file))
    }
}

impl<F> Writer<F>
where
    F: Write + Handle,
{
    pub fn new(handle: F) -> Self {
        Self::with_capacity(DEFAULT_BUF_SIZE, handle)
    }

    pub fn with_capacity(capacity: usize, handle: F) -> Self {
        Self {
            buf: WriteBuf::with_capacity(capacity, handle),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn buffered(&self) -> usize {
        self.buf.buffered()
    }

    /// Buffers all of `data`, flushing as needed to make room.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.buf.write_all(data)?;
        Ok(data.len())
    }

    pub fn write_str(&mut self, text: &str) -> Result<usize> {
        self.write(text.as_bytes())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.buf.write_all(&[byte])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.buf.flush()?)
    }

    /// Flushes, then moves the handle and returns the new absolute offset.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.buf.flush().map_err(fatal("writing output"))?;
        let offset = self
            .buf
            .get_mut()
            .seek(pos)
            .map_err(fatal("seeking in output"))?;
        trace!("output seek {:?} -> {}", pos, offset);
        Ok(offset)
    }

    /// Flushes, then returns the offset the next byte will be written at.
    pub fn offset(&mut self) -> Result<u64> {
        self.buf.flush().map_err(fatal("writing output"))?;
        self.buf
            .get_mut()
            .stream_position()
            .map_err(fatal("seeking in output [0, 1]"))
    }

    /// Flushes, commits and releases the handle. A flush or commit failure
    /// is reported in preference to a release failure.
    pub fn close(mut self) -> Result<()> {
        debug!("closing output");
        let flushed = match self.buf.flush() {
            Ok(()) => self.buf.get_mut().commit(),
            Err(why) => Err(why),
        };
        let released = self.buf.into_inner_discarding().release();
        match (flushed, released) {
            (Err(why), Err(also)) => {
                warn!("releasing output after failed flush: {}", also);
                Err(why.into())
            }
            (Err(why), Ok(())) => Err(why.into()),
            (Ok(()), released) => Ok(released?),
        }
    }
}

impl<F> Write for Writer<F>
where
    F: Write + Handle,
{
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf.flush()
    }
}

impl<F> Seek for Writer<F>
where
    F: Write + Handle,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(Writer::seek(self, pos)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.offset()?)
    }
}

/// Buffered writer over a plain stream, without seeking.
pub struct SeqWriter<W>
where
    W: Write,
{
    buf: WriteBuf<W>,
}

impl<W> SeqWriter<W>
where
    W: Write,
{
    pub fn new(stream: W) -> Self {
        Self::with_capacity(DEFAULT_BUF_SIZE, stream)
    }

    pub fn with_capacity(capacity: usize, stream: W) -> Self {
        Self {
            buf: WriteBuf::with_capacity(capacity, stream),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn buffered(&self) -> usize {
        self.buf.buffered()
    }

    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.buf.write_all(data)?;
        Ok(data.len())
    }

    pub fn write_str(&mut self, text: &str) -> Result<usize> {
        self.write(text.as_bytes())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.buf.write_all(&[byte])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.buf.flush()?)
    }

    /// Flushes and hands back the wrapped stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.buf.flush()?;
        Ok(self.buf.into_inner_discarding())
    }
}

impl<W> Write for SeqWriter<W>
where
    W: Write,
{
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf.flush()
    }
}

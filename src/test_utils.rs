use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::handle::Handle;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory handle whose operations can be made to fail on demand.
pub(crate) struct Faulty {
    data: Cursor<Vec<u8>>,
    pub(crate) fail_reads: bool,
    /// reads fail once this many bytes have been handed out
    pub(crate) fail_reads_after: Option<usize>,
    pub(crate) fail_writes: bool,
    pub(crate) fail_seeks: bool,
    pub(crate) fail_commit: bool,
    pub(crate) fail_release: bool,
    /// successful calls to `write`
    pub(crate) writes: usize,
}

impl Faulty {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cursor::new(data),
            fail_reads: false,
            fail_reads_after: None,
            fail_writes: false,
            fail_seeks: false,
            fail_commit: false,
            fail_release: false,
            writes: 0,
        }
    }

    pub(crate) fn contents(&self) -> &[u8] {
        self.data.get_ref()
    }
}

impl Read for Faulty {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_reads {
            return Err(io::Error::new(ErrorKind::Other, "injected read failure"));
        }
        if let Some(limit) = self.fail_reads_after {
            let pos = self.data.position() as usize;
            if pos >= limit {
                return Err(io::Error::new(ErrorKind::Other, "injected read failure"));
            }
            let end = buf.len().min(limit - pos);
            return self.data.read(&mut buf[..end]);
        }
        self.data.read(buf)
    }
}

impl Write for Faulty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(ErrorKind::Other, "injected write failure"));
        }
        self.writes += 1;
        self.data.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Faulty {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if self.fail_seeks {
            return Err(io::Error::new(ErrorKind::Other, "injected seek failure"));
        }
        self.data.seek(pos)
    }
}

impl Handle for Faulty {
    fn commit(&mut self) -> io::Result<()> {
        if self.fail_commit {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "injected commit failure"));
        }
        Ok(())
    }

    fn release(self) -> io::Result<()> {
        if self.fail_release {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "injected release failure"));
        }
        Ok(())
    }
}

use std::fs::File;
use std::io::{Cursor, Result, Seek};

/// A random-access storage handle that a [`Reader`](crate::Reader) or
/// [`Writer`](crate::Writer) takes ownership of.
///
/// A writer's `close` flushes its buffer, then calls `commit` and finally
/// `release`. A reader's `close` only calls `release`.
pub trait Handle: Seek {
    /// Makes written data durable, surfacing write failures the storage
    /// only reports late.
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(self) -> Result<()>
    where
        Self: Sized;
}

impl Handle for File {
    fn commit(&mut self) -> Result<()> {
        self.sync_data()
    }

    fn release(self) -> Result<()> {
        // std closes on drop and has no way to report a close error
        drop(self);
        Ok(())
    }
}

impl<T> Handle for Cursor<T>
where
    Cursor<T>: Seek,
{
    fn release(self) -> Result<()> {
        Ok(())
    }
}

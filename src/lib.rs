//! This crate provides buffered reading and writing on top of a random-access
//! handle (usually a [`File`](std::fs::File)) without giving up on seeking.
//! It is meant for producers of binary formats such as object files, which
//! write most of their output sequentially but need to go back and patch
//! headers, lengths or relocation tables afterwards.
//!
//! A plain [`BufReader`](std::io::BufReader) or [`BufWriter`](std::io::BufWriter)
//! makes it easy to get the position wrong: the handle's cursor is ahead of
//! what the caller has consumed (read-ahead), or behind what the caller has
//! written (write-behind). [`Reader`] and [`Writer`] always report and seek
//! relative to the *logical* position:
//!
//!  - [`Reader::offset`] is the handle position minus the bytes buffered but not yet consumed,
//!    and [`SeekFrom::Current`](std::io::SeekFrom::Current) is corrected the same way
//!  - [`Writer::seek`] and [`Writer::offset`] flush the buffer before they touch the handle
//!
//! [`SeqReader`] and [`SeqWriter`] offer the same buffering over streams that
//! cannot seek, like pipes. They simply have no `seek` or `offset` methods.
//!
//! Failures that leave a stream in an unknown position are reported as
//! [`Error::Fatal`]. Such a stream must not be used any further.
//!
//! # Seeking takes the read-ahead into account
//! ```rust
//! use std::io::{Cursor, SeekFrom};
//! use buf_stream_io::Reader;
//! # let mut arr: [u8; 256] = [0; 256];
//! # for (elem, val) in arr.iter_mut().zip(0..=255) { *elem = val; }
//! let cursor = Cursor::new(arr.to_vec()); // values from \x00 .. \xff
//! let mut reader = Reader::with_capacity(16, cursor);
//!
//! let mut buffer: [u8; 3] = [0; 3];
//! assert_eq!(reader.read(&mut buffer).unwrap(), 3);
//!
//! /* the handle is at 16 already, but we have only seen 3 bytes */
//! assert_eq!(reader.offset().unwrap(), 3);
//! assert_eq!(reader.seek(SeekFrom::Current(-1)).unwrap(), 2);
//! assert_eq!(reader.read_byte().unwrap(), Some(2));
//!
//! /* peeking does not move the position */
//! assert_eq!(reader.peek(2).unwrap(), &arr[3..5]);
//! assert_eq!(reader.offset().unwrap(), 3);
//! ```
//!
//! # Patching previously written output
//! ```rust
//! use std::io::{Cursor, SeekFrom};
//! use buf_stream_io::Writer;
//! let mut writer = Writer::new(Cursor::new(Vec::new()));
//!
//! writer.write(b"LEN=????;").unwrap();
//! let start = writer.offset().unwrap();
//! writer.write_str("payload").unwrap();
//! let length = writer.offset().unwrap() - start;
//!
//! writer.seek(SeekFrom::Start(4)).unwrap();
//! writer.write_str(&format!("{:04}", length)).unwrap();
//! writer.seek(SeekFrom::End(0)).unwrap();
//! writer.write_byte(b'\n').unwrap();
//! writer.close().unwrap();
//! ```
//!
//! # Reading delimited records from a stream
//! ```rust
//! use buf_stream_io::{SeqReader, EOF};
//! let mut reader = SeqReader::new(&b"ab;cd"[..]);
//!
//! assert_eq!(reader.read_until(b';').unwrap().unwrap(), b"ab;");
//! assert_eq!(reader.getc().unwrap(), b'c' as i32);
//! assert_eq!(reader.read_until(b';').unwrap().unwrap(), b"d");
//! assert_eq!(reader.read_until(b';').unwrap(), None);
//! assert_eq!(reader.getc().unwrap(), EOF);
//! ```
//!
//! # Raw whence values
//! Values other than `0`, `1` and `2` are rejected rather than guessed:
//! ```rust
//! use std::io::SeekFrom;
//! use buf_stream_io::Whence;
//! assert_eq!(Whence::try_from(1).unwrap().seek_from(-4).unwrap(), SeekFrom::Current(-4));
//! assert!(Whence::try_from(3).is_err());
//! ```
mod error;
mod handle;
mod reader;
mod whence;
mod writer;

#[cfg(test)]
mod test_utils;

pub use crate::error::{Error, Result};
pub use crate::handle::Handle;
pub use crate::reader::{Reader, SeqReader};
pub use crate::whence::Whence;
pub use crate::writer::{SeqWriter, Writer};

/// Returned by [`Reader::getc`] and [`SeqReader::getc`] at end of stream.
pub const EOF: i32 = -1;

/// Buffer size used by the `new` constructors.
pub const DEFAULT_BUF_SIZE: usize = 4096;

/// Smallest buffer a stream will use; smaller requests are rounded up.
pub const MIN_BUF_SIZE: usize = 16;

use std::io::SeekFrom;

use crate::error::{Error, Result};

/// Reference point of a seek, as the classic `0`/`1`/`2` whence values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl Whence {
    /// Combines `offset` with this reference point into a [`SeekFrom`].
    ///
    /// A negative offset is only meaningful relative to the current position
    /// or the end of the stream.
    pub fn seek_from(self, offset: i64) -> Result<SeekFrom> {
        match self {
            Self::Start if offset < 0 => Err(Error::NegativeOffset(offset)),
            Self::Start => Ok(SeekFrom::Start(offset as u64)),
            Self::Current => Ok(SeekFrom::Current(offset)),
            Self::End => Ok(SeekFrom::End(offset)),
        }
    }
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            other => Err(Error::InvalidWhence(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, SeekFrom::Start(10))]
    #[case(1, -4, SeekFrom::Current(-4))]
    #[case(2, 0, SeekFrom::End(0))]
    fn conventional_values(#[case] whence: i32, #[case] offset: i64, #[case] expected: SeekFrom) {
        let whence = Whence::try_from(whence).unwrap();
        assert_eq!(whence.seek_from(offset).unwrap(), expected);
    }

    #[rstest]
    #[case(-1)]
    #[case(3)]
    #[case(i32::MAX)]
    fn unknown_whence_is_rejected(#[case] value: i32) {
        assert!(matches!(Whence::try_from(value), Err(Error::InvalidWhence(v)) if v == value));
    }

    #[test]
    fn negative_offset_from_start_is_rejected() {
        assert!(matches!(Whence::Start.seek_from(-1), Err(Error::NegativeOffset(-1))));
    }
}

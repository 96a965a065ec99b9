use crate::error::OrtResult;
use std::io::{prelude::*, BufReader};

pub trait Serialize {
    fn serialize(&self, writer: &mut dyn Write) -> OrtResult<()>;
}

pub trait BufReadSeek: BufRead + Seek {}

impl<R: BufRead + Seek> BufReadSeek for R {
}

// explicit `Self: Sized` bounds on individual methods (rather than on the
// trait) keep `Deserialize` object-safe for the methods that are - tree
// object parsing needs to go through `&dyn ObjectStore`.
pub trait Deserialize {
    fn deserialize(reader: &mut impl BufRead) -> OrtResult<Self>
    where
        Self: Sized;

    fn deserialize_unbuffered(reader: impl Read) -> OrtResult<Self>
    where
        Self: Sized,
    {
        Self::deserialize(&mut BufReader::new(reader))
    }

    fn deserialize_from_slice(slice: &[u8]) -> OrtResult<Self>
    where
        Self: Sized,
    {
        Self::deserialize(&mut BufReader::new(slice))
    }
}

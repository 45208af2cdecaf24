//! Record serialization for export and import
//!
//! A [`RecordCodec`] turns a record list into bytes and back. Decoding is
//! best effort: unreadable entries are logged, skipped and listed in the
//! returned [`Decoded`] so callers can refuse to overwrite a source they
//! only partly understood. Validation is not the codec's job; the store's
//! `restore` does that.

mod json_lines;

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::record::Record;

pub use json_lines::JsonLinesCodec;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub fn code(&self) -> &'static str {
        "CABINET_CODEC_ERROR"
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Outcome of decoding a record stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub records: Vec<Record>,
    /// 1-based positions of entries that could not be read
    pub unreadable: Vec<usize>,
}

impl Decoded {
    pub fn is_complete(&self) -> bool {
        self.unreadable.is_empty()
    }
}

/// External record serialization format.
pub trait RecordCodec {
    fn encode(&self, records: &[Record], out: &mut dyn Write) -> CodecResult<()>;

    /// Reads every record it can. Entries that fail to parse are skipped
    /// and reported in [`Decoded::unreadable`].
    fn decode(&self, input: &mut dyn Read) -> CodecResult<Decoded>;
}

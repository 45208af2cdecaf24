//! One JSON object per line

use std::io::{BufRead, BufReader, Read, Write};

use tracing::warn;

use super::{CodecResult, Decoded, RecordCodec};
use crate::observability::CODEC_TARGET;
use crate::record::Record;

/// Writes each record as a single-line JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesCodec;

impl RecordCodec for JsonLinesCodec {
    fn encode(&self, records: &[Record], out: &mut dyn Write) -> CodecResult<()> {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn decode(&self, input: &mut dyn Read) -> CodecResult<Decoded> {
        let mut decoded = Decoded::default();
        for (index, line) in BufReader::new(input).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(record) => decoded.records.push(record),
                Err(e) => {
                    warn!(
                        target: CODEC_TARGET,
                        line = index + 1,
                        error = %e,
                        "Skipping unreadable record"
                    );
                    decoded.unreadable.push(index + 1);
                }
            }
        }
        Ok(decoded)
    }
}

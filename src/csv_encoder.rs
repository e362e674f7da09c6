use std::io::Write;

use crate::Result;
use crate::stamp::Stamp;
use crate::stamp_encoder::StampEncoder;
use crate::timeline::Voice;

const HEADER: &str = "Voice,Start Time,End Time,Text";

/// A `StampEncoder` that writes one CSV row per stamp.
///
/// Fields are joined with commas verbatim. Commas, quotes or newlines inside voice names or
/// stamp text are not escaped and will break the row structure. An open stamp leaves the
/// `End Time` column empty.
pub struct CsvEncoder<W: Write> {
    w: W,

    /// Whether the header row has been written.
    started: bool,

    closed: bool,
}

impl<W: Write> CsvEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    /// Write the header row if we haven't written it yet.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            writeln!(&mut self.w, "{HEADER}")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> StampEncoder for CsvEncoder<W> {
    fn begin_voice(&mut self, _voice: &Voice) -> Result<()> {
        Ok(())
    }

    fn write_stamp(&mut self, voice: &Voice, stamp: &Stamp) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write stamp: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        let end = stamp.end_time.map(|t| t.to_string()).unwrap_or_default();
        writeln!(
            &mut self.w,
            "{},{},{},{}",
            voice.name, stamp.start_time, end, stamp.text
        )?;
        Ok(())
    }

    /// Flush the underlying writer. A file with no stamps still gets its header.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

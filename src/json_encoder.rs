use std::io::Write;

use crate::Result;
use crate::export::{ExportDocument, ExportVoice};
use crate::stamp::Stamp;
use crate::stamp_encoder::StampEncoder;
use crate::timeline::Voice;

/// A `StampEncoder` that writes the whole timeline as one pretty-printed JSON document.
///
/// Pretty-printing needs the full structure, so stamps are collected in memory and the document
/// is written on `close`.
///
/// Example output:
/// ```json
/// {
///   "name": "song.mp3",
///   "voices": [
///     { "name": "Voice 1", "stamps": [{ "startTime": 1.0, "endTime": 2.5, "text": "hello" }] }
///   ]
/// }
/// ```
pub struct JsonEncoder<W: Write> {
    w: W,
    document: ExportDocument,
    closed: bool,
}

impl<W: Write> JsonEncoder<W> {
    pub fn new(w: W, media_name: impl Into<String>) -> Self {
        Self {
            w,
            document: ExportDocument {
                name: media_name.into(),
                voices: Vec::new(),
            },
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write stamp: encoder is already closed",
            ));
        }
        Ok(())
    }
}

impl<W: Write> StampEncoder for JsonEncoder<W> {
    fn begin_voice(&mut self, voice: &Voice) -> Result<()> {
        self.ensure_open()?;
        self.document.voices.push(ExportVoice {
            name: voice.name.clone(),
            stamps: Vec::new(),
        });
        Ok(())
    }

    fn write_stamp(&mut self, voice: &Voice, stamp: &Stamp) -> Result<()> {
        self.ensure_open()?;

        // Stamps written without announcing their voice still land under the right name.
        let needs_voice = self
            .document
            .voices
            .last()
            .is_none_or(|v| v.name != voice.name);
        if needs_voice {
            self.begin_voice(voice)?;
        }

        if let Some(current) = self.document.voices.last_mut() {
            current.stamps.push(stamp.clone());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        serde_json::to_writer_pretty(&mut self.w, &self.document)?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_voices_emits_empty_document() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonEncoder::new(&mut out, "song.mp3");
        enc.close()?;

        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(parsed, serde_json::json!({ "name": "song.mp3", "voices": [] }));
        Ok(())
    }

    #[test]
    fn writes_voices_and_stamps_pretty() -> anyhow::Result<()> {
        let lead = Voice::new("Lead");
        let backing = Voice::new("Backing");

        let mut out = Vec::new();
        let mut enc = JsonEncoder::new(&mut out, "song.mp3");
        enc.begin_voice(&lead)?;
        enc.write_stamp(&lead, &Stamp::closed(1.0, 2.5, "hello"))?;
        enc.write_stamp(&lead, &Stamp::open(3.0))?;
        enc.begin_voice(&backing)?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("\n  \"voices\": ["));

        let parsed: serde_json::Value = serde_json::from_str(s)?;
        assert_eq!(parsed["voices"][0]["name"], "Lead");
        assert_eq!(parsed["voices"][0]["stamps"][0]["endTime"], 2.5);
        assert!(parsed["voices"][0]["stamps"][1].get("endTime").is_none());
        assert_eq!(parsed["voices"][1]["stamps"], serde_json::json!([]));
        Ok(())
    }

    #[test]
    fn close_is_idempotent() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonEncoder::new(&mut out, "a");
        enc.close()?;
        enc.close()?;
        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(parsed["name"], "a");
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let voice = Voice::new("Lead");
        let mut out = Vec::new();
        let mut enc = JsonEncoder::new(&mut out, "a");
        enc.close()?;
        let err = enc.write_stamp(&voice, &Stamp::open(1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}

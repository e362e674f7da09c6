//! Exporting a timeline to a downloadable file.

use std::io::{BufWriter, Write};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};
use crate::csv_encoder::CsvEncoder;
use crate::json_encoder::JsonEncoder;
use crate::output_type::OutputType;
use crate::stamp::Stamp;
use crate::stamp_encoder::StampEncoder;
use crate::timeline::{Timeline, Voice};

/// Shape of a JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub name: String,
    pub voices: Vec<ExportVoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportVoice {
    pub name: String,
    pub stamps: Vec<Stamp>,
}

impl TryFrom<ExportDocument> for Timeline {
    type Error = Error;

    fn try_from(document: ExportDocument) -> Result<Self> {
        let voices = document
            .voices
            .into_iter()
            .map(|v| Voice {
                name: v.name,
                stamps: v.stamps,
            })
            .collect();
        Timeline::with_voices(document.name, voices)
    }
}

/// Name of the exported file for `media_name`.
pub fn file_name(media_name: &str, output_type: OutputType) -> String {
    format!("{media_name}.{}", output_type.extension())
}

/// Feed every voice and stamp of `timeline` to `encoder`, voice by voice.
///
/// The encoder is not closed; the caller owns its lifecycle.
pub fn write_timeline<E: StampEncoder + ?Sized>(timeline: &Timeline, encoder: &mut E) -> Result<()> {
    for voice in timeline.voices() {
        encoder.begin_voice(voice)?;
        for stamp in &voice.stamps {
            encoder.write_stamp(voice, stamp)?;
        }
    }
    Ok(())
}

/// Export `timeline` in the requested format to `w`.
pub fn export<W: Write>(timeline: &Timeline, output_type: OutputType, w: W) -> Result<()> {
    // Buffer output; stdout is unbuffered otherwise.
    let writer = BufWriter::new(w);

    info!(
        media = %timeline.media_name,
        stamps = timeline.stamp_count(),
        ?output_type,
        "exporting timeline"
    );

    match output_type {
        OutputType::Json => {
            let mut encoder = JsonEncoder::new(writer, timeline.media_name.clone());
            let run_res = write_timeline(timeline, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Csv => {
            let mut encoder = CsvEncoder::new(writer);
            let run_res = write_timeline(timeline, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

/// Read a JSON export back into a timeline.
pub fn import_json(value: &str) -> Result<Timeline> {
    let document: ExportDocument = serde_json::from_str(value)?;
    Timeline::try_from(document)
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), _) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> anyhow::Result<Timeline> {
        let mut timeline = Timeline::new("song.mp3");
        timeline.replace_stamps(
            0,
            vec![Stamp::closed(1.0, 2.5, "hello"), Stamp::open(3.25)],
        );
        let alto = timeline.add_voice("Alto")?;
        timeline.replace_stamps(alto, vec![Stamp::closed(0.5, 1.0, "ah")]);
        Ok(timeline)
    }

    #[test]
    fn file_names_follow_output_type() {
        assert_eq!(file_name("song.mp3", OutputType::Json), "song.mp3.stamps");
        assert_eq!(file_name("song.mp3", OutputType::Csv), "song.mp3.csv");
    }

    #[test]
    fn json_export_round_trips() -> anyhow::Result<()> {
        let timeline = sample()?;
        let mut out = Vec::new();
        export(&timeline, OutputType::Json, &mut out)?;

        let back = import_json(std::str::from_utf8(&out)?)?;
        assert_eq!(back.media_name, "song.mp3");
        assert_eq!(back.voices().len(), 2);
        for (a, b) in timeline.voices().iter().zip(back.voices()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.stamps.len(), b.stamps.len());
            assert!(a.stamps.iter().zip(&b.stamps).all(|(x, y)| x.same_content(y)));
        }
        Ok(())
    }

    #[test]
    fn import_rejects_duplicate_voice_names() {
        let value = r#"{"name":"song.mp3","voices":[
            {"name":"A","stamps":[]},
            {"name":"A","stamps":[]}
        ]}"#;
        let err = import_json(value).unwrap_err();
        assert!(matches!(err, Error::DuplicateVoice(name) if name == "A"));
    }

    #[test]
    fn csv_export_lists_voices_then_stamps() -> anyhow::Result<()> {
        let timeline = sample()?;
        let mut out = Vec::new();
        export(&timeline, OutputType::Csv, &mut out)?;

        let csv = String::from_utf8(out)?;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Voice,Start Time,End Time,Text",
                "Voice 1,1,2.5,hello",
                "Voice 1,3.25,,",
                "Alto,0.5,1,ah",
            ]
        );
        Ok(())
    }
}

//! Per-media persistence of voices.
//!
//! Sessions are stored as JSON under `timestamper-<file name>` in a host-provided key-value
//! store, and are picked up again when a file with the same name is opened.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::stamp::Stamp;
use crate::timeline::{DEFAULT_VOICE_NAME, Voice};

const KEY_PREFIX: &str = "timestamper-";

/// Storage key for a media file's session.
pub fn storage_key(media_name: &str) -> String {
    format!("{KEY_PREFIX}{media_name}")
}

/// A string key-value store that outlives the editor session.
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Persisted value layouts.
///
/// Single-voice sessions were stored as a bare stamp array; those load into one default voice.
#[derive(Deserialize)]
#[serde(untagged)]
enum Persisted {
    Voices(Vec<Voice>),
    Stamps(Vec<Stamp>),
}

pub fn encode_voices(voices: &[Voice]) -> Result<String> {
    Ok(serde_json::to_string(voices)?)
}

pub fn decode_voices(value: &str) -> Result<Vec<Voice>> {
    let voices = match serde_json::from_str(value)? {
        Persisted::Voices(voices) => voices,
        Persisted::Stamps(stamps) => vec![Voice {
            name: DEFAULT_VOICE_NAME.to_owned(),
            stamps,
        }],
    };
    Ok(voices)
}

/// Load the voices stored for `media_name`, if any.
pub fn load_voices<S: SessionStore + ?Sized>(
    store: &S,
    media_name: &str,
) -> Result<Option<Vec<Voice>>> {
    store
        .load(&storage_key(media_name))?
        .map(|value| decode_voices(&value))
        .transpose()
}

pub fn save_voices<S: SessionStore + ?Sized>(
    store: &mut S,
    media_name: &str,
    voices: &[Voice],
) -> Result<()> {
    let value = encode_voices(voices)?;
    store.save(&storage_key(media_name), &value)
}

/// In-memory store, mostly for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per entry.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl SessionStore for DirStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_voices() -> Vec<Voice> {
        vec![
            Voice {
                name: "Lead".to_owned(),
                stamps: vec![Stamp::closed(1.0, 2.5, "hello"), Stamp::open(3.25)],
            },
            Voice::new("Backing"),
        ]
    }

    fn assert_same(a: &[Voice], b: &[Voice]) {
        assert_eq!(a.len(), b.len());
        for (va, vb) in a.iter().zip(b) {
            assert_eq!(va.name, vb.name);
            assert_eq!(va.stamps.len(), vb.stamps.len());
            for (sa, sb) in va.stamps.iter().zip(&vb.stamps) {
                assert!(sa.same_content(sb), "{sa:?} != {sb:?}");
            }
        }
    }

    #[test]
    fn key_is_prefixed_file_name() {
        assert_eq!(storage_key("song.mp3"), "timestamper-song.mp3");
    }

    #[test]
    fn voices_round_trip_through_memory_store() -> anyhow::Result<()> {
        let mut store = MemoryStore::new();
        let voices = sample_voices();
        save_voices(&mut store, "song.mp3", &voices)?;

        assert!(store.get("timestamper-song.mp3").is_some());
        let loaded = load_voices(&store, "song.mp3")?.expect("voices should be stored");
        assert_same(&voices, &loaded);
        Ok(())
    }

    #[test]
    fn missing_entry_loads_as_none() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        assert!(load_voices(&store, "nope.mp3")?.is_none());
        Ok(())
    }

    #[test]
    fn bare_stamp_array_loads_as_single_voice() -> anyhow::Result<()> {
        let voices =
            decode_voices(r#"[{ "startTime": 1, "endTime": 2, "text": "a" }, { "startTime": 4, "text": "" }]"#)?;
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].name, DEFAULT_VOICE_NAME);
        assert_eq!(voices[0].stamps.len(), 2);
        assert!(voices[0].stamps[1].is_open());
        Ok(())
    }

    #[test]
    fn empty_array_loads_as_no_voices() -> anyhow::Result<()> {
        assert!(decode_voices("[]")?.is_empty());
        Ok(())
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_voices("{ not json").is_err());
    }

    #[test]
    fn dir_store_round_trips_and_reports_missing() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let mut store = DirStore::new(tmp.path().join("sessions"));
        assert!(store.load("timestamper-a.mp3")?.is_none());

        let voices = sample_voices();
        save_voices(&mut store, "a.mp3", &voices)?;
        assert!(tmp.path().join("sessions/timestamper-a.mp3.json").is_file());

        let loaded = load_voices(&store, "a.mp3")?.expect("voices should be stored");
        assert_same(&voices, &loaded);
        Ok(())
    }
}

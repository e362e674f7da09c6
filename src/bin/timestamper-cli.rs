use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use timestamper::export::{export, file_name};
use timestamper::output_type::OutputType;
use timestamper::persist::{DirStore, load_voices};
use timestamper::timeline::Timeline;
use tracing::info;

fn main() -> Result<()> {
    timestamper::init_logging();
    let params = Params::parse();

    let store = DirStore::new(params.store_dir.clone());
    let voices = load_voices(&store, &params.media_name)?.with_context(|| {
        format!(
            "no stamps stored for '{}' in {}",
            params.media_name,
            params.store_dir.display()
        )
    })?;
    let timeline = Timeline::with_voices(params.media_name.clone(), voices)?;

    match output_target(&params) {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export(&timeline, params.output_type, file)?;
            info!(path = %path.display(), "export written");
        }
        None => {
            let stdout = io::stdout();
            export(&timeline, params.output_type, stdout.lock())?;
            io::stdout().flush()?;
        }
    }

    Ok(())
}

/// Where the export goes: an explicit path, a derived name in `--out-dir`, or stdout.
fn output_target(params: &Params) -> Option<PathBuf> {
    if let Some(path) = &params.output_path {
        return Some(path.clone());
    }
    params
        .out_dir
        .as_ref()
        .map(|dir| dir.join(file_name(&params.media_name, params.output_type)))
}

#[derive(Parser, Debug)]
#[command(name = "timestamper")]
#[command(about = "Export stamps collected for a media file")]
struct Params {
    /// Directory holding persisted sessions.
    #[arg(short = 's', long = "store-dir")]
    pub store_dir: PathBuf,

    /// File name of the media the stamps were collected for (e.g. `song.mp3`).
    #[arg(short = 'm', long = "media")]
    pub media_name: String,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Json
    )]
    pub output_type: OutputType,

    /// Write to this file instead of stdout.
    #[arg(short = 'f', long = "output-file", conflicts_with = "out_dir")]
    pub output_path: Option<PathBuf>,

    /// Write to `<media>.stamps` / `<media>.csv` inside this directory.
    #[arg(short = 'd', long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

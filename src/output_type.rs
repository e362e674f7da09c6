/// The supported export formats.
///
/// Each variant maps to a concrete `StampEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// `{ name, voices: [{ name, stamps }] }`, pretty-printed.
    Json,

    /// One row per stamp: `Voice,Start Time,End Time,Text`.
    Csv,
}

impl OutputType {
    /// File name extension used when exporting, without the dot.
    ///
    /// JSON exports use `.stamps` so they are recognizable as timestamper sessions.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "stamps",
            Self::Csv => "csv",
        }
    }
}

use crate::Result;
use crate::stamp::Stamp;
use crate::timeline::Voice;

/// Serializes a timeline one stamp at a time.
///
/// Callers announce each voice with `begin_voice` before writing its stamps, and call `close`
/// exactly when done; `close` is idempotent.
pub trait StampEncoder {
    fn begin_voice(&mut self, voice: &Voice) -> Result<()>;
    fn write_stamp(&mut self, voice: &Voice, stamp: &Stamp) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

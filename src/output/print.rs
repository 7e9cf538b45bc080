use crate::error::Result;
use std::path::Path;
use std::process::{Command, Stdio};

/// Hand a saved photo to the system print spooler.
///
/// Fire-and-forget: the job is submitted and never waited on or retried.
/// The dialog/driver side is the spooler's problem.
pub fn spool_to_printer(path: &Path) -> Result<()> {
    tracing::info!("Spooling {} to printer", path.display());
    Command::new("lp")
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

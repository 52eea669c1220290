//! Run an external tool and capture its output, killing it if it takes too long.

use std::{
    ffi::OsString,
    path::Path,
    process::Output,
    thread,
    time::{Duration, Instant},
};

use log::debug;

use crate::error::{Error, ProcessFailure, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns `program` with `args` and waits at most `timeout` for it to exit.
///
/// A non-zero exit status is *not* an error here: callers decide what each
/// status means for their tool.
pub fn run_captured(
    program: &str,
    args: &[OsString],
    dir: Option<&Path>,
    timeout: Duration,
) -> Result<Output> {
    let command = describe(program, args);
    debug!("Running `{}`", command);

    let mut expression = duct::cmd(program, args)
        .stdout_capture()
        .stderr_capture()
        .unchecked();
    if let Some(dir) = dir {
        expression = expression.dir(dir);
    }

    let handle = expression
        .start()
        .map_err(|e| Error::process(&command, ProcessFailure::Spawn(e)))?;

    // too far out to represent means no deadline at all
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match handle.try_wait() {
            Ok(Some(output)) => return Ok(output.clone()),
            Ok(None) => {}
            Err(e) => return Err(Error::process(&command, ProcessFailure::Spawn(e))),
        }

        if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            debug!("Killing `{}` after {:?}", command, timeout);
            // the timeout is what gets reported; a failed kill adds nothing to it
            let _ = handle.kill();
            return Err(Error::process(&command, ProcessFailure::Timeout(timeout)));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn describe(program: &str, args: &[OsString]) -> String {
    let mut command = program.to_owned();
    for arg in args {
        command.push(' ');
        command.push_str(&arg.to_string_lossy());
    }
    command
}

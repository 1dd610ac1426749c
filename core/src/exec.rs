use std::io;
use std::process::ExitStatus;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tokio::process::Command;

use crate::error::FilterErr;
use crate::error::Result;

/// Runs `command` through `shell` with `input` on its standard input.
///
/// `shell` is the interpreter invocation, e.g. `["/bin/sh", "-c"]`; the
/// command string is appended as its final argument and is interpreted by
/// that shell exactly as typed. The selection itself never passes through the
/// shell's parser.
///
/// Resolves to the trimmed standard output when the process exits with 0.
/// Any other exit, a kill by signal, or a failure to spawn the shell becomes
/// [`FilterErr::CommandFailed`] carrying the trimmed standard error. There is
/// no timeout; Ctrl-C kills the child and yields [`FilterErr::Interrupted`].
pub async fn run_filter_command(shell: &[String], command: &str, input: &str) -> Result<String> {
    let (program, args) = shell.split_first().ok_or_else(|| {
        FilterErr::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "shell invocation is empty",
        ))
    })?;

    tracing::debug!("running filter {command:?} via {program}");

    let child = Command::new(program)
        .args(args)
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();
    let child = match child {
        Ok(child) => child,
        Err(e) => {
            tracing::error!("failed to spawn {program}: {e}");
            return Err(FilterErr::CommandFailed {
                exit_code: None,
                stderr: e.to_string(),
            });
        }
    };

    let output = consume_output(child, stdin_payload(input)).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.exit_status.success() {
        Ok(stdout.trim().to_string())
    } else {
        let exit_code = output.exit_status.code();
        tracing::debug!("filter {command:?} exited with {:?}", output.exit_status);
        Err(FilterErr::CommandFailed {
            exit_code,
            stderr: stderr.trim().to_string(),
        })
    }
}

/// The selection is fed as a line of text, the way `echo` would produce it:
/// a trailing newline is added unless one is already present.
fn stdin_payload(input: &str) -> Vec<u8> {
    let mut payload = input.as_bytes().to_vec();
    if !input.ends_with('\n') {
        payload.push(b'\n');
    }
    payload
}

#[derive(Debug)]
struct RawFilterOutput {
    exit_status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Feeds `payload` to the child while draining both output pipes, so neither
/// side can block on a full pipe buffer.
async fn consume_output(mut child: Child, payload: Vec<u8>) -> Result<RawFilterOutput> {
    // All three streams were configured with `Stdio::piped()` above, therefore
    // `take()` should normally return `Some`.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("stdin pipe was unexpectedly not available"))?;
    let stdout_reader = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout pipe was unexpectedly not available"))?;
    let stderr_reader = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr pipe was unexpectedly not available"))?;

    let stdin_handle = tokio::spawn(async move {
        let result = stdin.write_all(&payload).await;
        // Dropping `stdin` closes the pipe so the filter sees EOF.
        drop(stdin);
        match result {
            // Filters such as `echo hi` never read their input.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    });
    let stdout_handle = tokio::spawn(read_all(stdout_reader));
    let stderr_handle = tokio::spawn(read_all(stderr_reader));

    let exit_status = tokio::select! {
        status = child.wait() => status?,
        _ = tokio::signal::ctrl_c() => {
            child.start_kill()?;
            return Err(FilterErr::Interrupted);
        }
    };

    if let Err(e) = stdin_handle.await.map_err(io::Error::other)? {
        tracing::warn!("failed to write selection to filter: {e}");
    }
    let stdout = stdout_handle.await.map_err(io::Error::other)??;
    let stderr = stderr_handle.await.map_err(io::Error::other)??;

    Ok(RawFilterOutput {
        exit_status,
        stdout,
        stderr,
    })
}

async fn read_all<R: AsyncRead + Unpin + Send + 'static>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

//! # Model Process
//!
//! Blocking calls to the local language model executable.
//!
//! One call = one child process: the prompt goes to stdin, the whole stdout
//! is collected, stderr is kept for diagnostics. The caller's thread blocks
//! until the child exits or the timeout expires; on expiry the child is
//! killed. There are no retries and no streaming.
//!
//! Pipes are serviced on helper threads so a child that writes a lot (or
//! never reads its stdin) cannot stall the deadline check. The deadline
//! covers the whole call, including draining output that a lingering
//! descendant of the model still holds open.

use crate::config::ModelConfig;
use cropwise_core::CropwiseError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// How often the child is polled while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Number of prompt characters echoed to the log.
const PROMPT_PREVIEW_CHARS: usize = 200;

/// Client for the external model executable.
#[derive(Debug, Clone)]
pub struct ModelClient {
    executable: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ModelClient {
    /// Create a client for `executable args...` with a wall-clock limit.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            args,
            timeout,
        }
    }

    /// Create a client from configuration.
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.executable.clone(), config.args.clone(), config.timeout())
    }

    /// Path of the executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Wall-clock limit per call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `prompt` to the model and return its trimmed reply.
    ///
    /// # Errors
    /// - `ExecutableNotFound` if the executable does not exist
    /// - `ModelFailed` on a non-zero exit (carries the child's stderr)
    /// - `ModelTimeout` if the deadline passes (the child is killed)
    /// - `EmptyModelOutput` if the child succeeds without output
    /// - `Unexpected` for any other failure
    pub fn query(&self, prompt: &str) -> Result<String, CropwiseError> {
        let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        tracing::info!(
            executable = %self.executable.display(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Querying model with prompt: {}...",
            preview
        );

        let deadline = Instant::now() + self.timeout;
        let mut child = self.spawn()?;

        let writer = child.stdin.take().map(|mut stdin| {
            let payload = prompt.as_bytes().to_vec();
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let written = stdin.write_all(&payload);
                drop(stdin);
                let _ = tx.send(written);
            });
            rx
        });
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = self.wait(&mut child, deadline)?;

        // A descendant of the model can keep the pipes open after the child
        // exits, so reading is bounded by the same deadline.
        let stdout = self.collect(stdout, deadline)?;
        let stderr = self.collect(stderr, deadline)?;

        if let Some(writer) = writer {
            match writer.try_recv() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Model exited before reading the whole prompt");
                }
                Ok(Err(e)) => {
                    tracing::warn!("Failed to write prompt to model: {}", e);
                }
                Err(TryRecvError::Empty) => {
                    tracing::debug!("Prompt still being written after model exit");
                }
                Err(TryRecvError::Disconnected) => {
                    return Err(CropwiseError::Unexpected(
                        "prompt writer thread panicked".to_string(),
                    ));
                }
            }
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            tracing::error!(
                code = ?status.code(),
                "Model process failed: {}",
                stderr
            );
            return Err(CropwiseError::ModelFailed {
                code: status.code(),
                stderr,
            });
        }

        let reply = String::from_utf8_lossy(&stdout).trim().to_string();
        if reply.is_empty() {
            tracing::warn!("Model returned an empty response");
            return Err(CropwiseError::EmptyModelOutput);
        }

        tracing::info!(chars = reply.chars().count(), "Model response received");
        Ok(reply)
    }

    fn spawn(&self) -> Result<Child, CropwiseError> {
        Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    tracing::error!(
                        "Model executable not found at {}",
                        self.executable.display()
                    );
                    CropwiseError::ExecutableNotFound(self.executable.display().to_string())
                } else {
                    tracing::error!(
                        "Failed to start model '{}': {}",
                        self.executable.display(),
                        e
                    );
                    CropwiseError::Unexpected(format!(
                        "failed to start '{}': {}",
                        self.executable.display(),
                        e
                    ))
                }
            })
    }

    /// Poll the child until it exits or the deadline passes.
    fn wait(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, CropwiseError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    terminate(child);
                    tracing::error!("Failed to poll model process: {}", e);
                    return Err(CropwiseError::Unexpected(format!(
                        "failed to poll model process: {}",
                        e
                    )));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                terminate(child);
                return Err(self.timed_out());
            }

            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Take a pipe's contents, giving up at the deadline.
    fn collect(
        &self,
        output: Option<Receiver<Vec<u8>>>,
        deadline: Instant,
    ) -> Result<Vec<u8>, CropwiseError> {
        let Some(rx) = output else {
            return Ok(Vec::new());
        };
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(buf) => Ok(buf),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Model output pipe still open after the process exited");
                Err(self.timed_out())
            }
            Err(RecvTimeoutError::Disconnected) => Err(CropwiseError::Unexpected(
                "output reader thread panicked".to_string(),
            )),
        }
    }

    fn timed_out(&self) -> CropwiseError {
        tracing::error!(
            "Model query timed out after {} ms",
            self.timeout.as_millis()
        );
        CropwiseError::ModelTimeout(self.timeout.as_millis() as u64)
    }
}

/// Kill and reap the child. Pipe reader threads are left to finish on their
/// own once every holder of the pipe has exited.
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("Kill failed (process may have exited): {}", e);
    }
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::debug!("Error reading model output: {}", e);
        }
        let _ = tx.send(buf);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_copies_settings() {
        let config = ModelConfig::default();
        let client = ModelClient::from_config(&config);
        assert_eq!(client.executable(), Path::new("/usr/local/bin/ollama"));
        assert_eq!(client.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn missing_executable_is_typed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ModelClient::new(
            dir.path().join("no-such-model"),
            vec!["run".to_string()],
            Duration::from_secs(1),
        );
        assert!(matches!(
            client.query("hello"),
            Err(CropwiseError::ExecutableNotFound(_))
        ));
    }
}

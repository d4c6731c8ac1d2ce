//! The transcode orchestrator.
//!
//! Turns a resolved specification into exactly one encoder invocation per
//! canonical filename, no matter how many requests ask for it at once, and
//! reuses artifacts already on disk.
//!
//! Coalescing: the first caller for a key becomes the leader, spawns the
//! encode as a detached task, and awaits it; later callers find the
//! in-flight entry and park on its [`Notify`]. The detached task, not the
//! leader, removes the entry and wakes the waiters, so a leader whose
//! HTTP request is dropped mid-encode neither kills the encode nor strands
//! the waiters. Woken waiters re-check the artifact; if the leader failed
//! they loop and try to become the leader themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use loopcast_spec::{catalog, FilenameCodec, VideoSpec};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::discovery::Library;

/// Errors surfaced by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The request token could not be parsed.
    #[error(transparent)]
    Spec(#[from] loopcast_spec::ParseError),

    /// The named source clip does not exist.
    #[error("source clip not found: {0}")]
    SourceNotFound(String),

    /// The encoder exited unsuccessfully; diagnostic output is wrapped.
    #[error("encode failed: {0}")]
    Encode(#[from] loopcast_av::Error),

    /// The caller stopped waiting. The coalesced background encode, if
    /// any, keeps running.
    #[error("transcode cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Orchestrates encodes against the artifact cache.
pub struct Transcoder {
    library: Arc<Library>,
    min_artifact_bytes: u64,
    in_flight: Arc<DashMap<String, Arc<Notify>>>,
}

impl Transcoder {
    pub fn new(library: Arc<Library>, min_artifact_bytes: u64) -> Self {
        Self {
            library,
            min_artifact_bytes,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// A filename codec aware of the clips currently on disk.
    pub fn filename_codec(&self) -> FilenameCodec {
        FilenameCodec::new(self.library.clip_names())
    }

    /// Resolve a parsed spec against the baseline defaults.
    pub fn resolve(&self, spec: &VideoSpec) -> VideoSpec {
        spec.resolve(&catalog::default_spec())
    }

    /// Produce (or reuse) the artifact for a resolved spec.
    ///
    /// Returns the full output path once the artifact is ready. `input` is
    /// the source clip; the canonical filename is appended to `output_dir`.
    pub async fn transcode(
        &self,
        spec: &VideoSpec,
        input: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let resolved = self.resolve(spec);
        let filename = self.filename_codec().render(&resolved);
        let output = output_dir.join(&filename);

        loop {
            // Cache short-circuit, with self-heal for crashed partials.
            if self.check_cached(&output).await? {
                return Ok(output);
            }

            match self.in_flight.entry(filename.clone()) {
                Entry::Occupied(e) => {
                    // Another request is already encoding this key.
                    let notify = e.get().clone();
                    drop(e);
                    debug!(%filename, "coalescing onto in-flight encode");

                    let mut notified = std::pin::pin!(notify.notified());
                    // Register before re-checking the map; a notify_waiters
                    // between lookup and await would otherwise be missed.
                    notified.as_mut().enable();
                    if self.in_flight.contains_key(&filename) {
                        notified.await;
                    }
                    // Re-check the artifact; if the leader failed, loop to
                    // try becoming the leader ourselves.
                }
                Entry::Vacant(e) => {
                    let notify = Arc::new(Notify::new());
                    e.insert(notify.clone());

                    return self.lead_encode(&resolved, input, output, filename, notify).await;
                }
            }
        }
    }

    /// Run the encode as the leader for this key.
    async fn lead_encode(
        &self,
        resolved: &VideoSpec,
        input: &Path,
        output: PathBuf,
        filename: String,
        notify: Arc<Notify>,
    ) -> Result<PathBuf, TranscodeError> {
        let args = match loopcast_av::transcode_args(resolved, input, &output) {
            Ok(args) => args,
            Err(err) => {
                // Nothing was spawned; unregister before bailing.
                self.in_flight.remove(&filename);
                notify.notify_waiters();
                return Err(err.into());
            }
        };

        info!(%filename, "starting encode");

        let in_flight = Arc::clone(&self.in_flight);
        let task_output = output.clone();
        let task = tokio::spawn(async move {
            let result = run_encode(&args, &task_output).await;
            in_flight.remove(&filename);
            notify.notify_waiters();
            result
        });

        match task.await {
            Ok(Ok(())) => {
                info!(path = %output.display(), "encode completed");
                Ok(output)
            }
            Ok(Err(err)) => Err(err),
            Err(join_err) if join_err.is_cancelled() => Err(TranscodeError::Cancelled),
            Err(join_err) => Err(TranscodeError::Io(std::io::Error::other(join_err))),
        }
    }

    /// True when a sane artifact already exists at `path`. Undersized
    /// files are deleted so the caller re-encodes.
    async fn check_cached(&self, path: &Path) -> Result<bool, TranscodeError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() >= self.min_artifact_bytes => {
                debug!(path = %path.display(), "artifact cache hit");
                Ok(true)
            }
            Ok(meta) => {
                warn!(
                    path = %path.display(),
                    size = meta.len(),
                    "removing undersized artifact from a previous crash"
                );
                tokio::fs::remove_file(path).await?;
                Ok(false)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Parse and resolve a request token, then search both storage tiers
    /// for an existing artifact.
    ///
    /// Returns the resolved spec together with the hit, if any; a miss
    /// leaves the encode decision to the caller.
    pub fn lookup(&self, token: &str) -> Result<(VideoSpec, Option<PathBuf>), TranscodeError> {
        let codec = self.filename_codec();
        let resolved = self.resolve(&codec.parse(token)?);
        let filename = codec.render(&resolved);
        let path = self.library.find_existing(&filename, self.min_artifact_bytes);
        Ok((resolved, path))
    }
}

/// Run ffmpeg and clean up the partial artifact on failure.
async fn run_encode(args: &[String], output: &Path) -> Result<(), TranscodeError> {
    match loopcast_av::run_ffmpeg(args).await {
        Ok(()) => Ok(()),
        Err(err) => {
            match tokio::fs::remove_file(output).await {
                Ok(()) => debug!(path = %output.display(), "removed partial artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %output.display(),
                    error = %e,
                    "failed to remove partial artifact"
                ),
            }
            Err(TranscodeError::Encode(err))
        }
    }
}

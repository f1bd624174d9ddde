//! Staging of upload bodies into scoped temporary files.

use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::fmt;
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    /// The upload stream itself failed (truncated or malformed body).
    #[error("upload body error: {0}")]
    Body(BoxError),

    #[error("staging I/O error: {0}")]
    Io(io::Error),
}

/// Marks errors produced by the upload stream as they pass through `io::copy`.
#[derive(Debug)]
struct BodyError(BoxError);

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for BodyError {}

impl From<io::Error> for StagingError {
    fn from(err: io::Error) -> Self {
        let is_body = err
            .get_ref()
            .map_or(false, |inner| inner.is::<BodyError>());
        if !is_body {
            return StagingError::Io(err);
        }
        match err.into_inner().map(|inner| inner.downcast::<BodyError>()) {
            Some(Ok(body)) => StagingError::Body(body.0),
            Some(Err(other)) => StagingError::Io(io::Error::new(io::ErrorKind::Other, other)),
            None => StagingError::Io(io::Error::from(io::ErrorKind::Other)),
        }
    }
}

/// An upload copied to local disk.
///
/// The file is deleted when this value is dropped, on every path. Downstream
/// tools read it by path.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Keep the file at `destination` instead of deleting it.
    pub fn persist(self, destination: &Path) -> Result<(), StagingError> {
        self.path
            .persist(destination)
            .map_err(|e| StagingError::Io(e.error))
    }
}

/// Copy `stream` into a new temporary file in `dir`.
///
/// At most `max_bytes + 1` bytes are read; anything longer is rejected without
/// draining the rest of the body.
pub async fn stage_stream<S, E>(
    stream: S,
    dir: &Path,
    prefix: &str,
    suffix: &str,
    max_bytes: u64,
) -> Result<StagedFile, StagingError>
where
    S: Stream<Item = Result<bytes::Bytes, E>>,
    E: Into<BoxError>,
{
    let named = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    let (std_file, path) = named.into_parts();

    let body_with_io_error =
        stream.map_err(|err| io::Error::new(io::ErrorKind::Other, BodyError(err.into())));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);
    let mut limited = body_reader.take(max_bytes.saturating_add(1));

    let mut writer = BufWriter::new(File::from_std(std_file));
    let size = tokio::io::copy(&mut limited, &mut writer).await?;
    writer.flush().await?;
    drop(writer);

    if size > max_bytes {
        return Err(StagingError::TooLarge { limit: max_bytes });
    }

    Ok(StagedFile { path, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;

    type E = std::io::Error;

    fn body(chunks: &[&'static str]) -> impl Stream<Item = Result<Bytes, E>> {
        stream::iter(
            chunks
                .iter()
                .map(|c| Ok::<Bytes, E>(Bytes::from_static(c.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_stage_stream_writes_file() {
        let dir = tempdir().unwrap();
        let staged = stage_stream(body(&["Hello, ", "world!"]), dir.path(), "up.", ".mp4", 1024)
            .await
            .unwrap();

        assert_eq!(staged.size(), 13);
        assert_eq!(fs::read_to_string(staged.path()).unwrap(), "Hello, world!");
        let file_name = staged.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("up.") && file_name.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_staged_file_deleted_on_drop() {
        let dir = tempdir().unwrap();
        let staged = stage_stream(body(&["abc"]), dir.path(), "up.", "", 16)
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_exact_limit_is_accepted() {
        let dir = tempdir().unwrap();
        let staged = stage_stream(body(&["12345"]), dir.path(), "up.", "", 5)
            .await
            .unwrap();
        assert_eq!(staged.size(), 5);
    }

    #[tokio::test]
    async fn test_over_limit_is_rejected_and_cleaned_up() {
        let dir = tempdir().unwrap();
        let result = stage_stream(body(&["1234", "56"]), dir.path(), "up.", "", 5).await;
        assert!(matches!(result, Err(StagingError::TooLarge { limit: 5 })));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stream_error_is_body_error() {
        let dir = tempdir().unwrap();
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err("client went away"),
        ]);
        let result = stage_stream(failing, dir.path(), "up.", "", 1024).await;
        match result {
            Err(StagingError::Body(e)) => assert_eq!(e.to_string(), "client went away"),
            other => panic!("expected a body error, got {:?}", other.map(|s| s.size())),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let result = stage_stream(body(&["abc"]), &missing, "up.", "", 16).await;
        assert!(matches!(result, Err(StagingError::Io(_))));
    }

    #[tokio::test]
    async fn test_concurrent_staging_uses_distinct_files() {
        let dir = tempdir().unwrap();
        let (a, b) = tokio::join!(
            stage_stream(body(&["first"]), dir.path(), "up.", ".mp4", 64),
            stage_stream(body(&["second"]), dir.path(), "up.", ".mp4", 64),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.path(), b.path());
        assert_eq!(fs::read_to_string(a.path()).unwrap(), "first");
        assert_eq!(fs::read_to_string(b.path()).unwrap(), "second");
    }

    #[tokio::test]
    async fn test_persist_moves_file() {
        let dir = tempdir().unwrap();
        let staged = stage_stream(body(&["png bytes"]), dir.path(), ".upload-", ".png", 64)
            .await
            .unwrap();
        let source = staged.path().to_path_buf();
        let destination = dir.path().join("final.png");
        staged.persist(&destination).unwrap();
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "png bytes");
    }
}

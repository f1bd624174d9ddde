use crate::domain::aspect::AspectClass;
use crate::error::MediaToolError;
use crate::ports::media::MediaProbe;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Tool(#[from] MediaToolError),

    #[error("probe reported no streams")]
    NoStreams,

    #[error("first stream has no usable dimensions")]
    MissingDimensions,
}

/// Buckets a media file into an [`AspectClass`] from its first reported stream.
///
/// The stream is not checked for being video; a file whose first stream is
/// audio fails with `MissingDimensions`.
pub struct AspectClassifier<P> {
    probe: P,
}

impl<P: MediaProbe> AspectClassifier<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub async fn classify(&self, path: &Path) -> Result<AspectClass, ClassifyError> {
        let report = self.probe.probe(path).await?;
        let first = report.streams.first().ok_or(ClassifyError::NoStreams)?;
        match (first.width, first.height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                Ok(AspectClass::from_dimensions(width, height))
            }
            _ => Err(ClassifyError::MissingDimensions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::media::{MockMediaProbe, ProbeReport, ProbedStream};

    fn stream(width: Option<f64>, height: Option<f64>) -> ProbedStream {
        ProbedStream {
            codec_type: Some("video".into()),
            width,
            height,
        }
    }

    fn classifier_with(report: ProbeReport) -> AspectClassifier<MockMediaProbe> {
        let mut probe = MockMediaProbe::new();
        probe
            .expect_probe()
            .times(1)
            .returning(move |_| Ok(report.clone()));
        AspectClassifier::new(probe)
    }

    #[tokio::test]
    async fn test_classifies_first_stream() {
        let classifier = classifier_with(ProbeReport {
            streams: vec![stream(Some(1080.0), Some(1920.0)), stream(Some(1920.0), Some(1080.0))],
        });
        let class = classifier.classify(Path::new("in.mp4")).await.unwrap();
        assert_eq!(class, AspectClass::Portrait);
    }

    #[tokio::test]
    async fn test_no_streams_is_error() {
        let classifier = classifier_with(ProbeReport { streams: vec![] });
        let err = classifier.classify(Path::new("in.mp4")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::NoStreams));
    }

    #[tokio::test]
    async fn test_zero_height_is_error_not_division() {
        let classifier = classifier_with(ProbeReport {
            streams: vec![stream(Some(1920.0), Some(0.0))],
        });
        let err = classifier.classify(Path::new("in.mp4")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::MissingDimensions));
    }

    #[tokio::test]
    async fn test_audio_first_stream_is_error() {
        let classifier = classifier_with(ProbeReport {
            streams: vec![ProbedStream {
                codec_type: Some("audio".into()),
                width: None,
                height: None,
            }],
        });
        let err = classifier.classify(Path::new("in.mp4")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::MissingDimensions));
    }

    #[tokio::test]
    async fn test_tool_failure_propagates() {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe().returning(|_| {
            Err(MediaToolError::Spawn {
                tool: "ffprobe".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        });
        let err = AspectClassifier::new(probe)
            .classify(Path::new("in.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Tool(MediaToolError::Spawn { .. })));
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use super::error::JobError;
use super::model::{JobRequest, JobResult, ValidatedJob};
use super::planner::{self, PlannedDerivative, TransformParams};
use crate::common::staging::StagingArea;
use crate::infrastructure::notifier::Notifier;
use crate::infrastructure::storage::{BlobStore, Visibility};
use crate::media;

/// Runs one job end to end: validate, plan, fetch, transform, upload, notify.
///
/// Holds only shared, read-only collaborators, so one instance serves any
/// number of concurrent invocations.
#[derive(Clone)]
pub struct JobOrchestrator {
    storage: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    staging_root: PathBuf,
}

impl JobOrchestrator {
    pub fn new(
        storage: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        staging_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            notifier,
            staging_root: staging_root.into(),
        }
    }

    /// Never fails: every error is folded into [`JobResult::Failure`].
    pub async fn run(&self, request: JobRequest) -> JobResult {
        let job_id = Uuid::new_v4();
        let kind = request.kind();
        let span = info_span!("media_job", %job_id, kind = kind.as_str());

        async move {
            match self.execute(job_id, request).await {
                Ok(produced_keys) => {
                    info!(?produced_keys, "✅ Job completed");
                    JobResult::Success {
                        kind,
                        produced_keys,
                    }
                }
                Err(e) => {
                    let status_code = e.status_code();
                    error!(status_code, error = %e, "❌ Job failed");
                    JobResult::Failure {
                        status_code,
                        message: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        job_id: Uuid,
        request: JobRequest,
    ) -> Result<BTreeMap<String, String>, JobError> {
        let job = request.validate()?;
        let plan = planner::plan(&job);
        info!(source = job.source_key(), derivatives = plan.len(), "Job planned");

        // Dropped on every return below, which removes all staged files.
        let staging = StagingArea::create(&self.staging_root, &job_id.to_string())?;
        let source_path = self.acquire(&staging, &job).await?;

        let mut produced = BTreeMap::new();
        for target in plan.targets() {
            let derivative = self.transform(&staging, &source_path, target).await?;
            self.persist(target, derivative).await?;
            produced.insert(target.label.to_string(), target.destination_key.clone());
        }

        let update = job.record_update(&produced);
        self.notifier.notify(&update).await?;
        info!(path = %update.path, "📣 Record update delivered");

        Ok(produced)
    }

    async fn acquire(&self, staging: &StagingArea, job: &ValidatedJob) -> Result<PathBuf, JobError> {
        let key = job.source_key();
        info!(key, "⬇️ Fetching source");

        let data = self
            .storage
            .get(key)
            .await
            .map_err(|source| JobError::SourceFetch {
                key: key.to_string(),
                source,
            })?;

        let name = format!("source{}", planner::extension_suffix(key));
        let path = staging.write(&name, &data).await?;
        info!(size = data.len(), "⬇️ Source staged");
        Ok(path)
    }

    async fn transform(
        &self,
        staging: &StagingArea,
        source_path: &Path,
        target: &PlannedDerivative,
    ) -> Result<Bytes, JobError> {
        match target.params {
            TransformParams::ResizeToBox {
                max_width,
                max_height,
            } => {
                let source = tokio::fs::read(source_path).await?;
                let encoded = tokio::task::spawn_blocking(move || {
                    media::image::resize_to_box(&source, max_width, max_height)
                })
                .await
                .map_err(|e| JobError::Encode(format!("image task aborted: {}", e)))??;

                Ok(Bytes::from(encoded))
            }
            TransformParams::TranscodeMp3 => {
                let output_name = format!("{}.mp3", target.label);
                let input = source_path.to_path_buf();
                let output = staging.file(&output_name);

                let written = tokio::task::spawn_blocking(move || {
                    media::audio::transcode_file(&input, &output)
                })
                .await
                .map_err(|e| JobError::Encode(format!("audio task aborted: {}", e)))??;

                info!(label = target.label, bytes = written, "🎵 Audio transcoded");
                Ok(staging.read(&output_name).await?)
            }
        }
    }

    async fn persist(&self, target: &PlannedDerivative, body: Bytes) -> Result<(), JobError> {
        let content_type = target.content_type();
        let size = body.len();

        self.storage
            .put(&target.destination_key, body, &content_type, Visibility::PublicRead)
            .await
            .map_err(|source| JobError::DerivativeUpload {
                key: target.destination_key.clone(),
                source,
            })?;

        info!(label = target.label, key = %target.destination_key, size, "⬆️ Derivative uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::notifier::recording::RecordingNotifier;
    use crate::infrastructure::storage::memory::MemoryBlobStore;
    use crate::media::audio::tests::wav_bytes;
    use crate::modules::jobs::dto::{ThumbnailJobRequest, TranscodeJobRequest};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    const COVER_KEY: &str = "covers/2024/cover.png";
    const WAV_KEY: &str = "tracks/raw/take.wav";

    fn cover_png() -> Vec<u8> {
        let image = RgbImage::from_pixel(2048, 1536, Rgb([200, 30, 90]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn thumbnail_request(entity_type: Option<&str>) -> JobRequest {
        JobRequest::ImageThumbnail(ThumbnailJobRequest {
            entity_id: Some("track-1".into()),
            entity_type: entity_type.map(String::from),
            cover_image_key: Some(COVER_KEY.into()),
            ..Default::default()
        })
    }

    struct Harness {
        store: Arc<MemoryBlobStore>,
        notifier: Arc<RecordingNotifier>,
        staging: TempDir,
        orchestrator: JobOrchestrator,
    }

    impl Harness {
        fn new(store: MemoryBlobStore, notifier_status: u16) -> Self {
            let store = Arc::new(store);
            let notifier = Arc::new(RecordingNotifier::responding(notifier_status));
            let staging = tempfile::tempdir().unwrap();
            let orchestrator =
                JobOrchestrator::new(store.clone(), notifier.clone(), staging.path());
            Self {
                store,
                notifier,
                staging,
                orchestrator,
            }
        }

        fn staging_is_empty(&self) -> bool {
            std::fs::read_dir(self.staging.path()).unwrap().next().is_none()
        }
    }

    #[tokio::test]
    async fn thumbnail_job_uploads_both_sizes_then_notifies() {
        let harness = Harness::new(MemoryBlobStore::with_object(COVER_KEY, cover_png()), 200);

        let result = harness.orchestrator.run(thumbnail_request(Some("album"))).await;

        assert_eq!(result.status_code(), 200);
        assert_eq!(harness.store.get_calls(), vec![COVER_KEY.to_string()]);
        assert_eq!(
            harness.store.put_calls(),
            vec![
                "covers/2024/cover_thumbnail_small.webp".to_string(),
                "covers/2024/cover_thumbnail_mid.webp".to_string(),
            ]
        );

        let small = harness.store.object("covers/2024/cover_thumbnail_small.webp").unwrap();
        assert_eq!(small.content_type, "image/webp");
        assert_eq!(small.visibility, Visibility::PublicRead);
        let decoded = image::load_from_memory(&small.body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (150, 113));

        let mid = harness.store.object("covers/2024/cover_thumbnail_mid.webp").unwrap();
        let decoded = image::load_from_memory(&mid.body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1024, 768));

        let updates = harness.notifier.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].path, "api/albums/update-thumbnail");
        assert_eq!(
            updates[0].payload["thumbnailKeys"]["mid"],
            "covers/2024/cover_thumbnail_mid.webp"
        );
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn transcode_job_uploads_mp3_and_notifies() {
        let wav = wav_bytes(44_100, 2, 0.5);
        let harness = Harness::new(MemoryBlobStore::with_object(WAV_KEY, wav), 200);
        let request = JobRequest::AudioTranscode(TranscodeJobRequest {
            track_id: Some("t-9".into()),
            audio_file_wav_key: Some(WAV_KEY.into()),
        });

        let result = harness.orchestrator.run(request).await;

        match &result {
            JobResult::Success { produced_keys, .. } => {
                assert_eq!(produced_keys.get("mp3").unwrap(), "tracks/raw/take.mp3");
            }
            other => panic!("expected success, got {other:?}"),
        }
        let mp3 = harness.store.object("tracks/raw/take.mp3").unwrap();
        assert_eq!(mp3.content_type, "audio/mpeg");
        assert!(!mp3.body.is_empty());

        let updates = harness.notifier.updates();
        assert_eq!(updates[0].path, "api/tracks/update-mp3");
        assert_eq!(updates[0].payload["trackId"], "t-9");
        assert_eq!(updates[0].payload["mp3Key"], "tracks/raw/take.mp3");
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn missing_id_fails_validation_without_side_effects() {
        let harness = Harness::new(MemoryBlobStore::with_object(COVER_KEY, cover_png()), 200);
        let request = JobRequest::ImageThumbnail(ThumbnailJobRequest {
            cover_image_key: Some("x".into()),
            ..Default::default()
        });

        let result = harness.orchestrator.run(request).await;

        assert_eq!(result.status_code(), 400);
        assert!(harness.store.get_calls().is_empty());
        assert!(harness.store.put_calls().is_empty());
        assert!(harness.notifier.updates().is_empty());
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn unsupported_entity_type_is_a_400_listing_types() {
        let harness = Harness::new(MemoryBlobStore::with_object(COVER_KEY, cover_png()), 200);

        let result = harness.orchestrator.run(thumbnail_request(Some("widget"))).await;

        match result {
            JobResult::Failure {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert!(message.contains("track, album, artist, playlist"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(harness.store.get_calls().is_empty());
    }

    #[tokio::test]
    async fn absent_source_is_a_500_with_no_uploads_or_notify() {
        let harness = Harness::new(MemoryBlobStore::default(), 200);

        let result = harness.orchestrator.run(thumbnail_request(None)).await;

        assert_eq!(result.status_code(), 500);
        assert_eq!(harness.store.get_calls().len(), 1);
        assert!(harness.store.put_calls().is_empty());
        assert!(harness.notifier.updates().is_empty());
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn notifier_rejection_keeps_uploaded_derivatives() {
        let harness = Harness::new(MemoryBlobStore::with_object(COVER_KEY, cover_png()), 503);

        let result = harness.orchestrator.run(thumbnail_request(None)).await;

        assert_eq!(result.status_code(), 503);
        assert!(matches!(result, JobResult::Failure { .. }));
        assert!(harness.store.object("covers/2024/cover_thumbnail_small.webp").is_some());
        assert!(harness.store.object("covers/2024/cover_thumbnail_mid.webp").is_some());
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn failed_upload_stops_remaining_derivatives() {
        let store = MemoryBlobStore::with_object(COVER_KEY, cover_png());
        store.fail_put_for("covers/2024/cover_thumbnail_small.webp");
        let harness = Harness::new(store, 200);

        let result = harness.orchestrator.run(thumbnail_request(None)).await;

        assert_eq!(result.status_code(), 500);
        assert_eq!(harness.store.put_calls().len(), 1);
        assert!(harness.notifier.updates().is_empty());
        assert!(harness.staging_is_empty());
    }

    #[tokio::test]
    async fn undecodable_source_fails_before_upload() {
        let harness = Harness::new(MemoryBlobStore::with_object(COVER_KEY, &b"not a png"[..]), 200);

        let result = harness.orchestrator.run(thumbnail_request(None)).await;

        match result {
            JobResult::Failure { status_code, message } => {
                assert_eq!(status_code, 500);
                assert!(message.contains("decode"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(harness.store.put_calls().is_empty());
        assert!(harness.staging_is_empty());
    }
}

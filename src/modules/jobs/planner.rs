//! Decides which derivatives a job produces and where they are stored.
//!
//! Destination keys are pure functions of the source key and the label, so
//! re-running a job overwrites the same objects.

use std::path::Path;

use super::model::ValidatedJob;

pub const SMALL_LABEL: &str = "small";
pub const MID_LABEL: &str = "mid";
pub const MP3_LABEL: &str = "mp3";

/// Thumbnail boxes, in processing order.
pub const THUMBNAIL_BOXES: [(&str, u32, u32); 2] = [(SMALL_LABEL, 150, 150), (MID_LABEL, 1024, 1024)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformParams {
    ResizeToBox { max_width: u32, max_height: u32 },
    TranscodeMp3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDerivative {
    pub label: &'static str,
    pub params: TransformParams,
    pub destination_key: String,
}

impl PlannedDerivative {
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.destination_key)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativePlan {
    targets: Vec<PlannedDerivative>,
}

impl DerivativePlan {
    pub fn targets(&self) -> &[PlannedDerivative] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

pub fn plan(job: &ValidatedJob) -> DerivativePlan {
    let targets = match job {
        ValidatedJob::ImageThumbnail { source_key, .. } => THUMBNAIL_BOXES
            .iter()
            .map(|&(label, max_width, max_height)| PlannedDerivative {
                label,
                params: TransformParams::ResizeToBox {
                    max_width,
                    max_height,
                },
                destination_key: thumbnail_key(source_key, label),
            })
            .collect(),
        ValidatedJob::AudioTranscode { source_key, .. } => vec![PlannedDerivative {
            label: MP3_LABEL,
            params: TransformParams::TranscodeMp3,
            destination_key: mp3_key(source_key),
        }],
    };

    DerivativePlan { targets }
}

/// `covers/art.png` + `small` -> `covers/art_thumbnail_small.webp`
pub fn thumbnail_key(source_key: &str, label: &str) -> String {
    let (dir, file) = split_key(source_key);
    format!("{}{}_thumbnail_{}.webp", dir, file_stem(file), label)
}

/// `audio/take.wav` -> `audio/take.mp3`
pub fn mp3_key(source_key: &str) -> String {
    let (dir, file) = split_key(source_key);
    format!("{}{}.mp3", dir, file_stem(file))
}

/// Split into the directory prefix (with trailing `/`) and the file name.
fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(idx) => key.split_at(idx + 1),
        None => ("", key),
    }
}

/// File name without its last extension. Leading dots do not start an extension.
fn file_stem(file: &str) -> &str {
    match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    }
}

/// Extension of a key including the dot, or an empty string.
pub fn extension_suffix(key: &str) -> String {
    Path::new(split_key(key).1)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::model::EntityType;

    fn image_job(key: &str) -> ValidatedJob {
        ValidatedJob::ImageThumbnail {
            entity_id: "1".into(),
            entity_type: EntityType::Track,
            source_key: key.into(),
        }
    }

    #[test]
    fn image_plan_has_small_then_mid() {
        let plan = plan(&image_job("covers/2024/art.final.png"));
        let keys: Vec<_> = plan
            .targets()
            .iter()
            .map(|t| (t.label, t.destination_key.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("small", "covers/2024/art.final_thumbnail_small.webp"),
                ("mid", "covers/2024/art.final_thumbnail_mid.webp"),
            ]
        );
        assert_eq!(
            plan.targets()[0].params,
            TransformParams::ResizeToBox {
                max_width: 150,
                max_height: 150
            }
        );
    }

    #[test]
    fn replanning_is_deterministic_and_collision_free() {
        for key in ["a.png", "dir/a", "x.y/z.jpeg", ".hidden", "deep/er/path/IMG_01.JPG"] {
            let first = plan(&image_job(key));
            let second = plan(&image_job(key));
            assert_eq!(first, second);
            assert_eq!(first.len(), 2);
            assert_ne!(first.targets()[0].destination_key, first.targets()[1].destination_key);
        }
    }

    #[test]
    fn directories_with_dots_are_left_alone() {
        assert_eq!(thumbnail_key("x.y/z", "mid"), "x.y/z_thumbnail_mid.webp");
        assert_eq!(mp3_key("v1.2/take"), "v1.2/take.mp3");
    }

    #[test]
    fn audio_plan_swaps_extension() {
        let job = ValidatedJob::AudioTranscode {
            track_id: "t".into(),
            source_key: "uploads/wav/song.wav".into(),
        };
        let plan = plan(&job);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.targets()[0].destination_key, "uploads/wav/song.mp3");
        assert_eq!(plan.targets()[0].content_type(), "audio/mpeg");
    }

    #[test]
    fn thumbnails_are_webp() {
        let plan = plan(&image_job("a.png"));
        assert_eq!(plan.targets()[1].content_type(), "image/webp");
    }

    #[test]
    fn extension_suffix_ignores_directories() {
        assert_eq!(extension_suffix("a/b.wav"), ".wav");
        assert_eq!(extension_suffix("a.d/b"), "");
    }
}

//! Media conversion jobs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::{
    optional, validate_enum_field, validate_number_field, validate_string_field, AttributeEnum,
    Item, NumberRules, StringRules,
};
use crate::keys::{job_key, TableKey};
use crate::storage::{AttributeUpdates, EntityMapper, Repository, RepositoryError, Result};

/// Largest accepted input file (500 MiB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Jobs expire this long after creation.
pub const JOB_TTL_SECONDS: i64 = 86_400;

/// Attribute holding the job's [`JobStatus`].
pub const ATTR_STATUS: &str = "Status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AttributeEnum for JobStatus {
    const VARIANTS: &'static [Self] = &[
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCodec {
    H264,
    Vp9,
    Av1,
}

impl AttributeEnum for OutputCodec {
    const VARIANTS: &'static [Self] = &[Self::H264, Self::Vp9, Self::Av1];

    fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    pub status: JobStatus,
    /// Object key of the uploaded input.
    pub input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    pub output_codec: OutputCodec,
    pub file_name: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// TTL, epoch seconds.
    pub expires_at: i64,
}

/// Request to create a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub file_name: String,
    pub file_size: u64,
    pub output_codec: OutputCodec,
}

impl Job {
    /// Builds a `PENDING` job after validating the request.
    pub fn pending(request: NewJob, job_id: Uuid, now_secs: i64) -> Result<Self> {
        if request.file_name.trim().is_empty() {
            return Err(RepositoryError::InvalidEntityData(
                "field \"fileName\" must not be empty".to_string(),
            ));
        }
        if request.file_size == 0 {
            return Err(RepositoryError::InvalidEntityData(
                "field \"fileSize\" must be a positive number".to_string(),
            ));
        }
        if request.file_size > MAX_FILE_SIZE {
            return Err(RepositoryError::InvalidEntityData(format!(
                "field \"fileSize\" must not exceed {MAX_FILE_SIZE} bytes (500MB)"
            )));
        }

        Ok(Self {
            job_id,
            status: JobStatus::Pending,
            input_file: format!("uploads/{job_id}/input.mp4"),
            output_file: None,
            output_codec: request.output_codec,
            file_name: request.file_name,
            file_size: request.file_size,
            error_message: None,
            expires_at: now_secs + JOB_TTL_SECONDS,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub output_file: Option<String>,
    pub error_message: Option<String>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JobMapper;

impl EntityMapper for JobMapper {
    type Entity = Job;
    type Key = Uuid;
    type Patch = JobPatch;

    const ENTITY_TYPE: &'static str = "Job";

    fn build_keys(&self, job_id: &Uuid) -> TableKey {
        job_key(*job_id)
    }

    fn key_of(&self, job: &Job) -> Uuid {
        job.job_id
    }

    fn to_item(&self, job: &Job) -> Item {
        Item::keyed(&job_key(job.job_id), Self::ENTITY_TYPE)
            .with("JobID", job.job_id.to_string())
            .with(ATTR_STATUS, job.status.as_str())
            .with("InputFile", job.input_file.as_str())
            .with_opt("OutputFile", job.output_file.as_deref())
            .with("OutputCodec", job.output_codec.as_str())
            .with("FileName", job.file_name.as_str())
            .with("FileSize", job.file_size)
            .with_opt("ErrorMessage", job.error_message.as_deref())
            .with("ExpiresAt", job.expires_at)
    }

    fn to_entity(&self, item: &Item) -> Result<Job> {
        let raw_id = validate_string_field(item.get("JobID"), "JobID", &StringRules::default())?;
        let job_id = Uuid::parse_str(&raw_id).map_err(|_| {
            RepositoryError::InvalidEntityData("field \"JobID\" must be a UUID".to_string())
        })?;

        let file_size = validate_number_field(
            item.get("FileSize"),
            "FileSize",
            &NumberRules {
                min: Some(0.0),
                ..NumberRules::integer()
            },
        )?;
        let expires_at =
            validate_number_field(item.get("ExpiresAt"), "ExpiresAt", &NumberRules::integer())?;

        Ok(Job {
            job_id,
            status: validate_enum_field(item.get(ATTR_STATUS), ATTR_STATUS)?,
            input_file: validate_string_field(
                item.get("InputFile"),
                "InputFile",
                &StringRules::default(),
            )?,
            output_file: optional(item.get("OutputFile"), |v| {
                validate_string_field(v, "OutputFile", &StringRules::default())
            })?,
            output_codec: validate_enum_field(item.get("OutputCodec"), "OutputCodec")?,
            file_name: validate_string_field(
                item.get("FileName"),
                "FileName",
                &StringRules::default(),
            )?,
            file_size: file_size as u64,
            error_message: optional(item.get("ErrorMessage"), |v| {
                validate_string_field(v, "ErrorMessage", &StringRules::allow_empty())
            })?,
            expires_at: expires_at as i64,
        })
    }

    fn patch_attributes(&self, patch: &JobPatch) -> AttributeUpdates {
        let mut set = AttributeUpdates::new();
        if let Some(status) = patch.status {
            set.insert(ATTR_STATUS.to_string(), status.as_str().into());
        }
        if let Some(output_file) = &patch.output_file {
            set.insert("OutputFile".to_string(), output_file.as_str().into());
        }
        if let Some(error_message) = &patch.error_message {
            set.insert("ErrorMessage".to_string(), error_message.as_str().into());
        }
        set
    }
}

pub type JobRepository = Repository<JobMapper>;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::item::AttributeValue;
    use crate::storage::{decode_record, encode_record, InMemoryStore, Timestamped};

    fn new_job() -> NewJob {
        NewJob {
            file_name: "clip.mp4".to_string(),
            file_size: 1_024_000,
            output_codec: OutputCodec::Vp9,
        }
    }

    fn job() -> Job {
        Job::pending(new_job(), Uuid::new_v4(), 1_700_000_000).unwrap()
    }

    #[test]
    fn test_pending_job_defaults() {
        let id = Uuid::new_v4();
        let job = Job::pending(new_job(), id, 1_700_000_000).unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.input_file, format!("uploads/{id}/input.mp4"));
        assert_eq!(job.expires_at, 1_700_000_000 + 86_400);
        assert!(job.output_file.is_none());
    }

    #[test]
    fn test_pending_job_rejects_oversized_and_empty_files() {
        let too_big = NewJob {
            file_size: MAX_FILE_SIZE + 1,
            ..new_job()
        };
        assert!(Job::pending(too_big, Uuid::new_v4(), 0).is_err());

        let at_limit = NewJob {
            file_size: MAX_FILE_SIZE,
            ..new_job()
        };
        assert!(Job::pending(at_limit, Uuid::new_v4(), 0).is_ok());

        let empty = NewJob {
            file_size: 0,
            ..new_job()
        };
        assert!(Job::pending(empty, Uuid::new_v4(), 0).is_err());

        let blank_name = NewJob {
            file_name: "   ".to_string(),
            ..new_job()
        };
        assert!(Job::pending(blank_name, Uuid::new_v4(), 0).is_err());
    }

    #[test]
    fn test_new_job_rejects_unknown_codec() {
        let result: std::result::Result<NewJob, _> = serde_json::from_str(
            r#"{"fileName":"a.mp4","fileSize":10,"outputCodec":"mpeg2"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_job_item_layout() {
        let job = job();
        let item = JobMapper.to_item(&job);
        let pk = format!("JOB#{}", job.job_id);

        assert_eq!(item.pk(), Some(pk.as_str()));
        assert_eq!(item.sk(), Some(pk.as_str()));
        assert_eq!(item.entity_type(), Some("Job"));
        assert_eq!(item.get_s("Status"), Some("PENDING"));
        assert_eq!(item.get_s("OutputCodec"), Some("vp9"));
        assert!(!item.contains("OutputFile"));
    }

    #[test]
    fn test_job_record_round_trip() {
        let mut job = job();
        job.output_file = Some("outputs/x.webm".to_string());
        job.error_message = Some("boom".to_string());
        let record = Timestamped::new(job, 1_700_000_000_000);

        let item = encode_record(&JobMapper, &record);
        let decoded = decode_record(&JobMapper, &item).unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_job_decode_rejects_bad_status() {
        let mut item = encode_record(&JobMapper, &Timestamped::new(job(), 1));
        item.insert("Status", AttributeValue::from("QUEUED"));

        match decode_record(&JobMapper, &item) {
            Err(RepositoryError::InvalidEntityData(message)) => {
                assert!(message.starts_with("field \"Status\""), "{message}");
            }
            other => panic!("expected InvalidEntityData, got {other:?}"),
        }
    }

    #[test]
    fn test_job_patch_attributes() {
        let patch = JobPatch {
            status: Some(JobStatus::Failed),
            error_message: Some("codec crashed".to_string()),
            ..JobPatch::default()
        };
        let set = JobMapper.patch_attributes(&patch);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("Status"), Some(&AttributeValue::from("FAILED")));
    }

    #[tokio::test]
    async fn test_job_repository_lifecycle() {
        let repo = JobRepository::new(Arc::new(InMemoryStore::new("t")), JobMapper);
        let job = repo.create(job()).await.unwrap();

        let updated = repo
            .update(&job.job_id, &JobPatch::status(JobStatus::Completed))
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(updated.file_name, "clip.mp4");

        repo.delete(&job.job_id).await.unwrap();
        assert!(repo.get_by_id(&job.job_id).await.unwrap().is_none());
    }
}

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use singletable_core::jobs::{JobQueue, JobSubmission, QueueError};

/// Enqueues jobs by POSTing them as JSON to a downstream processor.
///
/// The processor answers with `{ "jobId": "<queue job id>" }`.
#[derive(Debug, Clone)]
pub struct HttpJobQueue {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnqueueResponse {
    job_id: String,
}

impl HttpJobQueue {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, QueueError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JobQueue for HttpJobQueue {
    async fn enqueue(&self, submission: &JobSubmission) -> Result<String, QueueError> {
        let response = self
            .client
            .post(&self.url)
            .json(submission)
            .send()
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(job_id = %submission.job_id, %status, "Job queue rejected submission");
            return Err(QueueError::Rejected(format!("{status}: {body}")));
        }

        let body: EnqueueResponse = response
            .json()
            .await
            .map_err(|e| QueueError::InvalidResponse(e.to_string()))?;

        if body.job_id.is_empty() {
            return Err(QueueError::InvalidResponse("empty jobId".to_string()));
        }

        Ok(body.job_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::*;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/jobs")
    }

    fn submission() -> JobSubmission {
        let job_id = Uuid::new_v4();
        JobSubmission {
            job_id,
            parameters: BTreeMap::from([
                ("JOB_ID".to_string(), job_id.to_string()),
                ("OUTPUT_CODEC".to_string(), "vp9".to_string()),
            ]),
        }
    }

    fn queue(url: String) -> HttpJobQueue {
        HttpJobQueue::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_enqueue_posts_submission_and_reads_job_id() {
        let received: Received = Arc::default();
        let router = Router::new()
            .route(
                "/jobs",
                post(
                    |State(received): State<Received>, Json(body): Json<serde_json::Value>| async move {
                        received.lock().await.push(body);
                        Json(serde_json::json!({ "jobId": "batch-42" }))
                    },
                ),
            )
            .with_state(received.clone());
        let url = serve(router).await;

        let submission = submission();
        let queue_job_id = queue(url).enqueue(&submission).await.unwrap();

        assert_eq!(queue_job_id, "batch-42");
        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["jobId"], submission.job_id.to_string());
        assert_eq!(received[0]["parameters"]["OUTPUT_CODEC"], "vp9");
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let router = Router::new().route(
            "/jobs",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "compute environment full") }),
        );
        let url = serve(router).await;

        let result = queue(url).enqueue(&submission()).await;
        match result {
            Err(QueueError::Rejected(message)) => {
                assert!(message.contains("503"), "{message}");
                assert!(message.contains("compute environment full"), "{message}");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_is_invalid_response() {
        let router = Router::new().route("/jobs", post(|| async { "queued" }));
        let url = serve(router).await;

        let result = queue(url).enqueue(&submission()).await;
        assert!(matches!(result, Err(QueueError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_processor_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = queue(format!("http://{addr}/jobs"))
            .enqueue(&submission())
            .await;
        assert!(matches!(result, Err(QueueError::Unavailable(_))));
    }
}

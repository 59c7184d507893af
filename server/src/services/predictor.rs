use inferlib::{JobCoordinator, JobError};
use protobuf::species_net_server::SpeciesNet;
use protobuf::{HealthRequest, HealthResponse, PredictRequest, PredictResponse};
use std::time::Instant;
use tonic::{Request, Response, Status};
use tracing::{info, warn};
use uuid::Uuid;

pub const HEALTH_MESSAGE: &str = "SpeciesNet API is running!";

// tonic wraps this in Arc anyway internally, so we don't need Arc
pub struct PredictorService {
    coordinator: JobCoordinator,
}

impl PredictorService {
    pub fn new(coordinator: JobCoordinator) -> Self {
        Self { coordinator }
    }
}

/// Uploads must either say nothing about their type or claim to be an image.
fn check_content_type(content_type: &str) -> Result<(), Status> {
    let content_type = content_type.trim();
    if content_type.is_empty() || content_type.to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(Status::invalid_argument(format!(
            "unsupported content type {:?}, expected image/*",
            content_type
        )))
    }
}

/// Client mistakes map to INVALID_ARGUMENT, everything else is the server's problem.
pub fn job_error_status(err: &JobError) -> Status {
    let message = err.to_string();
    if err.is_client_error() {
        return Status::invalid_argument(message);
    }
    match err {
        JobError::Timeout(_) => Status::deadline_exceeded(message),
        JobError::Spawn { .. } => Status::unavailable(message),
        _ => Status::internal(message),
    }
}

#[tonic::async_trait]
impl SpeciesNet for PredictorService {
    async fn health(
        &self,
        _req: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        Ok(Response::new(HealthResponse {
            message: HEALTH_MESSAGE.into(),
        }))
    }

    async fn predict(
        &self,
        req: Request<PredictRequest>,
    ) -> Result<Response<PredictResponse>, Status> {
        let PredictRequest {
            image,
            content_type,
        } = req.into_inner();
        check_content_type(&content_type)?;

        let job_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%job_id, bytes = image.len(), %content_type, "predict request");

        let prediction = self
            .coordinator
            .run_job(job_id, &image)
            .await
            .map_err(|err| {
                let status = job_error_status(&err);
                warn!(%job_id, code = ?status.code(), error = %err, "predict failed");
                status
            })?;

        let prediction_json =
            serde_json::to_string(&prediction).map_err(|err| Status::internal(err.to_string()))?;
        info!(
            %job_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "predict succeeded"
        );
        Ok(Response::new(PredictResponse {
            job_id: job_id.as_bytes().to_vec(),
            prediction_json,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tonic::Code;

    #[test]
    fn accepts_images_and_unlabelled_uploads() {
        assert!(check_content_type("").is_ok());
        assert!(check_content_type("image/jpeg").is_ok());
        assert!(check_content_type("Image/PNG").is_ok());
        let err = check_content_type("application/pdf").unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);
    }

    #[test]
    fn job_errors_map_to_status_codes() {
        let cases = vec![
            (JobError::InvalidInput("empty".into()), Code::InvalidArgument),
            (JobError::Timeout(Duration::from_secs(1)), Code::DeadlineExceeded),
            (
                JobError::Spawn {
                    program: "python3".into(),
                    source: std::io::ErrorKind::NotFound.into(),
                },
                Code::Unavailable,
            ),
            (
                JobError::ExternalProcess {
                    status: inferlib::ExitStatus::Exited { code: 1 },
                    stdout: String::new(),
                    stderr: "model load failed".into(),
                },
                Code::Internal,
            ),
            (
                JobError::MissingArtifact {
                    path: PathBuf::from("/w/predictions.json"),
                },
                Code::Internal,
            ),
            (
                JobError::MissingEntry {
                    asset: "abc.jpg".into(),
                },
                Code::Internal,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(job_error_status(&err).code(), code, "{}", err);
        }
    }

    #[test]
    fn process_failure_message_includes_stderr() {
        let err = JobError::ExternalProcess {
            status: inferlib::ExitStatus::Exited { code: 1 },
            stdout: String::new(),
            stderr: "model load failed".into(),
        };
        assert!(job_error_status(&err).message().contains("model load failed"));
    }
}

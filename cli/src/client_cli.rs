use std::path::Path;

use protobuf::{species_net_client::SpeciesNetClient, HealthRequest, PredictRequest};
use tonic::{transport::Channel, Request, Status};
use tracing::debug;
use uuid::Uuid;

use crate::arg_parser::guess_content_type;

pub struct ClientCli {
    inner: SpeciesNetClient<Channel>,
}

impl ClientCli {
    pub async fn connect(server_addr: &str) -> Result<Self, tonic::transport::Error> {
        let inner = SpeciesNetClient::connect(server_addr.to_string()).await?;
        Ok(Self { inner })
    }

    pub async fn health(&mut self) -> Result<(), Status> {
        let response = self.inner.health(Request::new(HealthRequest {})).await?;
        println!("{}", response.into_inner().message);
        Ok(())
    }

    /// Upload an image and pretty-print the returned prediction.
    pub async fn predict(
        &mut self,
        image_path: &Path,
        content_type: Option<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let image = tokio::fs::read(image_path).await?;
        let content_type = content_type
            .or_else(|| guess_content_type(image_path).map(str::to_string))
            .unwrap_or_default();
        debug!(path = %image_path.display(), bytes = image.len(), %content_type, "uploading image");

        let response = self
            .inner
            .predict(Request::new(PredictRequest {
                image,
                content_type,
            }))
            .await?
            .into_inner();

        let job_id = Uuid::from_slice(&response.job_id)?;
        let prediction: serde_json::Value = serde_json::from_str(&response.prediction_json)?;
        println!("Job id: {}", job_id);
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        Ok(())
    }
}

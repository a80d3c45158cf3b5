//! Pose provider backed by the HTTP landmark service.

use async_trait::async_trait;
use image::DynamicImage;
use tryon_ml_client::LandmarkClient;
use tryon_models::{LandmarkSet, PoseOptions};

use crate::codec::encode_png;
use crate::detector::{PoseDetector, PoseProvider};
use crate::error::MediaResult;

/// Opens detectors that send images to a [`LandmarkClient`].
#[derive(Debug, Clone)]
pub struct RemotePoseProvider {
    client: LandmarkClient,
}

impl RemotePoseProvider {
    pub fn new(client: LandmarkClient) -> Self {
        Self { client }
    }
}

struct RemotePoseDetector {
    client: LandmarkClient,
    options: PoseOptions,
}

#[async_trait]
impl PoseDetector for RemotePoseDetector {
    async fn detect(&mut self, image: &DynamicImage) -> MediaResult<LandmarkSet> {
        let png = encode_png(&image.to_rgba8())?;
        Ok(self.client.detect(png, &self.options).await?)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[async_trait]
impl PoseProvider for RemotePoseProvider {
    async fn open(&self, options: &PoseOptions) -> MediaResult<Box<dyn PoseDetector>> {
        Ok(Box::new(RemotePoseDetector {
            client: self.client.clone(),
            options: options.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

//! Visit photo uploads

use crate::{error::AppResult, repository::blob::BlobRepository};

#[derive(Clone)]
pub struct PhotosService {
    blob: BlobRepository,
}

impl PhotosService {
    pub fn new(blob: BlobRepository) -> Self {
        Self { blob }
    }

    /// Upload a base64 data-URL photo and return its public URL
    pub async fn upload(&self, data_url: &str, filename: &str) -> AppResult<String> {
        self.blob.upload_image(data_url, filename).await
    }
}

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::ProductOptions,
    error::{CaseError, CaseResult},
    fingerprint,
    model::{Configuration, ConfigurationId, SourceImage},
    store::{ConfigurationPatch, ConfigurationStore},
};

/// Upload size cap, matching the hosted pipeline's limit.
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub url: String,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub asset: UploadedAsset,
    pub configuration: Configuration,
}

/// Durable object storage plus configuration association. Payload validation
/// happens here, before any state mutates.
pub trait UploadPipeline: Send + Sync {
    /// Stores a raw upload. Without a configuration id, a new draft
    /// configuration is created from the image's native dimensions; with one,
    /// the upload becomes that configuration's composite
    /// (`cropped_image_url`).
    fn upload(
        &self,
        file: &UploadFile,
        config_id: Option<&ConfigurationId>,
    ) -> CaseResult<UploadOutcome>;

    /// Stores a rendered composite for `config_id` and commits
    /// `cropped_image_url` together with the product options as one
    /// configuration write.
    fn upload_composite(
        &self,
        file: &UploadFile,
        config_id: &ConfigurationId,
        options: ProductOptions,
    ) -> CaseResult<UploadOutcome>;

    /// Reads a stored object back, e.g. the original upload for compositing.
    fn fetch(&self, url: &str) -> CaseResult<Vec<u8>>;
}

/// Rejects unsupported payloads before the core sees them. Only PNG and JPEG
/// uploads are accepted.
pub fn validate_payload(file: &UploadFile) -> CaseResult<ImageFormat> {
    if file.bytes.is_empty() {
        return Err(CaseError::input("upload is empty"));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(CaseError::input(format!(
            "upload exceeds the {} MiB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    let format = image::guess_format(&file.bytes)
        .map_err(|_| CaseError::input("upload is not a recognizable image"))?;
    match format {
        ImageFormat::Png | ImageFormat::Jpeg => Ok(format),
        other => Err(CaseError::input(format!(
            "{other:?} uploads are not supported, use PNG or JPEG"
        ))),
    }
}

/// In-memory pipeline backed by a configuration store. Object URLs are
/// content-addressed, so re-uploading identical bytes overwrites in place and
/// yields the same URL.
pub struct MemoryUploadPipeline {
    configurations: Arc<dyn ConfigurationStore>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryUploadPipeline {
    pub fn new(configurations: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            configurations,
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn store_object(&self, bytes: &[u8], format: ImageFormat) -> String {
        let ext = match format {
            ImageFormat::Jpeg => "jpg",
            _ => "png",
        };
        let url = format!(
            "mem://case-art/{}.{ext}",
            fingerprint::fingerprint_bytes(bytes).to_hex()
        );
        let mut objects = self
            .objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        objects.insert(url.clone(), bytes.to_vec());
        url
    }

    fn probe_dims(bytes: &[u8]) -> CaseResult<(u32, u32)> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| CaseError::input(format!("decode upload: {e}")))?;
        Ok((img.width(), img.height()))
    }
}

impl UploadPipeline for MemoryUploadPipeline {
    fn upload(
        &self,
        file: &UploadFile,
        config_id: Option<&ConfigurationId>,
    ) -> CaseResult<UploadOutcome> {
        let format = validate_payload(file)?;
        let (width_px, height_px) = Self::probe_dims(&file.bytes)?;
        let url = self.store_object(&file.bytes, format);
        let asset = UploadedAsset {
            url: url.clone(),
            width_px,
            height_px,
        };

        let configuration = match config_id {
            Some(id) => self.configurations.update(
                id,
                ConfigurationPatch {
                    cropped_image_url: Some(url),
                    options: None,
                },
            )?,
            None => self
                .configurations
                .create(SourceImage::new(url, width_px, height_px)?)?,
        };

        Ok(UploadOutcome {
            asset,
            configuration,
        })
    }

    fn upload_composite(
        &self,
        file: &UploadFile,
        config_id: &ConfigurationId,
        options: ProductOptions,
    ) -> CaseResult<UploadOutcome> {
        let format = validate_payload(file)?;
        let (width_px, height_px) = Self::probe_dims(&file.bytes)?;
        // Blob first; the configuration commit below is the single point
        // where state becomes visible. A failed commit leaves only an
        // unreferenced, content-addressed object behind.
        let url = self.store_object(&file.bytes, format);
        let configuration = self.configurations.update(
            config_id,
            ConfigurationPatch {
                cropped_image_url: Some(url.clone()),
                options: Some(options),
            },
        )?;
        Ok(UploadOutcome {
            asset: UploadedAsset {
                url,
                width_px,
                height_px,
            },
            configuration,
        })
    }

    fn fetch(&self, url: &str) -> CaseResult<Vec<u8>> {
        let objects = self
            .objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        objects
            .get(url)
            .cloned()
            .ok_or_else(|| CaseError::persistence(format!("object {url} not found")))
    }
}

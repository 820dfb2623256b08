//! EC2 implementation of the image catalog.
//!
//! Uses the AWS SDK for Rust. Credentials resolve from the static keys in the
//! config when both are present, otherwise from the SDK default chain
//! (environment, shared profile, instance role). Retries are the SDK's
//! standard mode, bounded by `max_retries`.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::types::{Filter, Image};
use tracing::{debug, warn};

use culler_core::domain::{
    BlockDevice, ImageDescriptor, ImageId, ProviderError, ProviderOperation, SnapshotId, TagFilter,
};
use culler_core::ports::{CatalogFactory, ImageCatalog, ImagePage, ProviderSettings};

/// Builds an authenticated EC2 client from provider settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ec2CatalogFactory;

#[async_trait]
impl CatalogFactory for Ec2CatalogFactory {
    async fn connect(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn ImageCatalog>, ProviderError> {
        let catalog = Ec2Catalog::connect(settings).await?;
        Ok(Arc::new(catalog))
    }
}

pub struct Ec2Catalog {
    client: Client,
}

impl Ec2Catalog {
    pub async fn connect(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let retry = RetryConfig::standard().with_max_attempts(settings.max_retries.saturating_add(1));
        let mut sdk_config_builder =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(retry);

        if let Some(region) = &settings.region {
            sdk_config_builder = sdk_config_builder.region(aws_config::Region::new(region.clone()));
        }

        // Static keys take precedence over the default chain
        if let (Some(access_key), Some(secret_key)) = (&settings.access_key, &settings.secret_key) {
            let credentials = aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None, // session token
                None, // expiry
                "culler-config",
            );
            sdk_config_builder = sdk_config_builder.credentials_provider(credentials);
        }

        debug!("Creating AWS session");
        let sdk_config = sdk_config_builder.load().await;
        if sdk_config.region().is_none() {
            return Err(ProviderError::new(
                ProviderOperation::Connect,
                "no region configured; set `region` or AWS_REGION",
            ));
        }

        let mut ec2_config_builder = aws_sdk_ec2::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            ec2_config_builder = ec2_config_builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(ec2_config_builder.build()),
        })
    }
}

fn provider_error<E>(operation: ProviderOperation, err: &E) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let error = ProviderError::new(operation, DisplayErrorContext(err).to_string());
    match err.code() {
        Some(code) => error.with_code(code),
        None => error,
    }
}

/// Map an SDK image to a descriptor. Images without an id are dropped.
pub(crate) fn descriptor_from_sdk(image: &Image) -> Option<ImageDescriptor> {
    let Some(image_id) = image.image_id() else {
        warn!("describe_images returned an image without an id; skipping");
        return None;
    };
    let mut descriptor = ImageDescriptor::new(
        ImageId::new(image_id),
        image.creation_date().unwrap_or_default(),
    );

    for mapping in image.block_device_mappings() {
        // ebs が無いのは ephemeral（インスタンスストア）
        let snapshot = mapping
            .ebs()
            .and_then(|ebs| ebs.snapshot_id())
            .map(SnapshotId::new);
        descriptor = descriptor.with_device(BlockDevice {
            device_name: mapping.device_name().map(str::to_string),
            snapshot,
        });
    }
    Some(descriptor)
}

#[async_trait]
impl ImageCatalog for Ec2Catalog {
    async fn describe_images(
        &self,
        filter: &TagFilter,
        next_token: Option<&str>,
    ) -> Result<ImagePage, ProviderError> {
        let output = self
            .client
            .describe_images()
            .filters(
                Filter::builder()
                    .name(filter.filter_name())
                    .values(filter.value.clone())
                    .build(),
            )
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| provider_error(ProviderOperation::DescribeImages, &e))?;

        let images = output
            .images()
            .iter()
            .filter_map(descriptor_from_sdk)
            .collect();

        Ok(ImagePage {
            images,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn deregister_image(&self, image: &ImageId) -> Result<(), ProviderError> {
        self.client
            .deregister_image()
            .image_id(image.as_str())
            .send()
            .await
            .map_err(|e| provider_error(ProviderOperation::DeregisterImage, &e))?;
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> Result<(), ProviderError> {
        self.client
            .delete_snapshot()
            .snapshot_id(snapshot.as_str())
            .send()
            .await
            .map_err(|e| provider_error(ProviderOperation::DeleteSnapshot, &e))?;
        Ok(())
    }
}

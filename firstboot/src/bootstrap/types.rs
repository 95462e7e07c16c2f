//! Type definitions for the bootstrap pipeline.

use crate::config::{BootstrapConfig, SslVerifyMode};
use crate::credential::WriteResult;
use crate::identity::{NodeIdentity, UserPayload};
use crate::metadata::{InstanceMetadata, MetadataSource};
use crate::pipeline::PipelineMetrics;
use chrono::{DateTime, Utc};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::Serialize;
use std::path::PathBuf;

/// What happened to the validation credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOutcome {
    Written,
    AlreadyPresent,
    /// The client key exists, so the node is registered and needs no
    /// validation credential.
    ClientKeyPresent,
    /// User-data carried no validation key.
    NotProvided,
}

impl From<WriteResult> for CredentialOutcome {
    fn from(result: WriteResult) -> Self {
        match result {
            WriteResult::Written => CredentialOutcome::Written,
            WriteResult::AlreadyPresent => CredentialOutcome::AlreadyPresent,
        }
    }
}

/// What happened to the JSON attributes file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributesOutcome {
    Written,
    AlreadyPresent,
    NotProvided,
}

impl From<WriteResult> for AttributesOutcome {
    fn from(result: WriteResult) -> Self {
        match result {
            WriteResult::Written => AttributesOutcome::Written,
            WriteResult::AlreadyPresent => AttributesOutcome::AlreadyPresent,
        }
    }
}

/// Settings handed to the configuration client after bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSettings {
    pub node_name: String,
    pub chef_server_url: String,
    pub validation_client_name: String,
    pub validation_key: PathBuf,
    pub client_key: PathBuf,
    pub file_cache_path: PathBuf,
    pub pid_file: PathBuf,
    pub log_level: String,
    pub ssl_verify_mode: SslVerifyMode,
    /// Attributes file, set only when it exists.
    pub json_attribs: Option<PathBuf>,
}

impl ClientSettings {
    pub fn new(config: &BootstrapConfig, identity: &NodeIdentity) -> Self {
        let attributes = &config.paths.client_config_file;
        Self {
            node_name: identity.name.clone(),
            chef_server_url: identity.server_url.clone(),
            validation_client_name: identity.validation_client_name.clone(),
            validation_key: config.paths.validation_key.clone(),
            client_key: config.paths.client_key.clone(),
            file_cache_path: config.paths.file_cache_path.clone(),
            pid_file: config.paths.pid_file.clone(),
            log_level: config.log.level.clone(),
            ssl_verify_mode: config.ssl_verify_mode,
            json_attribs: attributes.is_file().then(|| attributes.clone()),
        }
    }
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub metadata_source: String,
    pub instance_id: String,
    pub launch_index: Option<u32>,
    /// Whether usable user-data was found.
    pub payload_present: bool,
    pub identity: NodeIdentity,
    pub client: ClientSettings,
    pub validation_key: CredentialOutcome,
    pub attributes: AttributesOutcome,
    pub metrics: PipelineMetrics,
    pub completed_at: DateTime<Utc>,
}

/// Shared bootstrap pipeline context.
///
/// Inputs are borrowed; each task fills in its output slot.
pub struct BootstrapContext<'a> {
    pub config: &'a BootstrapConfig,
    pub source: &'a dyn MetadataSource,
    pub metadata: Option<InstanceMetadata>,
    pub payload: Option<UserPayload>,
    pub identity: Option<NodeIdentity>,
    pub validation_key: Option<CredentialOutcome>,
    pub attributes: Option<AttributesOutcome>,
}

impl<'a> BootstrapContext<'a> {
    pub fn new(config: &'a BootstrapConfig, source: &'a dyn MetadataSource) -> Self {
        Self {
            config,
            source,
            metadata: None,
            payload: None,
            identity: None,
            validation_key: None,
            attributes: None,
        }
    }

    pub fn metadata(&self) -> FirstbootResult<&InstanceMetadata> {
        self.metadata
            .as_ref()
            .ok_or_else(|| FirstbootError::Internal("fetch_metadata task must run first".into()))
    }

    pub fn identity(&self) -> FirstbootResult<&NodeIdentity> {
        self.identity
            .as_ref()
            .ok_or_else(|| FirstbootError::Internal("resolve_identity task must run first".into()))
    }

    pub fn into_report(self, metrics: PipelineMetrics) -> FirstbootResult<BootstrapReport> {
        let metadata = self.metadata()?.clone();
        let identity = self.identity()?.clone();
        let validation_key = self.validation_key.ok_or_else(|| {
            FirstbootError::Internal("validation_key task did not record an outcome".into())
        })?;
        let attributes = self.attributes.ok_or_else(|| {
            FirstbootError::Internal("attributes task did not record an outcome".into())
        })?;

        Ok(BootstrapReport {
            metadata_source: self.source.describe(),
            instance_id: metadata.instance_id,
            launch_index: metadata.launch_index,
            payload_present: self.payload.is_some(),
            client: ClientSettings::new(self.config, &identity),
            identity,
            validation_key,
            attributes,
            metrics,
            completed_at: Utc::now(),
        })
    }
}

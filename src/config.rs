use std::env::VarError;

use anyhow::{Context, Result};

pub const PROJECT_ID_VAR: &str = "TRANSFER_PROJECT_ID";
pub const REGION_VAR: &str = "TRANSFER_REGION";
pub const CONFIG_ID_VAR: &str = "TRANSFER_CONFIG_ID";

/// Identifies the transfer configuration to run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferConfig {
    pub project_id: String,
    pub region: String,
    pub config_id: String,
}

impl TransferConfig {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        config_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            config_id: config_id.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Result<String, VarError>) -> Result<Self> {
        let var = |name: &str| lookup(name).with_context(|| format!("{name} env var not set"));

        Ok(Self::new(
            var(PROJECT_ID_VAR)?,
            var(REGION_VAR)?,
            var(CONFIG_ID_VAR)?,
        ))
    }

    pub fn resource_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/transferConfigs/{}",
            self.project_id, self.region, self.config_id
        )
    }
}

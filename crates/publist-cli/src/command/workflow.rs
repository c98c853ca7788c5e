//! Commands acting on an explicit list of resources.

use anyhow::Context;
use clap::Args;
use publist_engine::service::{PublishService, WorkflowResponse};

use crate::TRACING_TARGET_COMMAND;
use crate::workspace::Workspace;

/// Resources given by structure id or root path.
#[derive(Debug, Clone, Args)]
pub struct ResourcesArgs {
    /// Structure ids or root paths.
    #[arg(required = true)]
    pub resources: Vec<String>,
}

/// Arguments of the `publish` command.
#[derive(Debug, Clone, Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub resources: ResourcesArgs,

    /// Publish even if links would break.
    #[arg(long)]
    pub force: bool,
}

impl ResourcesArgs {
    /// Reports the links publishing the resources would break.
    pub fn validate(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ids = workspace.resolve_all(&self.resources)?;
        let broken = service
            .validate(workspace.context(), &ids)
            .context("failed to validate links")?;
        Ok(serde_json::to_string_pretty(&broken)?)
    }

    /// Removes the resources from the user's publish list.
    pub fn remove(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ids = workspace.resolve_all(&self.resources)?;
        service
            .remove_resources(workspace.context(), &ids)
            .context("failed to remove resources from the publish list")?;
        Ok(serde_json::to_string_pretty(&serde_json::json!({ "removed": ids }))?)
    }
}

impl PublishArgs {
    pub fn execute(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ids = workspace.resolve_all(&self.resources.resources)?;
        let response = service
            .publish(workspace.context(), &ids, self.force)
            .context("failed to publish")?;

        match &response {
            WorkflowResponse::Published { job_id, resources } => tracing::info!(
                target: TRACING_TARGET_COMMAND,
                job_id = %job_id,
                resources,
                "publish job started"
            ),
            WorkflowResponse::Rejected { .. } => tracing::warn!(
                target: TRACING_TARGET_COMMAND,
                force = self.force,
                "publish rejected"
            ),
        }
        Ok(serde_json::to_string_pretty(&response)?)
    }
}

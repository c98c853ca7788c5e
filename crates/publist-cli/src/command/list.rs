//! Publish list and project selector commands.

use anyhow::Context;
use clap::Args;
use jiff::Timestamp;
use publist_engine::service::PublishService;

use super::options::OptionsArgs;
use crate::workspace::Workspace;

/// Arguments of the `projects` command.
#[derive(Debug, Clone, Args)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub options: OptionsArgs,
}

impl ProjectsArgs {
    pub fn execute(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ctx = workspace.context();
        let options = self.options.apply(service.initial_options(ctx));
        let projects = service
            .projects(ctx, &options)
            .context("failed to list projects")?;
        Ok(serde_json::to_string_pretty(&projects)?)
    }
}

/// Arguments of the `groups` command.
#[derive(Debug, Clone, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub options: OptionsArgs,

    /// Reference time for age classification (RFC 3339); defaults to now.
    #[arg(long)]
    pub now: Option<Timestamp>,
}

impl GroupsArgs {
    pub fn execute(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ctx = workspace.context();
        let options = self.options.apply(service.initial_options(ctx));
        let now = self.now.unwrap_or_else(Timestamp::now);
        let list = service
            .publish_list_at(ctx, &options, now)
            .context("failed to compute publish list")?;
        Ok(serde_json::to_string_pretty(&list)?)
    }
}

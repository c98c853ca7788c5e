//! The `relations` command.

use anyhow::Context;
use clap::Args;
use petgraph::dot::{Config, Dot};
use publist_core::types::{ResourceId, ResourceState};
use publist_engine::relation::RelatedResources;
use publist_engine::service::PublishService;
use serde::Serialize;

use super::options::OptionsArgs;
use crate::workspace::Workspace;

/// Arguments of the `relations` command.
#[derive(Debug, Clone, Args)]
pub struct RelationsArgs {
    #[command(flatten)]
    pub options: OptionsArgs,

    /// Print the relation graph in Graphviz DOT format instead of JSON.
    #[arg(long)]
    pub dot: bool,
}

#[derive(Debug, Serialize)]
struct Entry<'a> {
    id: ResourceId,
    path: &'a str,
    state: ResourceState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    related: Vec<Entry<'a>>,
}

impl RelationsArgs {
    pub fn execute(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        let ctx = workspace.context();
        let options = self.options.apply(service.initial_options(ctx));
        let related = service
            .related_resources(ctx, &options)
            .context("failed to compute related resources")?;

        if self.dot {
            let graph = related.map().to_graph();
            return Ok(format!("{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel])));
        }
        Ok(serde_json::to_string_pretty(&entries(&related))?)
    }
}

fn entries(related: &RelatedResources) -> Vec<Entry<'_>> {
    related
        .top_level()
        .map(|resource| Entry {
            id: resource.structure_id,
            path: &resource.root_path,
            state: resource.state,
            related: related
                .related(&resource.structure_id)
                .into_iter()
                .map(|nested| Entry {
                    id: nested.structure_id,
                    path: &nested.root_path,
                    state: nested.state,
                    related: Vec::new(),
                })
                .collect(),
        })
        .collect()
}

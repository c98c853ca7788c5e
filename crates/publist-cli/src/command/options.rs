//! Publish dialog options shared by the list commands.

use clap::Args;
use publist_core::types::{ProjectId, PublishOptions};

/// Selects and expands the publish list.
#[derive(Debug, Clone, Default, Args)]
pub struct OptionsArgs {
    /// Real or virtual project to publish; the user's publish list when omitted.
    #[arg(long)]
    pub project: Option<ProjectId>,

    /// Add modified siblings of each resource.
    #[arg(long)]
    pub siblings: bool,

    /// Do not add the resources the publish list depends on.
    #[arg(long)]
    pub no_related: bool,

    /// Virtual project parameter as `key=value`, repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

impl OptionsArgs {
    /// Applies the arguments on top of the options a session last used.
    pub fn apply(&self, mut options: PublishOptions) -> PublishOptions {
        if let Some(project) = self.project {
            options = options.with_project(project);
        }
        if self.siblings {
            options = options.with_siblings(true);
        }
        if self.no_related {
            options = options.with_related(false);
        }
        for (key, value) in &self.params {
            options = options.with_param(key.as_str(), value.as_str());
        }
        options
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

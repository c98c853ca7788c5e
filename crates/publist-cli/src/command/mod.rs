//! Subcommands.
//!
//! Every command prints JSON on stdout, except `relations --dot`.

mod list;
mod options;
mod relations;
mod workflow;

use clap::Subcommand;
pub use list::{GroupsArgs, ProjectsArgs};
use publist_engine::service::PublishService;
pub use relations::RelationsArgs;
pub use workflow::{PublishArgs, ResourcesArgs};

use crate::TRACING_TARGET_COMMAND;
use crate::workspace::Workspace;

/// Publish dialog operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the projects the user can publish.
    Projects(ProjectsArgs),
    /// Compute the grouped publish list.
    Groups(GroupsArgs),
    /// Show the related resources the publish list carries.
    Relations(RelationsArgs),
    /// Report links that publishing the resources would break.
    Validate(ResourcesArgs),
    /// Publish resources.
    Publish(PublishArgs),
    /// Remove resources from the user's publish list.
    Remove(ResourcesArgs),
}

impl Command {
    /// Returns the command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Projects(_) => "projects",
            Self::Groups(_) => "groups",
            Self::Relations(_) => "relations",
            Self::Validate(_) => "validate",
            Self::Publish(_) => "publish",
            Self::Remove(_) => "remove",
        }
    }

    /// Runs the command and returns its output.
    pub fn execute(
        &self,
        service: &PublishService,
        workspace: &Workspace,
    ) -> anyhow::Result<String> {
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            command = self.name(),
            user = %workspace.context().user_name,
            "executing command"
        );

        match self {
            Self::Projects(args) => args.execute(service, workspace),
            Self::Groups(args) => args.execute(service, workspace),
            Self::Relations(args) => args.execute(service, workspace),
            Self::Validate(args) => args.validate(service, workspace),
            Self::Publish(args) => args.execute(service, workspace),
            Self::Remove(args) => args.remove(service, workspace),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use serde_json::Value;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::Cli;

    const SNAPSHOT: &str = r#"{
        "users": [
            { "id": "0192f0c4-0000-7000-8000-000000000001", "name": "editor" },
            { "id": "0192f0c4-0000-7000-8000-000000000002", "name": "other" }
        ],
        "projects": [{
            "id": "0192f0c4-0000-7000-8000-0000000000aa",
            "name": "Offline",
            "managers": ["0192f0c4-0000-7000-8000-000000000001"]
        }],
        "resources": [
            {
                "structure_id": "0192f0c4-0000-7000-8000-000000000010",
                "root_path": "/",
                "type_name": "folder",
                "kind": "folder",
                "date_last_modified": "2026-01-01T00:00:00Z",
                "user_last_modified": "0192f0c4-0000-7000-8000-000000000001",
                "project_last_modified": "0192f0c4-0000-7000-8000-0000000000aa"
            },
            {
                "structure_id": "0192f0c4-0000-7000-8000-000000000011",
                "root_path": "/index.html",
                "type_name": "containerpage",
                "state": "changed",
                "date_last_modified": "2026-10-18T08:00:00Z",
                "user_last_modified": "0192f0c4-0000-7000-8000-000000000001",
                "project_last_modified": "0192f0c4-0000-7000-8000-0000000000aa"
            },
            {
                "structure_id": "0192f0c4-0000-7000-8000-000000000012",
                "root_path": "/article.xml",
                "type_name": "article",
                "state": "new",
                "date_last_modified": "2026-10-18T07:30:00Z",
                "user_last_modified": "0192f0c4-0000-7000-8000-000000000001",
                "project_last_modified": "0192f0c4-0000-7000-8000-0000000000aa"
            },
            {
                "structure_id": "0192f0c4-0000-7000-8000-000000000013",
                "root_path": "/news.html",
                "type_name": "plain",
                "state": "changed",
                "date_last_modified": "2026-10-01T09:00:00Z",
                "user_last_modified": "0192f0c4-0000-7000-8000-000000000001",
                "project_last_modified": "0192f0c4-0000-7000-8000-0000000000aa"
            }
        ],
        "relations": [{
            "source_id": "0192f0c4-0000-7000-8000-000000000011",
            "target_id": "0192f0c4-0000-7000-8000-000000000012",
            "target_path": "/article.xml",
            "type": "xml_strong"
        }],
        "locks": [{
            "resource_id": "0192f0c4-0000-7000-8000-000000000013",
            "owner": "0192f0c4-0000-7000-8000-000000000002"
        }],
        "publishLists": [{
            "user_id": "0192f0c4-0000-7000-8000-000000000001",
            "resources": [
                "0192f0c4-0000-7000-8000-000000000011",
                "0192f0c4-0000-7000-8000-000000000013"
            ]
        }]
    }"#;

    const INDEX: &str = "0192f0c4-0000-7000-8000-000000000011";
    const ARTICLE: &str = "0192f0c4-0000-7000-8000-000000000012";

    fn snapshot_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        file
    }

    fn run(args: &[&str]) -> String {
        let file = snapshot_file();
        let path = file.path().to_str().unwrap().to_owned();
        let mut argv = vec![
            "publist",
            "--snapshot",
            path.as_str(),
            "--user",
            "editor",
            "--time-zone",
            "UTC",
        ];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).unwrap();
        cli.validate().unwrap();
        let workspace = Workspace::load(&cli.repository).unwrap();
        let service = PublishService::new(workspace.repository(), cli.publish.clone()).unwrap();
        cli.command.execute(&service, &workspace).unwrap()
    }

    fn run_json(args: &[&str]) -> Value {
        serde_json::from_str(&run(args)).unwrap()
    }

    #[test]
    fn groups_the_user_publish_list() {
        let list = run_json(&["groups", "--now", "2026-10-18T12:00:00Z"]);
        let groups = list["groups"].as_array().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Session starting 2026-10-18 08:00", "Changes of 2026-10-01"]);
        assert_eq!(list["tooManyResources"], false);

        let index = &groups[0]["resources"][0];
        assert_eq!(index["id"], INDEX);
        assert_eq!(index["related"][0]["id"], ARTICLE);

        let news = &groups[1]["resources"][0];
        assert_eq!(news["info"]["type"], "LOCKED");
    }

    #[test]
    fn lists_real_then_virtual_projects() {
        let projects = run_json(&["projects"]);
        let names: Vec<&str> = projects
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.first(), Some(&"Offline"));
        assert!(names.contains(&"My changes"));
    }

    #[test]
    fn prints_relation_graph() {
        let entries = run_json(&["relations"]);
        let index = entries
            .as_array()
            .unwrap()
            .iter()
            .find(|entry| entry["id"] == INDEX)
            .unwrap();
        assert_eq!(index["related"][0]["path"], "/article.xml");

        let dot = run(&["relations", "--dot"]);
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains(ARTICLE));
    }

    #[test]
    fn publish_requires_new_link_targets_unless_forced() {
        let rejected = run_json(&["publish", "/index.html"]);
        assert_eq!(rejected["status"], "rejected");
        assert_eq!(rejected["brokenLinks"][0]["related"][0]["id"], ARTICLE);

        let published = run_json(&["publish", "--force", "/index.html"]);
        assert_eq!(published["status"], "published");
        assert_eq!(published["resources"], 1);
    }

    #[test]
    fn validate_accepts_ids_and_paths() {
        let broken = run_json(&["validate", INDEX]);
        assert_eq!(broken.as_array().unwrap().len(), 1);

        let fine = run_json(&["validate", "/index.html", ARTICLE]);
        assert!(fine.as_array().unwrap().is_empty());
    }

    #[test]
    fn removes_resources_from_the_publish_list() {
        let removed = run_json(&["remove", "/news.html"]);
        assert_eq!(removed["removed"][0], "0192f0c4-0000-7000-8000-000000000013");
    }

    #[test]
    fn rejects_unknown_user() {
        let file = snapshot_file();
        let path = file.path().to_str().unwrap();
        let cli =
            Cli::try_parse_from(["publist", "--snapshot", path, "--user", "nobody", "projects"])
                .unwrap();
        assert!(Workspace::load(&cli.repository).is_err());
    }
}

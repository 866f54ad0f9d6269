//! Command dispatch onto the menu tree service

use serde_json::{json, Value};
use tracing::info;

use admin_core::tree::PresentOptions;
use admin_infrastructure::AdminRuntime;

use crate::cli::Command;
use crate::response::CliError;

pub async fn run(runtime: &AdminRuntime, command: Command) -> Result<Value, CliError> {
    let service = &runtime.service;

    let data = match command {
        Command::Migrate => {
            runtime.migrate().await?;
            json!({ "migrated": true })
        }
        Command::Reindex => {
            let rows = runtime.rebuild_closure().await?;
            json!({ "closureRows": rows })
        }
        Command::Check => serde_json::to_value(service.check_integrity().await?)?,
        Command::Tree {
            role,
            editable,
            checkable,
        } => {
            let options = PresentOptions {
                editable,
                checkable,
            };
            serde_json::to_value(service.menu_tree(role, options).await?)?
        }
        Command::Granted { role } => serde_json::to_value(service.granted_tree(role).await?)?,
        Command::Codes { role } => serde_json::to_value(service.granted_codes(role).await?)?,
        Command::Create(args) => serde_json::to_value(service.create_menu(args.into()).await?)?,
        Command::Update(args) => {
            let (id, patch) = args.into_patch();
            serde_json::to_value(service.update_menu(id, patch).await?)?
        }
        Command::Delete { id, cascade } => {
            let removed = service.delete_menu(id, cascade).await?;
            json!({ "removed": removed })
        }
        Command::Grant { role, menu_ids } => {
            serde_json::to_value(service.save_role_permissions(role, menu_ids).await?)?
        }
    };

    info!(storage = ?runtime.storage(), strategy = ?runtime.strategy, "Command completed");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use admin_core::domain::{MenuId, MenuType, NewMenuNode};
    use admin_infrastructure::in_memory;
    use admin_shared::{CodeScope, TreeStrategy};
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("menu-admin").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[tokio::test]
    async fn test_create_then_tree() {
        let runtime = in_memory(TreeStrategy::Adjacency, CodeScope::Global);

        let created = run(&runtime, command(&["create", "--label", "System", "--type", "catalog"]))
            .await
            .unwrap();
        assert_eq!(created["id"], 1);

        run(
            &runtime,
            command(&["create", "--label", "Users", "--parent", "1", "--path", "/users"]),
        )
        .await
        .unwrap();

        let tree = run(&runtime, command(&["tree", "--editable"])).await.unwrap();
        assert_eq!(tree[0]["label"], "System");
        assert_eq!(tree[0]["editable"], true);
        assert_eq!(tree[0]["children"][0]["path"], "/users");
    }

    #[tokio::test]
    async fn test_cycle_surfaces_as_cli_error() {
        let runtime = in_memory(TreeStrategy::Closure, CodeScope::Global);
        let service = &runtime.service;
        let root = service
            .create_menu(NewMenuNode::new("Root", MenuType::Catalog))
            .await
            .unwrap();
        service
            .create_menu(NewMenuNode {
                parent_id: Some(root.id),
                ..NewMenuNode::new("Child", MenuType::Catalog)
            })
            .await
            .unwrap();

        let err = run(&runtime, command(&["update", "1", "--parent", "2"]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CYCLE_ERROR");

        let err = run(&runtime, command(&["delete", "1"])).await.unwrap_err();
        assert_eq!(err.code(), "HAS_CHILDREN");

        let removed = run(&runtime, command(&["delete", "1", "--cascade"]))
            .await
            .unwrap();
        assert_eq!(removed["removed"], json!([MenuId(1), MenuId(2)]));
    }

    #[tokio::test]
    async fn test_migrate_needs_postgres() {
        let runtime = in_memory(TreeStrategy::Adjacency, CodeScope::Global);
        let err = run(&runtime, Command::Migrate).await.unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED");
    }
}

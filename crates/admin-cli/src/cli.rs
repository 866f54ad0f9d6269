//! Command-line surface

use clap::{Args, Parser, Subcommand};

use admin_core::domain::{MenuId, MenuPatch, MenuType, NewMenuNode, RoleId};

#[derive(Parser, Debug)]
#[command(name = "menu-admin")]
#[command(about = "Manage the admin menu tree and role menu permissions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Rebuild the closure index from parent links
    Reindex,
    /// Report structural problems in the stored tree
    Check,
    /// Print the full menu tree, optionally with a role's selection
    Tree {
        /// Role whose granted menus are marked checked
        #[arg(long)]
        role: Option<RoleId>,
        /// Mark rows editable
        #[arg(long)]
        editable: bool,
        /// Render selection checkboxes
        #[arg(long)]
        checkable: bool,
    },
    /// Print only the branches a role can reach
    Granted {
        #[arg(long)]
        role: RoleId,
    },
    /// Print the permission codes granted to a role
    Codes {
        #[arg(long)]
        role: RoleId,
    },
    /// Create a menu node
    Create(CreateArgs),
    /// Change fields of a menu node or move it
    Update(UpdateArgs),
    /// Delete a menu node
    Delete {
        id: MenuId,
        /// Also delete every descendant
        #[arg(long)]
        cascade: bool,
    },
    /// Replace a role's granted menus
    Grant {
        #[arg(long)]
        role: RoleId,
        /// Menu ids to grant; none clears the role
        menu_ids: Vec<MenuId>,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub label: String,
    /// catalog, menu or button
    #[arg(long = "type", default_value = "menu")]
    pub menu_type: MenuType,
    #[arg(long)]
    pub parent: Option<MenuId>,
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long)]
    pub component: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub sort_order: Option<i32>,
}

impl From<CreateArgs> for NewMenuNode {
    fn from(args: CreateArgs) -> Self {
        NewMenuNode {
            parent_id: args.parent,
            menu_type: args.menu_type,
            label: args.label,
            path: args.path,
            component: args.component,
            icon: args.icon,
            code: args.code,
            sort_order: args.sort_order,
        }
    }
}

/// Optional text flags take an empty string to clear the field.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: MenuId,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long = "type")]
    pub menu_type: Option<MenuType>,
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<MenuId>,
    /// Move the node to the top level
    #[arg(long)]
    pub root: bool,
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long)]
    pub component: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long, conflicts_with = "clear_sort_order")]
    pub sort_order: Option<i32>,
    #[arg(long)]
    pub clear_sort_order: bool,
}

impl UpdateArgs {
    pub fn into_patch(self) -> (MenuId, MenuPatch) {
        let parent_id = match (self.parent, self.root) {
            (Some(parent), _) => Some(Some(parent)),
            (None, true) => Some(None),
            (None, false) => None,
        };
        let sort_order = match (self.sort_order, self.clear_sort_order) {
            (Some(order), _) => Some(Some(order)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        let patch = MenuPatch {
            label: self.label,
            parent_id,
            menu_type: self.menu_type,
            path: self.path.map(Some),
            component: self.component.map(Some),
            icon: self.icon.map(Some),
            code: self.code.map(Some),
            sort_order,
        };
        (self.id, patch.normalized())
    }
}

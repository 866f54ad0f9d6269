// ============================================================================
// Admin Core - Menu Node Entity
// File: crates/admin-core/src/domain/menu.rs
// Description: Flat menu record, create input, and partial update
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage-assigned menu identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuId(pub i64);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MenuId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for MenuId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Discriminator deciding which optional fields a node needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    /// Grouping folder in the navigation, no route of its own.
    Catalog,
    #[default]
    Menu,
    /// Operation inside a page; only its permission code matters.
    Button,
}

impl MenuType {
    pub const fn as_db_value(self) -> &'static str {
        match self {
            MenuType::Catalog => "catalog",
            MenuType::Menu => "menu",
            MenuType::Button => "button",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "catalog" => Some(MenuType::Catalog),
            "menu" => Some(MenuType::Menu),
            "button" => Some(MenuType::Button),
            _ => None,
        }
    }
}

impl FromStr for MenuType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_value(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown menu type: {}", s))
    }
}

/// One navigation/permission entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: MenuId,
    pub parent_id: Option<MenuId>,
    pub menu_type: MenuType,
    pub label: String,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub code: Option<String>,
    pub sort_order: Option<i32>,
}

impl MenuNode {
    pub fn from_new(id: MenuId, input: NewMenuNode) -> Self {
        Self {
            id,
            parent_id: input.parent_id,
            menu_type: input.menu_type,
            label: input.label,
            path: input.path,
            component: input.component,
            icon: input.icon,
            code: input.code,
            sort_order: input.sort_order,
        }
    }

    /// Returns a copy with `patch` applied; `self` is left untouched.
    pub fn patched(&self, patch: &MenuPatch) -> Self {
        let patch = patch.clone().normalized();
        let mut next = self.clone();
        if let Some(label) = patch.label {
            next.label = label;
        }
        if let Some(parent_id) = patch.parent_id {
            next.parent_id = parent_id;
        }
        if let Some(menu_type) = patch.menu_type {
            next.menu_type = menu_type;
        }
        if let Some(path) = patch.path {
            next.path = path;
        }
        if let Some(component) = patch.component {
            next.component = component;
        }
        if let Some(icon) = patch.icon {
            next.icon = icon;
        }
        if let Some(code) = patch.code {
            next.code = code;
        }
        if let Some(sort_order) = patch.sort_order {
            next.sort_order = sort_order;
        }
        next
    }
}

/// Create input for a menu node; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuNode {
    pub parent_id: Option<MenuId>,
    #[serde(rename = "type", default)]
    pub menu_type: MenuType,
    pub label: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl NewMenuNode {
    pub fn new(label: impl Into<String>, menu_type: MenuType) -> Self {
        Self {
            label: label.into(),
            menu_type,
            ..Self::default()
        }
    }

    /// Trims text fields and drops blank optional strings.
    pub fn normalized(self) -> Self {
        Self {
            label: self.label.trim().to_string(),
            path: clean(self.path),
            component: clean(self.component),
            icon: clean(self.icon),
            code: clean(self.code),
            ..self
        }
    }
}

/// Partial update. The outer `Option` means "leave unchanged"; for nullable
/// fields the inner `Option` is the new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuPatch {
    pub label: Option<String>,
    pub parent_id: Option<Option<MenuId>>,
    pub menu_type: Option<MenuType>,
    pub path: Option<Option<String>>,
    pub component: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub code: Option<Option<String>>,
    pub sort_order: Option<Option<i32>>,
}

impl MenuPatch {
    pub fn reparent(parent_id: Option<MenuId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn normalized(self) -> Self {
        Self {
            label: self.label.map(|l| l.trim().to_string()),
            path: self.path.map(clean),
            component: self.component.map(clean),
            icon: self.icon.map(clean),
            code: self.code.map(clean),
            ..self
        }
    }

    /// New parent if this patch moves `node`, `None` when the parent stays.
    pub fn moves(&self, node: &MenuNode) -> Option<Option<MenuId>> {
        match self.parent_id {
            Some(parent_id) if parent_id != node.parent_id => Some(parent_id),
            _ => None,
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//! Navigation menu
//!
//! Responsible for:
//! - The menu data model (leaves, nodes, icons)
//! - Deriving the menu from (chain, account, feature table, catalog)
//! - Memoizing the derivation so unchanged inputs return the same `Arc`

mod builder;

pub use builder::{build_menu, MenuBuilder};

use serde::Serialize;

/// Icon hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    SwitchVertical,
    /// Same glyph turned 90 degrees
    SwitchVerticalRotated,
    Rocket,
    Globe,
    TrendingUp,
    Wallet,
}

/// Entry without children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuLeaf {
    pub key: String,
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// Entry grouping an ordered list of leaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub key: String,
    pub title: String,
    pub items: Vec<MenuLeaf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MenuItem {
    Leaf(MenuLeaf),
    Node(MenuNode),
}

/// Order is significant and fixed by construction
pub type Menu = Vec<MenuItem>;

impl MenuLeaf {
    pub fn new(key: &str, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self { key: key.to_string(), title: title.into(), link: link.into(), icon: None }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl MenuNode {
    pub fn new(key: &str, title: impl Into<String>, icon: Icon, items: Vec<MenuLeaf>) -> Self {
        Self { key: key.to_string(), title: title.into(), items, icon: Some(icon) }
    }
}

impl MenuItem {
    pub fn key(&self) -> &str {
        match self {
            MenuItem::Leaf(leaf) => &leaf.key,
            MenuItem::Node(node) => &node.key,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MenuItem::Leaf(leaf) => &leaf.title,
            MenuItem::Node(node) => &node.title,
        }
    }

    pub fn icon(&self) -> Option<Icon> {
        match self {
            MenuItem::Leaf(leaf) => leaf.icon,
            MenuItem::Node(node) => node.icon,
        }
    }

    /// Children of a node, empty for a leaf
    pub fn items(&self) -> &[MenuLeaf] {
        match self {
            MenuItem::Leaf(_) => &[],
            MenuItem::Node(node) => &node.items,
        }
    }

    /// Nothing to render: a keyless entry or a node without children
    pub fn is_empty(&self) -> bool {
        match self {
            MenuItem::Leaf(leaf) => leaf.key.is_empty(),
            MenuItem::Node(node) => node.key.is_empty() || node.items.is_empty(),
        }
    }
}

impl From<MenuLeaf> for MenuItem {
    fn from(leaf: MenuLeaf) -> Self {
        MenuItem::Leaf(leaf)
    }
}

impl From<MenuNode> for MenuItem {
    fn from(node: MenuNode) -> Self {
        MenuItem::Node(node)
    }
}

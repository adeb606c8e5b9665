//! Admin menu tree

use crate::domain::permission::PermissionRule;

/// A node in the admin menu tree.
///
/// A menu tied to a resource is represented by that resource when group
/// permissions are enumerated; only nodes without an associated resource
/// appear in the catalog under their own name.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    pub name: String,
    pub invisible: bool,
    /// Name of the resource this menu opens, if any
    pub associated_resource: Option<String>,
    pub permission: Option<PermissionRule>,
    pub children: Vec<Menu>,
}

impl Menu {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.associated_resource = Some(resource.into());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.invisible = true;
        self
    }

    pub fn with_child(mut self, child: Menu) -> Self {
        self.children.push(child);
        self
    }

    /// This node and all its descendants, preorder
    pub fn self_tree(&self) -> Vec<&Menu> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.self_tree());
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_tree_preorder() {
        let menu = Menu::new("Shop")
            .with_child(Menu::new("Orders").with_child(Menu::new("Returns")))
            .with_child(Menu::new("Reports"));

        let names: Vec<&str> = menu.self_tree().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Shop", "Orders", "Returns", "Reports"]);
    }

    #[test]
    fn test_leaf_tree_is_self() {
        let menu = Menu::new("Dashboard");
        assert_eq!(menu.self_tree().len(), 1);
    }
}

//! Resource catalog: the canonical enumeration groups can grant against

use crate::domain::{Group, ResourceActionPermission, ResourcePermission};
use crate::registry::Admin;

/// Collect the resources, actions and stand-alone menus registered in the
/// admin, as `[resource_name, action1, action2, ...]` entries in
/// registration order.
///
/// Resources and actions flagged invisible or exempt from group control
/// are omitted: group permissions cannot be granted or denied for them,
/// they simply bypass the group tier. Menu nodes tied to a resource are
/// represented by that resource's entry instead of their own.
pub fn gen_resource_list(admin: &Admin) -> Vec<Vec<String>> {
    let mut available = Vec::new();

    for resource in admin.resources() {
        if resource.skip_group_control || resource.invisible {
            continue;
        }

        let mut entry = vec![resource.name.clone()];
        for action in resource.actions() {
            if action.skip_group_control {
                continue;
            }
            entry.push(action.name.clone());
        }
        available.push(entry);
    }

    for menu in admin.menus() {
        for node in menu.self_tree() {
            if node.invisible {
                continue;
            }
            // Menus belonging to a resource are checked through that
            // resource's permission, not their own entry.
            if node.associated_resource.is_none() {
                available.push(vec![node.name.clone()]);
            }
        }
    }

    available
}

/// Snapshot one group's grants against the full catalog, for editing and
/// for the runtime allow-list check.
pub fn group_permission_snapshot(
    group: &Group,
    resource_list: &[Vec<String>],
) -> Vec<ResourcePermission> {
    resource_list
        .iter()
        .filter_map(|entry| {
            let (resource_name, action_names) = entry.split_first()?;
            let actions = action_names
                .iter()
                .map(|action| ResourceActionPermission {
                    name: action.clone(),
                    allowed: group.has_resource_action_permission(resource_name, action),
                })
                .collect();
            Some(ResourcePermission {
                name: resource_name.clone(),
                allowed: group.has_resource_permission(resource_name),
                actions,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Menu;
    use crate::registry::{handler_fn, ActionDefinition, AdminBuilder, ResourceConfig};
    use pretty_assertions::assert_eq;

    fn sample_admin() -> Admin {
        let mut builder = AdminBuilder::new();
        builder.add_resource(ResourceConfig::new("Order")).unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Ship").handler(handler_fn(|_| Ok(()))),
            )
            .unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Cancel")
                    .skip_group_control()
                    .handler(handler_fn(|_| Ok(()))),
            )
            .unwrap();
        builder
            .add_resource(ResourceConfig {
                name: "AuditLog".to_string(),
                invisible: true,
                ..Default::default()
            })
            .unwrap();
        builder
            .add_resource(ResourceConfig {
                name: "GroupSelector".to_string(),
                skip_group_control: true,
                ..Default::default()
            })
            .unwrap();
        builder.add_menu(
            Menu::new("Shop")
                .with_child(Menu::new("Orders").with_resource("Order"))
                .with_child(Menu::new("Reports"))
                .with_child(Menu::new("Internal").invisible()),
        );
        builder.seal()
    }

    #[test]
    fn test_exempt_action_is_omitted() {
        let list = gen_resource_list(&sample_admin());
        // Resource "Order" has ["Ship", "Cancel"], "Cancel" is exempt
        assert!(list.contains(&vec!["Order".to_string(), "Ship".to_string()]));
    }

    #[test]
    fn test_invisible_and_exempt_resources_are_omitted() {
        let list = gen_resource_list(&sample_admin());
        assert!(!list.iter().any(|entry| entry[0] == "AuditLog"));
        assert!(!list.iter().any(|entry| entry[0] == "GroupSelector"));
    }

    #[test]
    fn test_menu_entries() {
        let list = gen_resource_list(&sample_admin());
        // Stand-alone visible menus get their own entry
        assert!(list.contains(&vec!["Shop".to_string()]));
        assert!(list.contains(&vec!["Reports".to_string()]));
        // Menus tied to a resource are represented by that resource
        assert!(!list.iter().any(|entry| entry[0] == "Orders"));
        // Invisible nodes are skipped
        assert!(!list.iter().any(|entry| entry[0] == "Internal"));
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let list = gen_resource_list(&sample_admin());
        assert_eq!(
            list,
            vec![
                vec!["Order".to_string(), "Ship".to_string()],
                vec!["Shop".to_string()],
                vec!["Reports".to_string()],
            ]
        );
    }

    #[test]
    fn test_group_permission_snapshot() {
        let admin = sample_admin();
        let list = gen_resource_list(&admin);

        let mut group = Group::new("shipping");
        group.set_action_allowed("Order", "Ship", true);

        let snapshot = group_permission_snapshot(&group, &list);
        let order = snapshot.iter().find(|p| p.name == "Order").unwrap();
        assert!(!order.allowed);
        assert_eq!(order.actions.len(), 1);
        assert_eq!(order.actions[0].name, "Ship");
        assert!(order.actions[0].allowed);

        let shop = snapshot.iter().find(|p| p.name == "Shop").unwrap();
        assert!(shop.actions.is_empty());
    }
}

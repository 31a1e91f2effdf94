use serde_json::json;
use tracing::info;

use crate::auth::permission::Access;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::connect_pool;
use crate::database::repository::{PermissionRepository, RoleRepository};

/// Resources guarded by the router
pub const RESOURCES: [&str; 4] = ["users", "roles", "products", "orders"];

/// Every `view_*` and `edit_*` name for the guarded resources
pub fn permission_vocabulary() -> Vec<String> {
    RESOURCES
        .iter()
        .flat_map(|r| [Access::View.permission_for(r), Access::Edit.permission_for(r)])
        .collect()
}

/// Built-in roles and the permission names each one holds
pub fn default_roles() -> Vec<(&'static str, Vec<String>)> {
    let view_all: Vec<String> = RESOURCES.iter().map(|r| Access::View.permission_for(r)).collect();

    let mut editor = view_all.clone();
    editor.extend(["products", "orders"].iter().map(|r| Access::Edit.permission_for(r)));

    vec![
        ("Admin", permission_vocabulary()),
        ("Editor", editor),
        ("Viewer", view_all),
    ]
}

/// Idempotent: existing permissions are reused and existing roles get their
/// permission set reset to the defaults
pub async fn seed(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect_pool(&config.database)?;
    let permissions = PermissionRepository::new(pool.clone());
    let roles = RoleRepository::new(pool);

    let mut ids = std::collections::HashMap::new();
    for name in permission_vocabulary() {
        let permission = permissions.ensure(&name).await?;
        ids.insert(permission.name, permission.id);
    }

    let mut seeded = Vec::new();
    for (role_name, names) in default_roles() {
        let permission_ids: Vec<i64> = names.iter().filter_map(|n| ids.get(n).copied()).collect();
        let role = match roles.find_by_name(role_name).await? {
            Some(existing) => roles.update(existing.id, role_name, &permission_ids).await?,
            None => roles.create(role_name, &permission_ids).await?,
        };
        info!(role = role_name, role_id = role.id, "seeded role");
        seeded.push(json!({ "id": role.id, "name": role.name, "permissions": names }));
    }

    output_success(
        output_format,
        &format!("Seeded {} permissions and {} roles", ids.len(), seeded.len()),
        Some(json!({ "roles": seeded })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permission::authorize;
    use axum::http::Method;

    #[test]
    fn vocabulary_covers_both_tiers() {
        let names = permission_vocabulary();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"view_orders".to_string()));
        assert!(names.contains(&"edit_users".to_string()));
    }

    #[test]
    fn default_roles_grant_expected_access() {
        let roles = default_roles();
        let role = |name: &str| roles.iter().find(|(n, _)| *n == name).map(|(_, p)| p.clone()).unwrap();

        let admin = role("Admin");
        let editor = role("Editor");
        let viewer = role("Viewer");

        for resource in RESOURCES {
            assert!(authorize(&admin, resource, &Method::DELETE).is_ok());
            assert!(authorize(&viewer, resource, &Method::GET).is_ok());
            assert!(authorize(&viewer, resource, &Method::POST).is_err());
        }
        assert!(authorize(&editor, "products", &Method::PUT).is_ok());
        assert!(authorize(&editor, "users", &Method::PUT).is_err());
    }
}

//! Two-tier permission check.
//!
//! A role holds a flat set of permission names of the form `view_<resource>`
//! or `edit_<resource>`. `GET` needs either one; every other method,
//! `HEAD` included, needs `edit_<resource>`. There is no inheritance, wildcard or deny rule.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    View,
    Edit,
}

impl Access {
    /// Access tier a request method needs
    pub fn required_for(method: &Method) -> Self {
        if method == Method::GET {
            Access::View
        } else {
            Access::Edit
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Access::View => "view_",
            Access::Edit => "edit_",
        }
    }

    /// Permission name granting this tier on `resource`
    pub fn permission_for(self, resource: &str) -> String {
        format!("{}{}", self.prefix(), resource)
    }

    /// Whether holding `permission` satisfies this tier on `resource`
    fn granted_by(self, permission: &str, resource: &str) -> bool {
        let edit = Access::Edit.permission_for(resource);
        match self {
            Access::View => permission == Access::View.permission_for(resource) || permission == edit,
            Access::Edit => permission == edit,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::View => write!(f, "view"),
            Access::Edit => write!(f, "edit"),
        }
    }
}

/// Split `view_users` into `(View, "users")`; anything off-convention is `None`
pub fn parse_permission_name(name: &str) -> Option<(Access, &str)> {
    let (access, resource) = if let Some(rest) = name.strip_prefix(Access::View.prefix()) {
        (Access::View, rest)
    } else if let Some(rest) = name.strip_prefix(Access::Edit.prefix()) {
        (Access::Edit, rest)
    } else {
        return None;
    };

    if resource.is_empty() {
        None
    } else {
        Some((access, resource))
    }
}

/// The actor's role lacks the permission a request needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unauthorized: {access} access to {resource} required")]
pub struct Unauthorized {
    pub resource: String,
    pub access: Access,
}

impl Unauthorized {
    pub fn new(resource: impl Into<String>, access: Access) -> Self {
        Self {
            resource: resource.into(),
            access,
        }
    }
}

/// Decide a request against an already-loaded permission set
pub fn authorize<S>(permissions: &[S], resource: &str, method: &Method) -> Result<(), Unauthorized>
where
    S: AsRef<str>,
{
    let access = Access::required_for(method);

    if permissions
        .iter()
        .any(|p| access.granted_by(p.as_ref(), resource))
    {
        Ok(())
    } else {
        Err(Unauthorized::new(resource, access))
    }
}

/// Role and permission lookups the check depends on
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    /// Role currently assigned to a user; `None` if the user or role is gone
    async fn role_for_user(&self, user_id: i64) -> Result<Option<i64>, DatabaseError>;

    /// Permission names granted to a role
    async fn permissions_for_role(&self, role_id: i64) -> Result<Vec<String>, DatabaseError>;
}

#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error(transparent)]
    Unauthorized(#[from] Unauthorized),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Loads permission sets through a [`PermissionLookup`] and applies [`authorize`]
#[derive(Clone)]
pub struct Authorizer {
    lookup: Arc<dyn PermissionLookup>,
}

impl Authorizer {
    pub fn new(lookup: Arc<dyn PermissionLookup>) -> Self {
        Self { lookup }
    }

    /// Check a role. A missing role grants nothing.
    pub async fn authorize(
        &self,
        role_id: Option<i64>,
        resource: &str,
        method: &Method,
    ) -> Result<(), AuthorizeError> {
        let permissions = match role_id {
            Some(role_id) => self.lookup.permissions_for_role(role_id).await?,
            None => Vec::new(),
        };

        let decision = authorize(&permissions, resource, method);
        tracing::debug!(
            role_id = ?role_id,
            resource,
            method = %method,
            granted = decision.is_ok(),
            "authorization decision"
        );
        Ok(decision?)
    }

    /// Resolve the user's role, then check it
    pub async fn authorize_user(
        &self,
        user_id: i64,
        resource: &str,
        method: &Method,
    ) -> Result<(), AuthorizeError> {
        let role_id = self.lookup.role_for_user(user_id).await?;
        self.authorize(role_id, resource, method).await
    }
}

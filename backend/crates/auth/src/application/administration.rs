//! Administration Policy
//!
//! Decides whether one user may administer another. Rules are applied in
//! order and the first that matches decides:
//!
//! 1. Users may always administer themselves.
//! 2. Site administrators cannot be administered by anyone else.
//! 3. Site administrators may administer anyone else.
//! 4. The actor must manage every non-site context the target has a group in.
//! 5. The actor must manage at least one context.
//! 6. Otherwise permitted.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::repository::{RoleRepository, UserGroupRepository};
use crate::domain::value_object::{context_id::ContextId, role_id::RoleId, user_id::UserId};
use crate::error::AuthResult;

/// Administration policy
pub struct AdministrationPolicy<R, G>
where
    R: RoleRepository,
    G: UserGroupRepository,
{
    role_repo: Arc<R>,
    group_repo: Arc<G>,
}

impl<R, G> AdministrationPolicy<R, G>
where
    R: RoleRepository,
    G: UserGroupRepository,
{
    pub fn new(role_repo: Arc<R>, group_repo: Arc<G>) -> Self {
        Self {
            role_repo,
            group_repo,
        }
    }

    /// May `actor` administer `target`
    pub async fn can_administer(&self, target: &UserId, actor: &UserId) -> AuthResult<bool> {
        if target == actor {
            return Ok(true);
        }

        if self.is_site_admin(target).await? {
            tracing::debug!(
                target_user_id = %target,
                actor_user_id = %actor,
                "Refused: target is a site administrator"
            );
            return Ok(false);
        }

        if self.is_site_admin(actor).await? {
            return Ok(true);
        }

        let managed: HashSet<ContextId> = self
            .role_repo
            .find_by_user_id(actor)
            .await?
            .into_iter()
            .filter(|role| role.role_id.is_manager_equivalent())
            .map(|role| role.context_id)
            .collect();

        let groups = self.group_repo.find_by_user_id(target).await?;
        if let Some(unmanaged) = groups
            .iter()
            .map(|group| group.context_id)
            .find(|context_id| !context_id.is_site() && !managed.contains(context_id))
        {
            tracing::debug!(
                target_user_id = %target,
                actor_user_id = %actor,
                context_id = %unmanaged,
                "Refused: target belongs to a context the actor does not manage"
            );
            return Ok(false);
        }

        if managed.is_empty() {
            tracing::debug!(
                target_user_id = %target,
                actor_user_id = %actor,
                "Refused: actor manages no context"
            );
            return Ok(false);
        }

        Ok(true)
    }

    async fn is_site_admin(&self, user_id: &UserId) -> AuthResult<bool> {
        self.role_repo
            .user_has_role(ContextId::SITE, user_id, RoleId::SITE_ADMIN)
            .await
    }
}

use tracing::warn;
use uuid::Uuid;

use shared_models::auth::{AccessDenied, Actor, Role};

/// Single capability check for core operations. Redirects and flash messages are the
/// caller's concern; this only answers yes or no.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), AccessDenied> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        warn!("{} {} denied, requires one of {:?}", actor.role, actor.id, allowed);
        Err(AccessDenied::RoleNotPermitted { role: actor.role })
    }
}

/// Passes when the actor is the owning user, or holds one of `roles`.
pub fn require_owner_or_role(actor: &Actor, owner_id: Uuid, roles: &[Role]) -> Result<(), AccessDenied> {
    if actor.id == owner_id || roles.contains(&actor.role) {
        Ok(())
    } else {
        warn!("{} {} denied access to resource owned by {}", actor.role, actor.id, owner_id);
        Err(AccessDenied::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_role() {
        let doctor = Actor::doctor(Uuid::new_v4());
        assert!(require_role(&doctor, &[Role::Doctor, Role::Admin]).is_ok());
        assert_eq!(
            require_role(&doctor, &[Role::Patient]),
            Err(AccessDenied::RoleNotPermitted { role: Role::Doctor })
        );
        assert!(require_role(&doctor, &[]).is_err());
    }

    #[test]
    fn test_require_owner_or_role() {
        let owner = Uuid::new_v4();
        let patient = Actor::patient(owner);
        let stranger = Actor::patient(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());

        assert!(require_owner_or_role(&patient, owner, &[Role::Admin]).is_ok());
        assert!(require_owner_or_role(&admin, owner, &[Role::Admin]).is_ok());
        assert_eq!(
            require_owner_or_role(&stranger, owner, &[Role::Admin]),
            Err(AccessDenied::NotOwner)
        );
    }
}

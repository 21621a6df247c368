//! Role and ownership decisions for every gated operation.
//!
//! A pure decision function over an [`Actor`] and an [`Action`]; services ask
//! it before touching a port. Staff get all reads and deletes but never
//! bypass the role requirement on create operations.

use super::auth::Actor;
use super::error::Error;
use super::ids::UserId;
use super::user::UserRole;

/// A gated operation together with the ownership facts it needs.
///
/// Ownership identifiers are resolved by the calling service before the
/// decision is made; the authorization layer holds no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateOffer,
    UpdateOffer { owner_id: UserId },
    DeleteOffer { owner_id: UserId },
    CreateOrder,
    ReadOrder { customer_id: UserId, business_id: UserId },
    UpdateOrder { customer_id: UserId, business_id: UserId },
    DeleteOrder,
    CreateReview,
    UpdateReview { reviewer_id: UserId },
    DeleteReview { reviewer_id: UserId },
    UpdateProfile { subject_id: UserId },
}

impl Action {
    fn is_read(self) -> bool {
        matches!(self, Self::ReadOrder { .. })
    }

    fn is_delete(self) -> bool {
        matches!(
            self,
            Self::DeleteOffer { .. } | Self::DeleteOrder | Self::DeleteReview { .. }
        )
    }
}

/// Decide whether `actor` may perform `action`. Rules are checked in a fixed
/// order and the first match wins.
#[must_use]
pub fn can(actor: &Actor, action: Action) -> bool {
    // Staff blanket covers reads and deletes only; creates and updates still
    // require the role or ownership named below.
    if actor.is_staff && (action.is_read() || action.is_delete()) {
        return true;
    }
    match action {
        Action::CreateOffer => actor.role == UserRole::Business,
        Action::UpdateOffer { owner_id } | Action::DeleteOffer { owner_id } => {
            actor.id == owner_id
        }
        Action::CreateOrder => actor.role == UserRole::Customer,
        Action::ReadOrder {
            customer_id,
            business_id,
        }
        | Action::UpdateOrder {
            customer_id,
            business_id,
        } => actor.id == customer_id || actor.id == business_id,
        Action::DeleteOrder => actor.is_staff,
        Action::CreateReview => true,
        Action::UpdateReview { reviewer_id } | Action::DeleteReview { reviewer_id } => {
            actor.id == reviewer_id
        }
        Action::UpdateProfile { subject_id } => actor.id == subject_id || actor.is_staff,
    }
}

/// [`can`] as a guard clause: `Err(forbidden)` when the decision is negative.
pub fn require(actor: &Actor, action: Action) -> Result<(), Error> {
    if can(actor, action) {
        Ok(())
    } else {
        Err(Error::forbidden(
            "you do not have permission to perform this action",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn actor(role: UserRole, is_staff: bool) -> Actor {
        Actor {
            id: UserId::random(),
            role,
            is_staff,
        }
    }

    #[rstest]
    #[case(UserRole::Business, true)]
    #[case(UserRole::Customer, false)]
    fn only_business_users_create_offers(#[case] role: UserRole, #[case] allowed: bool) {
        assert_eq!(can(&actor(role, false), Action::CreateOffer), allowed);
    }

    #[test]
    fn staff_role_does_not_bypass_create_rules() {
        let staff_customer = actor(UserRole::Customer, true);
        assert!(!can(&staff_customer, Action::CreateOffer));
        let staff_business = actor(UserRole::Business, true);
        assert!(!can(&staff_business, Action::CreateOrder));
    }

    #[test]
    fn offer_mutation_requires_ownership() {
        let owner = actor(UserRole::Business, false);
        let stranger = actor(UserRole::Business, false);
        let action = Action::UpdateOffer { owner_id: owner.id };
        assert!(can(&owner, action));
        assert!(!can(&stranger, action));
    }

    #[test]
    fn staff_may_delete_but_not_update_foreign_offers() {
        let staff = actor(UserRole::Customer, true);
        let owner_id = UserId::random();
        assert!(can(&staff, Action::DeleteOffer { owner_id }));
        assert!(!can(&staff, Action::UpdateOffer { owner_id }));
    }

    #[test]
    fn order_access_is_limited_to_participants() {
        let customer = actor(UserRole::Customer, false);
        let business = actor(UserRole::Business, false);
        let outsider = actor(UserRole::Customer, false);
        let action = Action::ReadOrder {
            customer_id: customer.id,
            business_id: business.id,
        };
        assert!(can(&customer, action));
        assert!(can(&business, action));
        assert!(!can(&outsider, action));
        // Staff can read any order.
        assert!(can(&actor(UserRole::Customer, true), action));
    }

    #[test]
    fn order_deletion_is_staff_only() {
        assert!(can(&actor(UserRole::Customer, true), Action::DeleteOrder));
        assert!(!can(&actor(UserRole::Business, false), Action::DeleteOrder));
    }

    #[test]
    fn any_authenticated_user_may_create_reviews() {
        assert!(can(&actor(UserRole::Customer, false), Action::CreateReview));
        assert!(can(&actor(UserRole::Business, false), Action::CreateReview));
    }

    #[test]
    fn review_mutation_requires_authorship() {
        let reviewer = actor(UserRole::Customer, false);
        let other = actor(UserRole::Customer, false);
        let action = Action::UpdateReview {
            reviewer_id: reviewer.id,
        };
        assert!(can(&reviewer, action));
        assert!(!can(&other, action));
    }

    #[test]
    fn profile_updates_allow_owner_and_staff() {
        let subject = actor(UserRole::Customer, false);
        let action = Action::UpdateProfile {
            subject_id: subject.id,
        };
        assert!(can(&subject, action));
        assert!(can(&actor(UserRole::Business, true), action));
        assert!(!can(&actor(UserRole::Business, false), action));
    }

    #[test]
    fn require_maps_denial_to_forbidden() {
        let err = require(&actor(UserRole::Customer, false), Action::CreateOffer)
            .expect_err("customer cannot create offers");
        assert_eq!(err.code(), crate::domain::error::ErrorCode::Forbidden);
    }
}

//! Admin gate: who may see and use the store mutation controls.

use serde::{Deserialize, Serialize};

use crate::types::{Email, StoreRecord, UserId};

/// A signed-in account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
}

/// Access level of the current visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    SignedOut,
    SignedIn,
    Admin,
}

impl AccessLevel {
    /// Whether the admin controls should be rendered.
    #[must_use]
    pub const fn shows_admin_controls(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Rule deciding which signed-in accounts manage store listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPolicy {
    /// Only these exact email addresses are admins; admins manage every store.
    AllowList(Vec<Email>),
    /// Every signed-in account manages the stores it created.
    Owner,
}

impl AdminPolicy {
    /// Access level for an optional identity.
    #[must_use]
    pub fn access(&self, identity: Option<&Identity>) -> AccessLevel {
        let Some(identity) = identity else {
            return AccessLevel::SignedOut;
        };
        match self {
            Self::AllowList(emails) if emails.contains(&identity.email) => AccessLevel::Admin,
            Self::AllowList(_) => AccessLevel::SignedIn,
            Self::Owner => AccessLevel::Admin,
        }
    }

    /// Whether `identity` may edit or delete `store`.
    #[must_use]
    pub fn can_manage(&self, identity: &Identity, store: &StoreRecord) -> bool {
        match self {
            Self::AllowList(_) => self.access(Some(identity)) == AccessLevel::Admin,
            Self::Owner => store.is_created_by(identity.user_id),
        }
    }

    /// The stores listed in `identity`'s admin panel.
    pub fn manageable<'a>(
        &'a self,
        identity: &'a Identity,
        stores: &'a [StoreRecord],
    ) -> impl Iterator<Item = &'a StoreRecord> + 'a {
        stores
            .iter()
            .filter(move |store| self.can_manage(identity, store))
    }

    /// Configuration name of the policy.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AllowList(_) => "allow-list",
            Self::Owner => "owner",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::StoreId;

    fn identity(email: &str) -> Identity {
        Identity {
            user_id: UserId::random(),
            email: Email::parse(email).unwrap(),
        }
    }

    fn store(created_by: Option<UserId>) -> StoreRecord {
        StoreRecord {
            id: StoreId::random(),
            name: "Outlet".to_string(),
            address: "1 Main St".to_string(),
            city: "Phoenix".to_string(),
            state: "AZ".to_string(),
            zip_code: "85001".to_string(),
            phone: None,
            hours: None,
            created_at: None,
            created_by,
        }
    }

    fn allow_list() -> AdminPolicy {
        AdminPolicy::AllowList(vec![Email::parse("admin@example.com").unwrap()])
    }

    #[test]
    fn test_signed_out_is_never_admin() {
        assert_eq!(allow_list().access(None), AccessLevel::SignedOut);
        assert_eq!(AdminPolicy::Owner.access(None), AccessLevel::SignedOut);
        assert!(!AccessLevel::SignedOut.shows_admin_controls());
    }

    #[test]
    fn test_allow_list_exact_match() {
        let policy = allow_list();
        assert_eq!(
            policy.access(Some(&identity("admin@example.com"))),
            AccessLevel::Admin
        );
        assert_eq!(
            policy.access(Some(&identity("Admin@example.com"))),
            AccessLevel::SignedIn
        );
        assert_eq!(
            policy.access(Some(&identity("someone@example.com"))),
            AccessLevel::SignedIn
        );
    }

    #[test]
    fn test_allow_list_admin_manages_every_store() {
        let policy = allow_list();
        let admin = identity("admin@example.com");
        let other = identity("other@example.com");
        let s = store(Some(other.user_id));
        assert!(policy.can_manage(&admin, &s));
        assert!(!policy.can_manage(&other, &s));
    }

    #[test]
    fn test_owner_policy_scopes_by_creator() {
        let policy = AdminPolicy::Owner;
        let owner = identity("owner@example.com");
        let mine = store(Some(owner.user_id));
        let theirs = store(Some(UserId::random()));
        let legacy = store(None);

        assert_eq!(policy.access(Some(&owner)), AccessLevel::Admin);
        assert!(policy.can_manage(&owner, &mine));
        assert!(!policy.can_manage(&owner, &theirs));
        assert!(!policy.can_manage(&owner, &legacy));

        let stores = vec![mine.clone(), theirs, legacy];
        let listed: Vec<_> = policy.manageable(&owner, &stores).collect();
        assert_eq!(listed, vec![&mine]);
    }
}

//! Authorization policy for marketplace mutations and admin reads.
//!
//! Handlers never compare ids inline. Each check is expressed once here as a
//! declarative rule and evaluated against the authenticated subject:
//!
//! ```text
//! OwnershipRule  ── subject == resource.<owner_field>
//! AdminAllowList ── normalized address set from server configuration
//! require_admin  ── profile.role == admin
//! ```

use crate::{Order, PolicyError, Profile, ProfileId};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// OWNERSHIP
// ============================================================================

/// "Subject must equal `resource.<field>`", evaluated in application code.
pub struct OwnershipRule<R> {
    resource: &'static str,
    field: &'static str,
    owner: fn(&R) -> ProfileId,
}

impl<R> OwnershipRule<R> {
    pub const fn new(resource: &'static str, field: &'static str, owner: fn(&R) -> ProfileId) -> Self {
        Self {
            resource,
            field,
            owner,
        }
    }

    /// Name of the owning field, as reported in denials.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn check(&self, subject: ProfileId, resource: &R) -> Result<(), PolicyError> {
        if (self.owner)(resource) == subject {
            Ok(())
        } else {
            Err(PolicyError::NotOwner {
                resource: self.resource,
                field: self.field,
                subject: subject.0,
            })
        }
    }
}

impl<R> Clone for OwnershipRule<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for OwnershipRule<R> {}

impl<R> fmt::Debug for OwnershipRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipRule")
            .field("resource", &self.resource)
            .field("field", &self.field)
            .finish()
    }
}

fn order_buyer(order: &Order) -> ProfileId {
    order.buyer_id
}

fn order_seller(order: &Order) -> ProfileId {
    order.seller_id
}

/// Only the recorded buyer may review an order.
pub const ORDER_BUYER: OwnershipRule<Order> = OwnershipRule::new("order", "buyer_id", order_buyer);

/// Seller side of an order.
pub const ORDER_SELLER: OwnershipRule<Order> =
    OwnershipRule::new("order", "seller_id", order_seller);

/// Passes when any of the rules passes; reports the first denial otherwise.
pub fn check_any<R>(
    rules: &[OwnershipRule<R>],
    subject: ProfileId,
    resource: &R,
) -> Result<(), PolicyError> {
    let mut first_denial = None;
    for rule in rules {
        match rule.check(subject, resource) {
            Ok(()) => return Ok(()),
            Err(e) => {
                first_denial.get_or_insert(e);
            }
        }
    }
    Err(first_denial.unwrap_or(PolicyError::Unauthenticated))
}

// ============================================================================
// ADMIN ALLOW-LIST
// ============================================================================

/// Fixed set of privileged addresses. Compared trimmed and case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: BTreeSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .filter_map(|e| normalize_email(e.as_ref()))
            .collect();
        Self { emails }
    }

    /// Parse a comma separated list, as found in `BAZAAR_ADMIN_EMAILS`.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, email: &str) -> bool {
        normalize_email(email).is_some_and(|e| self.emails.contains(&e))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

// ============================================================================
// ROLE REQUIREMENT
// ============================================================================

/// Moderation endpoints require the stored role to be admin.
pub fn require_admin(profile: &Profile) -> Result<(), PolicyError> {
    if profile.role.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::RoleRequired { required: "admin" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityIdType, OrderId, OrderStatus, Role};
    use chrono::Utc;
    use proptest::prelude::*;

    fn order(buyer: ProfileId, seller: ProfileId) -> Order {
        Order {
            id: OrderId::now_v7(),
            listing_id: None,
            buyer_id: buyer,
            seller_id: seller,
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_buyer_rule_accepts_buyer_only() {
        let buyer = ProfileId::now_v7();
        let seller = ProfileId::now_v7();
        let o = order(buyer, seller);

        assert!(ORDER_BUYER.check(buyer, &o).is_ok());
        let err = ORDER_BUYER.check(seller, &o).unwrap_err();
        assert!(matches!(err, PolicyError::NotOwner { field: "buyer_id", .. }));
    }

    #[test]
    fn test_check_any_covers_both_parties() {
        let buyer = ProfileId::now_v7();
        let seller = ProfileId::now_v7();
        let o = order(buyer, seller);
        let parties = [ORDER_BUYER, ORDER_SELLER];

        assert!(check_any(&parties, buyer, &o).is_ok());
        assert!(check_any(&parties, seller, &o).is_ok());
        let err = check_any(&parties, ProfileId::now_v7(), &o).unwrap_err();
        assert!(matches!(err, PolicyError::NotOwner { field: "buyer_id", .. }));
    }

    #[test]
    fn test_allow_list_normalizes_entries() {
        let list = AdminAllowList::from_csv(" Admin@Bazaar.Market ,, ops@bazaar.market");
        assert_eq!(list.len(), 2);
        assert!(list.contains("admin@bazaar.market"));
        assert!(list.contains("  OPS@bazaar.market "));
        assert!(!list.contains(""));
        assert!(!list.contains("someone@else.com"));
    }

    #[test]
    fn test_require_admin() {
        let mut profile = Profile {
            id: ProfileId::now_v7(),
            email: None,
            display_name: None,
            role: Role::User,
            last_seen: None,
        };
        assert_eq!(
            require_admin(&profile),
            Err(PolicyError::RoleRequired { required: "admin" })
        );
        profile.role = Role::Admin;
        assert!(require_admin(&profile).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any subject other than the buyer is denied by the buyer rule.
        #[test]
        fn prop_buyer_rule_denies_non_buyers(a in any::<u128>(), b in any::<u128>()) {
            prop_assume!(a != b);
            let buyer = ProfileId::new(uuid::Uuid::from_u128(a));
            let other = ProfileId::new(uuid::Uuid::from_u128(b));
            let o = order(buyer, ProfileId::now_v7());
            prop_assert!(ORDER_BUYER.check(other, &o).is_err());
            prop_assert!(ORDER_BUYER.check(buyer, &o).is_ok());
        }

        /// Allow-list membership ignores case and surrounding whitespace.
        #[test]
        fn prop_allow_list_case_insensitive(local in "[a-z]{1,12}", pad in " {0,3}") {
            let email = format!("{local}@bazaar.market");
            let list = AdminAllowList::new([email.clone()]);
            let probe = format!("{pad}{}{pad}", email.to_uppercase());
            prop_assert!(list.contains(&probe));
        }
    }
}

//! Authorization predicates over already-verified claims.
//!
//! Both are pure: they never look at the store, so a missing target resource
//! is judged on the path identity alone.

use super::Claims;

/// The caller is the target identity, or an admin.
pub fn is_self_or_admin(claims: &Claims, target: &str) -> bool {
    claims.is_admin || claims.username == target
}

pub fn is_admin(claims: &Claims) -> bool {
    claims.is_admin
}

//! Well-known role name constants.
//!
//! These must match the `role` claim values issued by the identity provider.

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ADMIN: &str = "admin";

//! `sitebook-auth`: authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage. The API layer extracts the bearer token,
//! validates it here and checks permissions before touching any store.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;

pub use authorize::{AuthzError, Principal, TenantMembership, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use roles::Role;

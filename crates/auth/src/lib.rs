//! `jobboard-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows what
//! roles, grants, tokens and credentials are, not where they live.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{Action, AuthzError, Ownership, authorize, require_grant};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, PasswordHasher};
pub use permissions::{NewPermissionGrant, Permission, PermissionGrant};
pub use roles::{NewRole, RoleKind, RoleRecord, RoleType};
pub use token::{Hs256TokenService, JwtValidator, TokenError, TokenIssuer};
pub use user::{LOCAL_PROVIDER, LoginCredentials, NewUser, RegisterUser, RegistrationRole, UserRecord};

//! Infrastructure layer: storage, role resolution and startup bootstrap.

pub mod bootstrap;
pub mod role_resolver;
pub mod store;

pub use bootstrap::{BootstrapReport, run as run_bootstrap};
pub use role_resolver::RoleResolver;
pub use store::{
    ApplicationStore, InMemoryStore, JobFilter, JobStore, PermissionStore, PgStore, RoleStore,
    Store, StoreError, UserStore,
};

//! Identity storage trait.

use crate::error::Result;
use crate::identity::Identity;
use async_trait::async_trait;

/// Trait for identity storage operations required by the enrollment flow.
///
/// Implement this trait for your database layer. Lookups must treat the
/// email case-insensitively (see [`Identity::storage_key`]).
///
/// `insert` is the sole serialization point for concurrent first-time
/// completions: when two writers race on the same email, exactly one insert
/// succeeds and the other must fail with
/// [`KeywayError::DuplicateIdentity`](crate::KeywayError::DuplicateIdentity).
///
/// # Example
///
/// ```rust,ignore
/// use keyway::{Identity, IdentityStore};
/// use async_trait::async_trait;
///
/// struct MyIdentityStore {
///     db: DatabaseConnection,
/// }
///
/// #[async_trait]
/// impl IdentityStore for MyIdentityStore {
///     async fn find(&self, email: &str) -> Result<Option<Identity>> {
///         // Query your database by the normalized key
///         Ok(self.db.find_identity(&Identity::storage_key(email)).await?)
///     }
///
///     // ... implement other methods
/// }
/// ```
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find a record by email address. No mutation.
    async fn find(&self, email: &str) -> Result<Option<Identity>>;

    /// Persist a new record.
    ///
    /// Fails with `DuplicateIdentity` if a record already exists for the
    /// email; the store's uniqueness constraint must make this atomic.
    async fn insert(&self, identity: Identity) -> Result<()>;

    /// Flip the record's `verified` flag to true.
    ///
    /// Fails with `UnknownIdentity` if no record exists. The flag never
    /// transitions back.
    async fn mark_verified(&self, email: &str) -> Result<()>;
}

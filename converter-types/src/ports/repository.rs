//! Repository port trait.
//!
//! Adapters (Postgres, SQLite) implement this trait.

use crate::domain::{ConversionTransaction, NewConversion};
use crate::error::RepoError;

/// Persistence of conversion records.
///
/// Records are inserted once and never updated.
#[async_trait::async_trait]
pub trait ConversionRepository: Send + Sync + 'static {
    /// Inserts a conversion and returns it with its assigned id.
    async fn add_conversion(
        &self,
        conversion: NewConversion,
    ) -> Result<ConversionTransaction, RepoError>;

    /// Lists a user's conversions in insertion order.
    async fn list_conversions_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversionTransaction>, RepoError>;

    /// Lists at most `limit` conversions in insertion order.
    async fn list_all_conversions(
        &self,
        limit: i64,
    ) -> Result<Vec<ConversionTransaction>, RepoError>;
}

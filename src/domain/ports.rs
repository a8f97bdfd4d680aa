use super::account::{CreditAccount, CreditType};
use super::customer::CustomerSnapshot;
use crate::error::{CreditError, Result};
use async_trait::async_trait;

/// Durable keyed storage for credit accounts.
///
/// Every operation is atomic per record; none spans multiple records
/// transactionally. The two shared-state hazards of the engine are closed
/// here: `insert_capped` makes the count-then-insert of account creation one
/// step, and `update` is a conditional replace keyed on the record version.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: CreditAccount) -> Result<()>;

    /// Inserts only while the owner holds fewer than `cap` accounts of the
    /// account's type, counting and inserting atomically. Returns `false`
    /// when the cap is already met.
    async fn insert_capped(&self, account: CreditAccount, cap: u64) -> Result<bool>;

    /// Replaces the stored record if its version still matches the given
    /// account's, bumping the version. Returns `false` on a version
    /// conflict, `NotFound` when no record exists for the id.
    async fn update(&self, account: CreditAccount) -> Result<bool>;

    async fn get(&self, id: &str) -> Result<Option<CreditAccount>>;
    async fn get_by_number(&self, number: &str) -> Result<Option<CreditAccount>>;
    async fn list_by_owner(&self, customer_id: &str) -> Result<Vec<CreditAccount>>;
    async fn list_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<Vec<CreditAccount>>;
    async fn count_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<u64>;
    async fn exists_by_number(&self, number: &str) -> Result<bool>;

    /// Removes the record. Returns whether anything was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn all(&self) -> Result<Vec<CreditAccount>>;
}

/// Resolves customer identifiers against the customer service.
///
/// `resolve` keeps three outcomes distinct: the snapshot, `NotFound` (the
/// absence is authoritative) and `ServiceUnavailable` (the dependency is
/// degraded; the customer may well exist).
#[async_trait]
pub trait CustomerGateway: Send + Sync {
    async fn resolve(&self, customer_id: &str) -> Result<CustomerSnapshot>;

    /// Convenience existence check. Deliberately collapses `NotFound` and
    /// `ServiceUnavailable` to `false`; the degraded case is logged louder.
    async fn exists(&self, customer_id: &str) -> bool {
        match self.resolve(customer_id).await {
            Ok(_) => true,
            Err(CreditError::NotFound { .. }) => false,
            Err(err) => {
                tracing::error!(
                    customer = customer_id,
                    %err,
                    "customer lookup degraded while checking existence"
                );
                false
            }
        }
    }
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type CustomerGatewayBox = Box<dyn CustomerGateway>;

use crate::domain::account::{CreditAccount, CreditType};
use crate::domain::ports::AccountStore;
use crate::error::{CreditError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for credit accounts.
///
/// Uses `Arc<RwLock<HashMap<String, CreditAccount>>>` to allow shared
/// concurrent access. The single write lock is what makes `insert_capped`
/// and the conditional `update` atomic. Ideal for testing or ephemeral runs
/// where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, CreditAccount>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: CreditAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn insert_capped(&self, account: CreditAccount, cap: u64) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        let held = accounts
            .values()
            .filter(|a| a.customer_id == account.customer_id && a.credit_type == account.credit_type)
            .count() as u64;
        if held >= cap {
            return Ok(false);
        }
        accounts.insert(account.id.clone(), account);
        Ok(true)
    }

    async fn update(&self, mut account: CreditAccount) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get(&account.id)
            .ok_or_else(|| CreditError::not_found("credit account", &account.id))?;
        if stored.version != account.version {
            return Ok(false);
        }
        account.version += 1;
        accounts.insert(account.id.clone(), account);
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Option<CreditAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<CreditAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.number == number).cloned())
    }

    async fn list_by_owner(&self, customer_id: &str) -> Result<Vec<CreditAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<Vec<CreditAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.customer_id == customer_id && a.credit_type == credit_type)
            .cloned()
            .collect())
    }

    async fn count_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<u64> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.customer_id == customer_id && a.credit_type == credit_type)
            .count() as u64)
    }

    async fn exists_by_number(&self, number: &str) -> Result<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.number == number))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.remove(id).is_some())
    }

    async fn all(&self) -> Result<Vec<CreditAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

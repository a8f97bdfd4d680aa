use crate::domain::account::{CreditAccount, CreditType};
use crate::domain::ports::AccountStore;
use crate::error::{CreditError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for account records, keyed by id.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for the account-number index, number -> id.
pub const CF_NUMBERS: &str = "account_numbers";

/// A persistent store implementation using RocksDB.
///
/// Account records are stored as JSON in the "accounts" column family; a
/// second column family maps the human-facing account number back to the id.
/// Read-modify-write operations (`insert_capped`, the conditional `update`,
/// `delete`) serialize through one writer lock, which is what gives them
/// per-record atomicity on top of RocksDB's plain puts.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbAccountStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbAccountStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_numbers = ColumnFamilyDescriptor::new(CF_NUMBERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_numbers])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CreditError::Internal(format!("column family {name} not found")))
    }

    fn read(&self, id: &str) -> Result<Option<CreditAccount>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, account: &CreditAccount) -> Result<()> {
        let accounts = self.cf(CF_ACCOUNTS)?;
        let numbers = self.cf(CF_NUMBERS)?;
        let value = serde_json::to_vec(account)?;
        self.db.put_cf(accounts, account.id.as_bytes(), value)?;
        self.db
            .put_cf(numbers, account.number.as_bytes(), account.id.as_bytes())?;
        Ok(())
    }

    fn scan(&self, mut keep: impl FnMut(&CreditAccount) -> bool) -> Result<Vec<CreditAccount>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let account: CreditAccount = serde_json::from_slice(&value)?;
            if keep(&account) {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }
}

#[async_trait]
impl AccountStore for RocksDbAccountStore {
    async fn insert(&self, account: CreditAccount) -> Result<()> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        self.write(&account)
    }

    async fn insert_capped(&self, account: CreditAccount, cap: u64) -> Result<bool> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let held = self
            .scan(|a| a.customer_id == account.customer_id && a.credit_type == account.credit_type)?
            .len() as u64;
        if held >= cap {
            return Ok(false);
        }
        self.write(&account)?;
        Ok(true)
    }

    async fn update(&self, mut account: CreditAccount) -> Result<bool> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let stored = self
            .read(&account.id)?
            .ok_or_else(|| CreditError::not_found("credit account", &account.id))?;
        if stored.version != account.version {
            return Ok(false);
        }
        account.version += 1;
        self.write(&account)?;
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Option<CreditAccount>> {
        self.read(id)
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<CreditAccount>> {
        let numbers = self.cf(CF_NUMBERS)?;
        match self.db.get_cf(numbers, number.as_bytes())? {
            Some(id) => self.read(&String::from_utf8_lossy(&id)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(&self, customer_id: &str) -> Result<Vec<CreditAccount>> {
        self.scan(|a| a.customer_id == customer_id)
    }

    async fn list_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<Vec<CreditAccount>> {
        self.scan(|a| a.customer_id == customer_id && a.credit_type == credit_type)
    }

    async fn count_by_owner_and_type(
        &self,
        customer_id: &str,
        credit_type: CreditType,
    ) -> Result<u64> {
        Ok(self
            .scan(|a| a.customer_id == customer_id && a.credit_type == credit_type)?
            .len() as u64)
    }

    async fn exists_by_number(&self, number: &str) -> Result<bool> {
        let numbers = self.cf(CF_NUMBERS)?;
        Ok(self.db.get_pinned_cf(numbers, number.as_bytes())?.is_some())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let Some(account) = self.read(id)? else {
            return Ok(false);
        };
        let accounts = self.cf(CF_ACCOUNTS)?;
        let numbers = self.cf(CF_NUMBERS)?;
        self.db.delete_cf(numbers, account.number.as_bytes())?;
        self.db.delete_cf(accounts, id.as_bytes())?;
        Ok(true)
    }

    async fn all(&self) -> Result<Vec<CreditAccount>> {
        self.scan(|_| true)
    }
}

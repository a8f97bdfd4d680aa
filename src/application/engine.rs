use crate::domain::account::{AccountTerms, Amount, CreditAccount, CreditType};
use crate::domain::eligibility;
use crate::domain::ports::{AccountStoreBox, CustomerGatewayBox};
use crate::error::{CreditError, Result};
use chrono::Utc;
use tracing::{debug, info};

/// Bound on optimistic-concurrency retries for a single mutation. Conflicts
/// only arise from concurrent writers on the same account, so a handful of
/// reload-and-reapply rounds is plenty.
const MAX_UPDATE_ATTEMPTS: u32 = 5;

/// Personal customers hold at most this many personal loans.
const PERSONAL_LOAN_CAP: u64 = 1;

/// A request to open a new credit account.
#[derive(Debug, Clone)]
pub struct OpenAccountRequest {
    pub credit_type: CreditType,
    pub customer_id: String,
    pub principal: Amount,
    pub terms: AccountTerms,
}

/// The credit account transaction engine.
///
/// Orchestrates account creation (customer lookup, eligibility, persistence)
/// and executes charge/payment mutations with the balance/limit invariants
/// enforced by the domain entity. Holds no shared mutable state of its own;
/// all durable state lives behind the [`AccountStore`] port.
///
/// [`AccountStore`]: crate::domain::ports::AccountStore
pub struct CreditEngine {
    accounts: AccountStoreBox,
    customers: CustomerGatewayBox,
}

impl CreditEngine {
    pub fn new(accounts: AccountStoreBox, customers: CustomerGatewayBox) -> Self {
        Self {
            accounts,
            customers,
        }
    }

    /// Opens a new account for an eligible customer.
    ///
    /// Resolves the owner through the customer gateway (absence and
    /// unavailability stay distinct failures), validates eligibility against
    /// the live store count, and persists. Personal loans insert through the
    /// store's capped path so the count check and the insert cannot be split
    /// by a concurrent request.
    pub async fn create(&self, request: OpenAccountRequest) -> Result<CreditAccount> {
        debug!(customer = %request.customer_id, "creating credit account");
        let customer = self.customers.resolve(&request.customer_id).await?;

        let existing_personal_loans = if request.credit_type == CreditType::PersonalLoan {
            self.accounts
                .count_by_owner_and_type(&request.customer_id, CreditType::PersonalLoan)
                .await?
        } else {
            0
        };
        eligibility::validate(
            request.credit_type,
            customer.customer_type,
            existing_personal_loans,
        )?;

        let account = CreditAccount::open(
            request.credit_type,
            request.customer_id,
            request.principal,
            request.terms,
            Utc::now(),
        );

        if account.credit_type == CreditType::PersonalLoan {
            if !self
                .accounts
                .insert_capped(account.clone(), PERSONAL_LOAN_CAP)
                .await?
            {
                return Err(CreditError::business_rule(eligibility::ONE_PERSONAL_LOAN));
            }
        } else {
            self.accounts.insert(account.clone()).await?;
        }

        info!(number = %account.number, "credit account created");
        Ok(account)
    }

    /// Charges a credit card, consuming headroom.
    pub async fn charge(&self, id: &str, amount: Amount) -> Result<CreditAccount> {
        debug!(account = id, amount = %amount.value(), "charging account");
        let account = self
            .mutate(id, |account| account.charge(amount, Utc::now()))
            .await?;
        info!(account = id, balance = %account.balance.0, "charge applied");
        Ok(account)
    }

    /// Pays down an account balance, restoring headroom on cards.
    pub async fn pay(&self, id: &str, amount: Amount) -> Result<CreditAccount> {
        debug!(account = id, amount = %amount.value(), "paying account");
        let account = self
            .mutate(id, |account| account.pay(amount, Utc::now()))
            .await?;
        info!(account = id, balance = %account.balance.0, "payment applied");
        Ok(account)
    }

    /// Overwrites the descriptive terms of an account.
    pub async fn update_terms(&self, id: &str, terms: AccountTerms) -> Result<CreditAccount> {
        debug!(account = id, "updating account terms");
        let account = self
            .mutate(id, |account| {
                account.update_terms(terms.clone(), Utc::now());
                Ok(())
            })
            .await?;
        info!(account = id, "account terms updated");
        Ok(account)
    }

    /// Removes an account, failing with `NotFound` when it was already
    /// absent.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let account = self.find_by_id(id).await?;
        self.accounts.delete(&account.id).await?;
        info!(account = id, "credit account deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<CreditAccount> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(|| CreditError::not_found("credit account", id))
    }

    pub async fn find_by_number(&self, number: &str) -> Result<CreditAccount> {
        self.accounts
            .get_by_number(number)
            .await?
            .ok_or_else(|| CreditError::not_found("credit account", number))
    }

    /// Never fails on empty results; an unknown customer simply owns nothing.
    pub async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<CreditAccount>> {
        self.accounts.list_by_owner(customer_id).await
    }

    pub async fn find_all(&self) -> Result<Vec<CreditAccount>> {
        self.accounts.all().await
    }

    /// Load-mutate-store under optimistic concurrency: on a version conflict
    /// the account is reloaded and the mutation re-applied. Business-rule
    /// rejections from the mutation are terminal and never retried.
    async fn mutate(
        &self,
        id: &str,
        mut apply: impl FnMut(&mut CreditAccount) -> Result<()>,
    ) -> Result<CreditAccount> {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let mut account = self.find_by_id(id).await?;
            apply(&mut account)?;
            if self.accounts.update(account.clone()).await? {
                account.version += 1;
                return Ok(account);
            }
        }
        Err(CreditError::Internal(format!(
            "account {id} kept changing concurrently, giving up after {MAX_UPDATE_ATTEMPTS} attempts"
        )))
    }
}

use crate::error::CreditError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// Represents a monetary value held on an account.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for charges and payments.
///
/// Ensures that transaction amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, CreditError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CreditError::business_rule("amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CreditError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// The credit products the bank offers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
    PersonalLoan,
    BusinessLoan,
    CreditCard,
}

impl CreditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditType::PersonalLoan => "PERSONAL_LOAN",
            CreditType::BusinessLoan => "BUSINESS_LOAN",
            CreditType::CreditCard => "CREDIT_CARD",
        }
    }
}

impl std::fmt::Display for CreditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CreditType {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "PERSONAL_LOAN" => Ok(CreditType::PersonalLoan),
            "BUSINESS_LOAN" => Ok(CreditType::BusinessLoan),
            "CREDIT_CARD" => Ok(CreditType::CreditCard),
            other => Err(CreditError::business_rule(format!(
                "unknown credit type: {other}"
            ))),
        }
    }
}

/// Descriptive repayment terms. Not involved in any balance/limit invariant;
/// overwritten wholesale by the update path.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct AccountTerms {
    pub interest_rate: Option<Decimal>,
    pub minimum_payment: Option<Decimal>,
    pub payment_due_day: Option<u8>,
}

/// A credit product instance owned by one customer.
///
/// For credit cards the invariant `balance + credit_limit == principal` holds
/// across every charge and payment; loans keep `credit_limit` frozen at the
/// principal. Both `balance` and `credit_limit` stay non-negative.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CreditAccount {
    pub id: String,
    /// Human-facing unique code, `CRD-` plus 10 uppercase hex characters.
    pub number: String,
    pub credit_type: CreditType,
    pub customer_id: String,
    /// The originally approved credit amount. Immutable after creation.
    pub principal: Amount,
    /// Current outstanding amount owed.
    pub balance: Balance,
    /// Remaining spendable headroom. Populated at creation; only charges and
    /// payments on credit cards move it.
    pub credit_limit: Option<Balance>,
    pub interest_rate: Decimal,
    pub minimum_payment: Option<Decimal>,
    pub payment_due_day: Option<u8>,
    /// Inactive accounts reject all charge and payment operations.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency stamp, bumped by the store on every
    /// conditional update.
    pub version: u64,
}

/// Generates a human-facing account number: `CRD-` plus the first 10 hex
/// characters of a v4 UUID, uppercased. Collisions are treated as negligible;
/// no uniqueness retry is performed.
pub fn generate_account_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("CRD-{}", hex[..10].to_uppercase())
}

impl CreditAccount {
    /// Opens a new account: zero balance, full headroom, active.
    pub fn open(
        credit_type: CreditType,
        customer_id: impl Into<String>,
        principal: Amount,
        terms: AccountTerms,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            number: generate_account_number(),
            credit_type,
            customer_id: customer_id.into(),
            principal,
            balance: Balance::ZERO,
            credit_limit: Some(principal.into()),
            interest_rate: terms.interest_rate.unwrap_or_default(),
            minimum_payment: terms.minimum_payment,
            payment_due_day: terms.payment_due_day,
            active: true,
            created_at,
            updated_at: None,
            version: 0,
        }
    }

    pub fn is_credit_card(&self) -> bool {
        self.credit_type == CreditType::CreditCard
    }

    /// Spendable remainder: the credit limit when populated, otherwise
    /// principal minus balance (should not occur post-creation).
    pub fn available_credit(&self) -> Balance {
        self.credit_limit
            .unwrap_or_else(|| Balance(self.principal.value()) - self.balance)
    }

    /// Charges the account, moving value from the credit limit into the
    /// balance. Only active credit cards accept charges.
    pub fn charge(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<(), CreditError> {
        if !self.is_credit_card() {
            return Err(CreditError::business_rule(
                "charges can only be made to credit cards",
            ));
        }
        if !self.active {
            return Err(CreditError::business_rule(
                "cannot charge an inactive account",
            ));
        }
        let available = self.available_credit();
        if amount.value() > available.0 {
            return Err(CreditError::InsufficientCredit {
                requested: amount.value(),
                available: available.0,
            });
        }

        self.balance += amount.into();
        if let Some(limit) = self.credit_limit.as_mut() {
            *limit -= amount.into();
        }
        self.updated_at = Some(now);
        Ok(())
    }

    /// Pays down the balance. On credit cards the paid amount restores the
    /// credit limit; loans keep their limit untouched.
    pub fn pay(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<(), CreditError> {
        if !self.active {
            return Err(CreditError::business_rule(
                "cannot make a payment to an inactive account",
            ));
        }
        if amount.value() > self.balance.0 {
            return Err(CreditError::business_rule(
                "payment amount cannot exceed current balance",
            ));
        }

        self.balance -= amount.into();
        if self.is_credit_card()
            && let Some(limit) = self.credit_limit.as_mut()
        {
            *limit += amount.into();
        }
        self.updated_at = Some(now);
        Ok(())
    }

    /// Overwrites the descriptive terms. Balance, limit, type and owner are
    /// never touched here.
    pub fn update_terms(&mut self, terms: AccountTerms, now: DateTime<Utc>) {
        self.interest_rate = terms.interest_rate.unwrap_or_default();
        self.minimum_payment = terms.minimum_payment;
        self.payment_due_day = terms.payment_due_day;
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn card(principal: Decimal) -> CreditAccount {
        CreditAccount::open(
            CreditType::CreditCard,
            "c1",
            Amount::new(principal).unwrap(),
            AccountTerms::default(),
            Utc::now(),
        )
    }

    fn loan(principal: Decimal) -> CreditAccount {
        CreditAccount::open(
            CreditType::BusinessLoan,
            "c1",
            Amount::new(principal).unwrap(),
            AccountTerms::default(),
            Utc::now(),
        )
    }

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(CreditError::BusinessRule(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(CreditError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_account_number_format() {
        let number = generate_account_number();
        assert!(number.starts_with("CRD-"));
        assert_eq!(number.len(), 14);
        assert!(
            number[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_open_initializes_full_headroom() {
        let account = card(dec!(1000));
        assert_eq!(account.balance, Balance::ZERO);
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(1000))));
        assert_eq!(account.available_credit(), Balance::new(dec!(1000)));
        assert!(account.active);
        assert!(account.updated_at.is_none());
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_charge_moves_value_from_limit_to_balance() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(500)).unwrap(), Utc::now()).unwrap();

        assert_eq!(account.balance, Balance::new(dec!(500)));
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(500))));
        // card invariant: balance + limit == principal
        assert_eq!(
            account.balance + account.credit_limit.unwrap(),
            Balance::new(account.principal.value())
        );
        assert!(account.updated_at.is_some());
    }

    #[test]
    fn test_charge_rejects_non_card() {
        let mut account = loan(dec!(1000));
        let result = account.charge(Amount::new(dec!(1)).unwrap(), Utc::now());
        assert!(matches!(result, Err(CreditError::BusinessRule(_))));
        assert_eq!(account.balance, Balance::ZERO);
    }

    #[test]
    fn test_charge_rejects_inactive_account() {
        let mut account = card(dec!(1000));
        account.active = false;

        let result = account.charge(Amount::new(dec!(1)).unwrap(), Utc::now());
        assert!(matches!(result, Err(CreditError::BusinessRule(_))));
    }

    #[test]
    fn test_charge_exact_headroom_zeroes_limit() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(1000)).unwrap(), Utc::now()).unwrap();

        assert_eq!(account.credit_limit, Some(Balance::ZERO));
        assert_eq!(account.balance, Balance::new(dec!(1000)));
    }

    #[test]
    fn test_charge_over_headroom_reports_both_sides() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(600)).unwrap(), Utc::now()).unwrap();

        let result = account.charge(Amount::new(dec!(401)).unwrap(), Utc::now());
        match result {
            Err(CreditError::InsufficientCredit {
                requested,
                available,
            }) => {
                assert_eq!(requested, dec!(401));
                assert_eq!(available, dec!(400));
            }
            other => panic!("expected InsufficientCredit, got {other:?}"),
        }
        // rejected charge leaves the account untouched
        assert_eq!(account.balance, Balance::new(dec!(600)));
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(400))));
    }

    #[test]
    fn test_payment_restores_card_limit() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(500)).unwrap(), Utc::now()).unwrap();
        account.pay(Amount::new(dec!(500)).unwrap(), Utc::now()).unwrap();

        assert_eq!(account.balance, Balance::ZERO);
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(1000))));
    }

    #[test]
    fn test_payment_on_loan_leaves_limit_untouched() {
        let mut account = loan(dec!(10000));
        account.balance = Balance::new(dec!(2000));

        account.pay(Amount::new(dec!(500)).unwrap(), Utc::now()).unwrap();
        assert_eq!(account.balance, Balance::new(dec!(1500)));
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(10000))));
    }

    #[test]
    fn test_payment_rejects_inactive_account() {
        let mut account = card(dec!(1000));
        account.active = false;

        let result = account.pay(Amount::new(dec!(1)).unwrap(), Utc::now());
        assert!(matches!(result, Err(CreditError::BusinessRule(_))));
    }

    #[test]
    fn test_payment_cannot_exceed_balance() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(100)).unwrap(), Utc::now()).unwrap();

        let result = account.pay(Amount::new(dec!(101)).unwrap(), Utc::now());
        assert!(matches!(result, Err(CreditError::BusinessRule(_))));
        assert_eq!(account.balance, Balance::new(dec!(100)));
    }

    #[test]
    fn test_charge_then_payment_round_trips() {
        let mut account = card(dec!(750));
        let before = account.clone();

        account.charge(Amount::new(dec!(250)).unwrap(), Utc::now()).unwrap();
        account.pay(Amount::new(dec!(250)).unwrap(), Utc::now()).unwrap();

        assert_eq!(account.balance, before.balance);
        assert_eq!(account.credit_limit, before.credit_limit);
    }

    #[test]
    fn test_available_credit_falls_back_when_limit_unset() {
        let mut account = card(dec!(1000));
        account.balance = Balance::new(dec!(300));
        account.credit_limit = None;

        assert_eq!(account.available_credit(), Balance::new(dec!(700)));
    }

    #[test]
    fn test_update_terms_overwrites_descriptive_fields_only() {
        let mut account = card(dec!(1000));
        account.charge(Amount::new(dec!(100)).unwrap(), Utc::now()).unwrap();

        account.update_terms(
            AccountTerms {
                interest_rate: Some(dec!(3.5)),
                minimum_payment: Some(dec!(25)),
                payment_due_day: Some(15),
            },
            Utc::now(),
        );

        assert_eq!(account.interest_rate, dec!(3.5));
        assert_eq!(account.minimum_payment, Some(dec!(25)));
        assert_eq!(account.payment_due_day, Some(15));
        // transaction state untouched
        assert_eq!(account.balance, Balance::new(dec!(100)));
        assert_eq!(account.credit_limit, Some(Balance::new(dec!(900))));
    }
}

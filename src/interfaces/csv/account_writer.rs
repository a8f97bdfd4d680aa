use crate::domain::account::CreditAccount;
use crate::error::Result;
use std::io::Write;

/// Writes account state as CSV.
///
/// Renders the response-payload shape of an account: every stored field the
/// caller cares about plus the derived `available_credit`; the internal
/// version stamp is not part of the output.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    /// Writes the header followed by one row per account, then flushes.
    pub fn write_accounts(
        &mut self,
        accounts: impl IntoIterator<Item = CreditAccount>,
    ) -> Result<()> {
        self.writer.write_record([
            "id",
            "number",
            "type",
            "customer",
            "principal",
            "balance",
            "credit_limit",
            "available_credit",
            "interest_rate",
            "minimum_payment",
            "payment_due_day",
            "active",
            "created_at",
            "updated_at",
        ])?;

        for account in accounts {
            self.writer.write_record([
                account.id.clone(),
                account.number.clone(),
                account.credit_type.to_string(),
                account.customer_id.clone(),
                account.principal.value().to_string(),
                account.balance.0.to_string(),
                account
                    .credit_limit
                    .map(|limit| limit.0.to_string())
                    .unwrap_or_default(),
                account.available_credit().0.to_string(),
                account.interest_rate.to_string(),
                account
                    .minimum_payment
                    .map(|payment| payment.to_string())
                    .unwrap_or_default(),
                account
                    .payment_due_day
                    .map(|day| day.to_string())
                    .unwrap_or_default(),
                account.active.to_string(),
                account.created_at.to_rfc3339(),
                account
                    .updated_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_default(),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

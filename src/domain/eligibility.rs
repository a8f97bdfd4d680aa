use crate::domain::account::CreditType;
use crate::domain::customer::CustomerType;
use crate::error::CreditError;

pub(crate) const ONE_PERSONAL_LOAN: &str = "personal customers can only have one personal loan";
const NO_BUSINESS_LOAN_FOR_PERSONAL: &str = "personal customers cannot have business loans";
const NO_PERSONAL_LOAN_FOR_BUSINESS: &str = "business customers cannot have personal loans";

/// Decides whether a customer may open an account of the requested type.
///
/// Total over every (customer, requested) pair:
/// - personal customers hold at most one personal loan, never a business
///   loan, and any number of credit cards;
/// - business customers hold any number of business loans and credit cards,
///   never a personal loan.
///
/// `existing_personal_loans` must be the live store count at validation time,
/// not a cached total.
pub fn validate(
    requested: CreditType,
    customer: CustomerType,
    existing_personal_loans: u64,
) -> Result<(), CreditError> {
    match (customer, requested) {
        (CustomerType::Personal, CreditType::PersonalLoan) => {
            if existing_personal_loans == 0 {
                Ok(())
            } else {
                Err(CreditError::business_rule(ONE_PERSONAL_LOAN))
            }
        }
        (CustomerType::Personal, CreditType::CreditCard) => Ok(()),
        (CustomerType::Personal, CreditType::BusinessLoan) => {
            Err(CreditError::business_rule(NO_BUSINESS_LOAN_FOR_PERSONAL))
        }
        (CustomerType::Business, CreditType::PersonalLoan) => {
            Err(CreditError::business_rule(NO_PERSONAL_LOAN_FOR_BUSINESS))
        }
        (CustomerType::Business, CreditType::BusinessLoan | CreditType::CreditCard) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_customer_first_personal_loan_accepted() {
        assert!(validate(CreditType::PersonalLoan, CustomerType::Personal, 0).is_ok());
    }

    #[test]
    fn test_personal_customer_second_personal_loan_rejected() {
        let result = validate(CreditType::PersonalLoan, CustomerType::Personal, 1);
        assert!(matches!(result, Err(CreditError::BusinessRule(_))));
    }

    #[test]
    fn test_personal_customer_credit_card_has_no_count_limit() {
        assert!(validate(CreditType::CreditCard, CustomerType::Personal, 0).is_ok());
        // the loan count never gates credit cards
        assert!(validate(CreditType::CreditCard, CustomerType::Personal, 7).is_ok());
    }

    #[test]
    fn test_personal_customer_business_loan_always_rejected() {
        for count in [0, 1, 5] {
            let result = validate(CreditType::BusinessLoan, CustomerType::Personal, count);
            assert!(matches!(result, Err(CreditError::BusinessRule(_))));
        }
    }

    #[test]
    fn test_business_customer_personal_loan_always_rejected() {
        for count in [0, 1, 5] {
            let result = validate(CreditType::PersonalLoan, CustomerType::Business, count);
            assert!(matches!(result, Err(CreditError::BusinessRule(_))));
        }
    }

    #[test]
    fn test_business_customer_loans_and_cards_unlimited() {
        assert!(validate(CreditType::BusinessLoan, CustomerType::Business, 0).is_ok());
        assert!(validate(CreditType::BusinessLoan, CustomerType::Business, 9).is_ok());
        assert!(validate(CreditType::CreditCard, CustomerType::Business, 9).is_ok());
    }
}

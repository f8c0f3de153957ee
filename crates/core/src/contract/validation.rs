//! Contract business-rule validation.

use pactfile_shared::{AppError, AppResult};
use rust_decimal::Decimal;

use super::types::ContractInput;

/// Validate a contract created directly through the API.
///
/// Direct creation requires company id, contract amount, and both
/// dates. Auto-created contracts skip this and use [`validate_rules`]
/// semantics only.
///
/// # Errors
///
/// Returns `AppError::Validation` with one message per violated rule.
pub fn validate_create(input: &ContractInput) -> AppResult<()> {
    let mut errors = Vec::new();

    if input
        .company_id
        .as_deref()
        .is_none_or(|id| id.trim().is_empty())
    {
        errors.push("company id is required".to_string());
    }
    if input.contract_amount.is_none() {
        errors.push("contract amount is required".to_string());
    }
    if input.start_date.is_none() {
        errors.push("start date is required".to_string());
    }
    if input.end_date.is_none() {
        errors.push("end date is required".to_string());
    }

    collect_rule_violations(input, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validate the cross-field rules on an update payload.
///
/// # Errors
///
/// Returns `AppError::Validation` with one message per violated rule.
pub fn validate_rules(input: &ContractInput) -> AppResult<()> {
    let mut errors = Vec::new();
    collect_rule_violations(input, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn collect_rule_violations(input: &ContractInput, errors: &mut Vec<String>) {
    if input
        .contract_amount
        .is_some_and(|amount| amount < Decimal::ZERO)
    {
        errors.push("contract amount must not be negative".to_string());
    }
    if input.paid_amount.is_some_and(|paid| paid < Decimal::ZERO) {
        errors.push("paid amount must not be negative".to_string());
    }
    if input
        .final_payment_amount
        .is_some_and(|amount| amount < Decimal::ZERO)
    {
        errors.push("final payment amount must not be negative".to_string());
    }

    if let (Some(paid), Some(amount)) = (input.paid_amount, input.contract_amount)
        && paid > amount
    {
        errors.push("paid amount must not exceed contract amount".to_string());
    }

    if let (Some(start), Some(end)) = (input.start_date, input.end_date)
        && start > end
    {
        errors.push("start date must not be after end date".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn valid_create() -> ContractInput {
        ContractInput {
            company_id: Some("company_00001".to_string()),
            contract_amount: Some(dec!(150000)),
            paid_amount: Some(dec!(50000)),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..ContractInput::default()
        }
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(validate_create(&valid_create()).is_ok());
    }

    #[test]
    fn test_create_requires_company_amount_dates() {
        let Err(AppError::Validation(messages)) = validate_create(&ContractInput::default())
        else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_paid_must_not_exceed_amount() {
        let input = ContractInput {
            paid_amount: Some(dec!(150001)),
            ..valid_create()
        };
        let err = validate_create(&input).unwrap_err();
        assert!(err.to_string().contains("paid amount"));

        // Equal is fine.
        let input = ContractInput {
            paid_amount: Some(dec!(150000)),
            ..valid_create()
        };
        assert!(validate_create(&input).is_ok());
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let input = ContractInput {
            start_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..valid_create()
        };
        assert!(validate_create(&input).is_err());

        // Same-day contracts are allowed.
        let input = ContractInput {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 1),
            ..valid_create()
        };
        assert!(validate_create(&input).is_ok());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let input = ContractInput {
            contract_amount: Some(dec!(-1)),
            paid_amount: Some(dec!(-2)),
            final_payment_amount: Some(dec!(-3)),
            ..valid_create()
        };
        let Err(AppError::Validation(messages)) = validate_rules(&input) else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_update_rules_allow_partial_payload() {
        // An update touching only the memo has nothing to violate.
        let input = ContractInput {
            memo: Some("renegotiated".to_string()),
            ..ContractInput::default()
        };
        assert!(validate_rules(&input).is_ok());
    }
}

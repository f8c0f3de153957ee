//! Company field validation.
//!
//! All violated rules are collected so the caller gets every problem in
//! a single response instead of one per round trip.

use pactfile_shared::{AppError, AppResult};

use super::types::CompanyInput;

const MAX_BANK_ACCOUNT_LEN: usize = 30;
const BANK_CODE_LEN: usize = 12;
const MIN_TAX_ID_LEN: usize = 5;

/// Validate a company create or update payload.
///
/// # Errors
///
/// Returns `AppError::Validation` carrying one message per violated rule.
pub fn validate(input: &CompanyInput) -> AppResult<()> {
    let mut errors = Vec::new();

    if input.company_name.trim().is_empty() {
        errors.push("company name is required".to_string());
    }
    if input.contact_person.trim().is_empty() {
        errors.push("contact person is required".to_string());
    }
    if input.bank_name.trim().is_empty() {
        errors.push("bank name is required".to_string());
    }

    let tax_id = input.tax_id.trim();
    if tax_id.is_empty() {
        errors.push("tax id is required".to_string());
    } else if tax_id.chars().count() < MIN_TAX_ID_LEN {
        errors.push(format!("tax id must be at least {MIN_TAX_ID_LEN} characters"));
    }

    let phone = input.phone.trim();
    if phone.is_empty() {
        errors.push("phone is required".to_string());
    } else if !is_valid_phone(phone) {
        errors.push("phone must be a mobile number (1[3-9]xxxxxxxxx) or landline (xxx-xxxxxxx)".to_string());
    }
    if let Some(phone2) = input.phone2.as_deref() {
        let phone2 = phone2.trim();
        if !phone2.is_empty() && !is_valid_phone(phone2) {
            errors.push("secondary phone must be a mobile number or landline".to_string());
        }
    }

    let bank_account = input.bank_account.trim();
    if bank_account.is_empty() {
        errors.push("bank account is required".to_string());
    } else if !bank_account.chars().all(|c| c.is_ascii_digit()) {
        errors.push("bank account must contain only digits".to_string());
    } else if bank_account.len() > MAX_BANK_ACCOUNT_LEN {
        errors.push(format!(
            "bank account must be at most {MAX_BANK_ACCOUNT_LEN} digits"
        ));
    }

    let bank_code = input.bank_code.trim();
    if bank_code.is_empty() {
        errors.push("bank code is required".to_string());
    } else if bank_code.len() != BANK_CODE_LEN || !bank_code.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!("bank code must be exactly {BANK_CODE_LEN} digits"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Accepts mobile numbers (`1[3-9]` plus 9 digits) and landlines with a
/// 3-4 digit area code, a dash, and a 7-8 digit number.
fn is_valid_phone(phone: &str) -> bool {
    is_mobile(phone) || is_landline(phone)
}

fn is_mobile(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
        && bytes.iter().all(u8::is_ascii_digit)
}

fn is_landline(phone: &str) -> bool {
    let Some((area, number)) = phone.split_once('-') else {
        return false;
    };
    (3..=4).contains(&area.len())
        && (7..=8).contains(&number.len())
        && area.bytes().all(|b| b.is_ascii_digit())
        && number.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_input() -> CompanyInput {
        CompanyInput {
            company_name: "Acme Construction".to_string(),
            tax_id: "91330100MA27X".to_string(),
            company_address: Some("1 Main St".to_string()),
            contact_person: "Li Wei".to_string(),
            phone: "13812345678".to_string(),
            contact_person2: None,
            phone2: None,
            bank_name: "First Bank".to_string(),
            bank_account: "6222021234567890".to_string(),
            bank_code: "102100099996".to_string(),
            remarks: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate(&valid_input()).is_ok());
    }

    #[rstest]
    #[case("13812345678", true)]
    #[case("19912345678", true)]
    #[case("12812345678", false)] // second digit out of range
    #[case("1381234567", false)] // too short
    #[case("010-1234567", true)]
    #[case("0571-12345678", true)]
    #[case("05711-1234567", false)] // area code too long
    #[case("010-123456", false)] // number too short
    #[case("abc-1234567", false)]
    fn test_phone_formats(#[case] phone: &str, #[case] ok: bool) {
        assert_eq!(is_valid_phone(phone), ok, "{phone}");
    }

    #[test]
    fn test_collects_all_violations() {
        let input = CompanyInput {
            company_name: String::new(),
            tax_id: "123".to_string(),
            phone: "nope".to_string(),
            bank_account: "12ab".to_string(),
            bank_code: "123".to_string(),
            ..valid_input()
        };
        let Err(AppError::Validation(messages)) = validate(&input) else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn test_bank_account_length_limit() {
        let input = CompanyInput {
            bank_account: "1".repeat(31),
            ..valid_input()
        };
        assert!(validate(&input).is_err());

        let input = CompanyInput {
            bank_account: "1".repeat(30),
            ..valid_input()
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_optional_secondary_phone_checked_when_present() {
        let input = CompanyInput {
            phone2: Some("garbage".to_string()),
            ..valid_input()
        };
        assert!(validate(&input).is_err());

        let input = CompanyInput {
            phone2: Some("0571-7654321".to_string()),
            ..valid_input()
        };
        assert!(validate(&input).is_ok());
    }
}

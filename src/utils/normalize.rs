//! Field normalization for customer data before it reaches the payment gateway.

/// Digit count of an individual taxpayer id (CPF).
pub const CPF_LEN: usize = 11;

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Strips punctuation from a CPF and checks its length.
pub fn normalize_document(document: &str) -> Option<String> {
    let digits = digits_only(document);
    (digits.len() == CPF_LEN).then_some(digits)
}

pub fn normalize_phone(phone: &str) -> String {
    digits_only(phone)
}

/// `12345678` becomes `12345-678`; anything that is not exactly eight digits
/// is returned as its bare digits.
pub fn normalize_zip_code(zip: &str) -> String {
    let digits = digits_only(zip);
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        digits
    }
}

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::{LeadField, LeadInput, NormalizedLead};

const MIN_NAME_CHARS: usize = 2;
const MIN_AGE: f64 = 18.0;
const MAX_AGE: f64 = 100.0;

// local@domain.tld, no whitespace and a single '@'
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Validates and normalizes a raw lead submission.
///
/// Every field is checked, so the error list names all invalid fields in
/// form order (name, age, email). This never panics, whatever the input.
pub fn validate(input: &LeadInput) -> Result<NormalizedLead, Vec<LeadField>> {
    let name = normalize_name(input.nombre.as_ref());
    let age = normalize_age(input.edad.as_ref());
    let email = normalize_email(input.correo.as_ref());

    match (name, age, email) {
        (Some(name), Some(age), Some(email)) => Ok(NormalizedLead { name, age, email }),
        (name, age, email) => {
            let mut fields = Vec::with_capacity(3);
            if name.is_none() {
                fields.push(LeadField::Name);
            }
            if age.is_none() {
                fields.push(LeadField::Age);
            }
            if email.is_none() {
                fields.push(LeadField::Email);
            }
            Err(fields)
        }
    }
}

fn normalize_name(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let trimmed = raw.trim();
    (trimmed.chars().count() >= MIN_NAME_CHARS).then(|| trimmed.to_string())
}

fn normalize_age(value: Option<&Value>) -> Option<u8> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || !(MIN_AGE..=MAX_AGE).contains(&number) {
        return None;
    }

    Some(number.trunc() as u8)
}

fn normalize_email(value: Option<&Value>) -> Option<String> {
    let Value::String(raw) = value? else {
        return None;
    };

    let trimmed = raw.trim();
    EMAIL_PATTERN
        .is_match(trimmed)
        .then(|| trimmed.to_lowercase())
}

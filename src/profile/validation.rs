use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

use super::dto::ProfileInput;
use super::repo_types::ProfileUpdate;
use crate::error::ValidationErrors;
use crate::models::iso_date;

pub const MIN_USERNAME_CHARS: usize = 6;
pub const MAX_BIO_CHARS: usize = 160;
pub const MAX_LONG_BIO_CHARS: usize = 2000;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10,15}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

/// Check every field of `input` and collect all violations. Nothing is written unless
/// this returns `Ok`.
///
/// `today` is the current UTC calendar date; a birth date equal to it is accepted.
pub fn validate(input: ProfileInput, today: Date) -> Result<ProfileUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = trimmed(input.username);
    match &username {
        None => errors.add("username", "Username is required"),
        Some(u) if chars(u) < MIN_USERNAME_CHARS => errors.add(
            "username",
            format!("Username must be at least {MIN_USERNAME_CHARS} characters"),
        ),
        Some(_) => {}
    }

    let full_name = trimmed(input.full_name);
    if full_name.is_none() {
        errors.add("fullName", "Full name is required");
    }

    let email = trimmed(input.email);
    match &email {
        None => errors.add("email", "Email is required"),
        Some(e) if !is_valid_email(e) => errors.add("email", "Invalid email format"),
        Some(_) => {}
    }

    let phone = trimmed(input.phone);
    match &phone {
        None => errors.add("phone", "Phone is required"),
        Some(p) if !PHONE_RE.is_match(p) => errors.add("phone", "Phone must be 10 to 15 digits"),
        Some(_) => {}
    }

    let birth_date = match trimmed(input.birth_date) {
        None => None,
        Some(raw) => match iso_date::parse(&raw) {
            Ok(d) if d > today => {
                errors.add("birthDate", "Birth date cannot be in the future");
                None
            }
            Ok(d) => Some(d),
            Err(_) => {
                errors.add("birthDate", "Birth date must be a YYYY-MM-DD date");
                None
            }
        },
    };

    let bio = trimmed(input.bio);
    if bio.as_deref().is_some_and(|b| chars(b) > MAX_BIO_CHARS) {
        errors.add(
            "bio",
            format!("Bio must be at most {MAX_BIO_CHARS} characters"),
        );
    }

    let long_bio = trimmed(input.long_bio);
    if long_bio.as_deref().is_some_and(|b| chars(b) > MAX_LONG_BIO_CHARS) {
        errors.add(
            "longBio",
            format!("Long bio must be at most {MAX_LONG_BIO_CHARS} characters"),
        );
    }

    match (username, full_name, email, phone) {
        (Some(username), Some(full_name), Some(email), Some(phone)) if errors.is_empty() => {
            Ok(ProfileUpdate {
                username,
                full_name,
                email,
                phone,
                birth_date,
                bio,
                long_bio,
                address: trimmed(input.address),
                profile: input.profile,
            })
        }
        _ => Err(errors),
    }
}

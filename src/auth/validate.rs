use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date, OffsetDateTime};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.]{3,20}$").unwrap();
    // first [middle] last
    static ref FULL_NAME_RE: Regex =
        Regex::new(r"^[\p{L}'-]+(?: [\p{L}'-]+)? [\p{L}'-]+$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn is_valid_full_name(full_name: &str) -> bool {
    FULL_NAME_RE.is_match(full_name)
}

/// At least 8 characters with an uppercase, a lowercase, a digit and a special character.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

pub fn is_valid_birthday(birthday: &str) -> bool {
    parse_birthday(birthday).is_some()
}

/// Parses `YYYY-MM-DD`, rejecting dates in the future.
pub fn parse_birthday(birthday: &str) -> Option<Date> {
    let date = Date::parse(birthday, format_description!("[year]-[month]-[day]")).ok()?;
    (date <= OffsetDateTime::now_utc().date()).then_some(date)
}

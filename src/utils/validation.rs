//! Form validation rules.
//!
//! Checks applied to sign-in, sign-up and library setup input before any
//! request leaves the client. Messages are the ones shown inline next to the
//! offending field.

use log::*;
use regex::Regex;

const EMAIL_PATTERN: &str = r"\S+@\S+\.\S+";
const PHONE_PATTERN: &str = r"^[0-9]{10}$";

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_LIBRARY_NAME_LEN: usize = 3;
pub const MIN_ADDRESS_LEN: usize = 10;

/// Errors describing why a form was refused.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Email or phone is required")]
    IdentifierRequired,

    #[error("Enter valid email or phone")]
    IdentifierInvalid,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Minimum 6 characters")]
    PasswordTooShort,

    #[error("You must agree to the Terms & Conditions")]
    TermsNotAccepted,

    #[error("Library name is required")]
    LibraryNameRequired,

    #[error("Library name must be at least 3 characters")]
    LibraryNameTooShort,

    #[error("Seats must be a number")]
    SeatsNotANumber,

    #[error("At least 1 seat is required")]
    SeatsTooFew,

    #[error("Address is required")]
    AddressRequired,

    #[error("Address must be at least 10 characters")]
    AddressTooShort,
}

/// Sign-in input after normalization.
#[derive(Debug, PartialEq, Eq)]
pub struct SignInForm {
    pub identifier: String,
    pub password: String,
}

/// Sign-up input after normalization.
#[derive(Debug, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub identifier: String,
    pub password: String,
}

/// Library setup input after normalization.
#[derive(Debug, PartialEq, Eq)]
pub struct LibraryForm {
    pub name: String,
    pub seats: u32,
    pub address: String,
}

fn matches(pattern: &str, value: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(value),
        Err(e) => {
            warn!("Failed to compile regex pattern '{}': {}", pattern, e);
            false
        }
    }
}

/// Trim an email or phone identifier, then check its shape. Case is kept as
/// typed.
///
pub fn identifier(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim().to_owned();
    if value.is_empty() {
        return Err(ValidationError::IdentifierRequired);
    }
    if matches(EMAIL_PATTERN, &value) || matches(PHONE_PATTERN, &value) {
        Ok(value)
    } else {
        Err(ValidationError::IdentifierInvalid)
    }
}

pub fn password(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(raw.to_owned())
}

pub fn sign_in(identifier_raw: &str, password_raw: &str, agreed_to_terms: bool) -> Result<SignInForm, ValidationError> {
    let identifier = identifier(identifier_raw)?;
    let password = password(password_raw)?;
    if !agreed_to_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(SignInForm { identifier, password })
}

pub fn sign_up(
    name_raw: &str,
    identifier_raw: &str,
    password_raw: &str,
    agreed_to_terms: bool,
) -> Result<SignUpForm, ValidationError> {
    let name = name_raw.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let identifier = identifier(identifier_raw)?;
    let password = password(password_raw)?;
    if !agreed_to_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(SignUpForm {
        name: name.to_owned(),
        identifier,
        password,
    })
}

/// Seats arrive as text from the command line; anything but a positive whole
/// number is refused.
///
pub fn library(name_raw: &str, seats_raw: &str, address_raw: &str) -> Result<LibraryForm, ValidationError> {
    let name = name_raw.trim();
    if name.is_empty() {
        return Err(ValidationError::LibraryNameRequired);
    }
    if name.chars().count() < MIN_LIBRARY_NAME_LEN {
        return Err(ValidationError::LibraryNameTooShort);
    }

    let seats: i64 = seats_raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::SeatsNotANumber)?;
    if seats < 1 {
        return Err(ValidationError::SeatsTooFew);
    }
    let seats = u32::try_from(seats).map_err(|_| ValidationError::SeatsNotANumber)?;

    let address = address_raw.trim();
    if address.is_empty() {
        return Err(ValidationError::AddressRequired);
    }
    if address.chars().count() < MIN_ADDRESS_LEN {
        return Err(ValidationError::AddressTooShort);
    }

    Ok(LibraryForm {
        name: name.to_owned(),
        seats,
        address: address.to_owned(),
    })
}

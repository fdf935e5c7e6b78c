use crate::errors::AppError;
use garde::Validate;
use serde::Serialize;

/// An address that passed garde's email rule. Used for the sender and for
/// the email-to-SMS gateway recipients.
#[derive(Validate, Clone, Serialize, Debug, PartialEq, Eq)]
pub struct ValidatedEmail(#[garde(email)] pub(crate) String);

impl ValidatedEmail {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        let email = ValidatedEmail(s.trim().to_string());
        email.validate()?;
        Ok(email)
    }
}

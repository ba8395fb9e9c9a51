//! Contact and account forms, validated before anything is sent.

use std::fmt;

use pacas_core::validate::{
    validate_email, validate_password, validate_uk_phone, validate_verification_code,
};
use pacas_core::ValidationError;

use crate::types::RegistrationRequest;

/// The "view details" contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub email: String,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub wants_callback: bool,
}

impl ContactDetails {
    /// Email is required; phone is optional but must be a UK number when given.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let email = validate_email(&self.email)?;
        let phone = match non_blank(self.phone.as_deref()) {
            Some(phone) => Some(validate_uk_phone(phone)?),
            None => None,
        };
        Ok(Self {
            email,
            phone,
            name: non_blank(self.name.as_deref()).map(str::to_owned),
            wants_callback: self.wants_callback,
        })
    }
}

/// The "create account" form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccountDetails {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

impl fmt::Debug for AccountDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDetails")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .finish()
    }
}

impl AccountDetails {
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let email = validate_email(&self.email)?;
        validate_password(&self.password)?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "Please enter your name"));
        }
        let phone = validate_uk_phone(&self.phone)?;
        Ok(Self {
            email,
            password: self.password.clone(),
            name: name.to_owned(),
            phone,
        })
    }
}

/// Account details waiting for the emailed verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    details: AccountDetails,
}

impl PendingRegistration {
    pub(crate) fn new(details: AccountDetails) -> Self {
        Self { details }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.details.email
    }

    #[must_use]
    pub fn details(&self) -> &AccountDetails {
        &self.details
    }

    /// Builds the registration body once the code checks out locally.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on `code` unless it is six digits.
    pub fn registration_request(&self, code: &str) -> Result<RegistrationRequest, ValidationError> {
        let code = validate_verification_code(code)?;
        Ok(RegistrationRequest {
            email: self.details.email.clone(),
            password: self.details.password.clone(),
            name: self.details.name.clone(),
            phone: self.details.phone.clone(),
            code,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountDetails {
        AccountDetails {
            email: " Jo@Example.com ".to_owned(),
            password: "correct horse".to_owned(),
            name: " Jo Bloggs ".to_owned(),
            phone: "07123 456789".to_owned(),
        }
    }

    #[test]
    fn contact_requires_email_only() {
        let contact = ContactDetails {
            email: "jo@example.com".to_owned(),
            phone: Some("   ".to_owned()),
            ..ContactDetails::default()
        };
        let validated = contact.validated().unwrap();
        assert_eq!(validated.phone, None);
        assert_eq!(validated.name, None);

        let missing = ContactDetails::default().validated().unwrap_err();
        assert_eq!(missing.field, "email");
    }

    #[test]
    fn contact_phone_is_validated_when_present() {
        let contact = ContactDetails {
            email: "jo@example.com".to_owned(),
            phone: Some("0000000000".to_owned()),
            ..ContactDetails::default()
        };
        assert_eq!(contact.validated().unwrap_err().field, "phone");
    }

    #[test]
    fn account_details_are_normalised() {
        let validated = account().validated().unwrap();
        assert_eq!(validated.email, "jo@example.com");
        assert_eq!(validated.name, "Jo Bloggs");
        assert_eq!(validated.phone, "07123456789");
    }

    #[test]
    fn account_rejects_short_password_and_missing_name() {
        let short = AccountDetails {
            password: "short".to_owned(),
            ..account()
        };
        assert_eq!(short.validated().unwrap_err().field, "password");

        let nameless = AccountDetails {
            name: "  ".to_owned(),
            ..account()
        };
        assert_eq!(nameless.validated().unwrap_err().field, "name");
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", account());
        assert!(!rendered.contains("correct horse"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn pending_registration_checks_code_length() {
        let pending = PendingRegistration::new(account().validated().unwrap());
        assert_eq!(pending.registration_request("12345").unwrap_err().field, "code");
        let request = pending.registration_request("123456").unwrap();
        assert_eq!(request.email, "jo@example.com");
        assert_eq!(request.code, "123456");
    }
}

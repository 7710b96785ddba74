//! Mock session login.
//!
//! Demo-grade credential check, not a security boundary: any email with a
//! password of at least four characters signs in, and the display name is
//! the email's local part.

use serde::{Deserialize, Serialize};

use clouddrive_core::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

pub fn login(email: &str, password: &str) -> Result<UserProfile, AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Please enter both email and password.".to_string(),
        ));
    }
    if password.len() < 4 {
        return Err(AppError::InvalidInput(
            "Password must be at least 4 characters.".to_string(),
        ));
    }

    let name = email.split('@').next().unwrap_or(email).to_string();
    Ok(UserProfile {
        name,
        email: email.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials_sign_in() {
        let profile = login("alex@example.com", "hunter2").unwrap();
        assert_eq!(profile.name, "alex");
        assert_eq!(profile.email, "alex@example.com");
    }

    #[test]
    fn missing_fields_are_rejected() {
        for (email, password) in [("", "hunter2"), ("alex@example.com", ""), ("", "")] {
            let err = login(email, password).unwrap_err();
            assert_eq!(
                err.client_message(),
                "Please enter both email and password."
            );
        }
    }

    #[test]
    fn short_password_is_rejected() {
        let err = login("alex@example.com", "abc").unwrap_err();
        assert_eq!(err.client_message(), "Password must be at least 4 characters.");
    }

    #[test]
    fn name_falls_back_to_full_email_without_at_sign() {
        let profile = login("not-an-email", "hunter2").unwrap();
        assert_eq!(profile.name, "not-an-email");
    }
}

//! Argon2 password hashing and doctor credential verification.
//!
//! Doctor identity is threaded explicitly into every handler; there is no
//! ambient "current user" anywhere in the process.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use egonet_core::{doctor::Doctor, store::SurveyStore};
use rand_core::OsRng;

use crate::error::ApiError;

/// Hash a freshly chosen password into an argon2 PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check a plaintext password against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Resolve and verify a doctor's credentials, returning the account on
/// success. Unknown email and wrong password produce the same rejection so
/// the response does not reveal which part failed.
pub async fn verify_doctor<S>(
  store: &S,
  email: &str,
  password: &str,
) -> Result<Doctor, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let rejection =
    || ApiError::Unauthorized("Login failed. Incorrect credentials".into());

  let doctor = store.get_doctor(email).await?.ok_or_else(rejection)?;
  if !verify_password(password, &doctor.password_hash) {
    return Err(rejection());
  }
  Ok(doctor)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("secret").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("secret", &phc));
    assert!(!verify_password("wrong", &phc));
  }

  #[test]
  fn garbage_phc_never_verifies() {
    assert!(!verify_password("secret", "not-a-phc-string"));
  }
}

//! bcrypt password handling. Async callers use the `*_blocking` helpers,
//! which run on tokio's blocking pool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Passwords do not match")]
    Mismatch,

    #[error("Password is required")]
    Empty,

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Check a new password against its confirmation field
pub fn ensure_confirmed(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password != confirm {
        return Err(PasswordError::Mismatch);
    }
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    Ok(())
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hash)?)
}

pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost)).await?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_must_match() {
        assert!(ensure_confirmed("hunter2", "hunter2").is_ok());
        assert!(matches!(
            ensure_confirmed("hunter2", "hunter3"),
            Err(PasswordError::Mismatch)
        ));
        assert!(matches!(ensure_confirmed("", ""), Err(PasswordError::Empty)));
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse", 4).unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test]
    async fn blocking_helpers_agree() {
        let hash = hash_password_blocking("s3cret".into(), 4).await.unwrap();
        assert!(verify_password_blocking("s3cret".into(), hash).await.unwrap());
    }
}

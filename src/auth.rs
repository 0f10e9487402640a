use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        user::{User, GENDERS, SECURITY_QUESTIONS},
        wire::SignupRequest,
    },
    state::AppState,
};

pub const MIN_AGE: i64 = 18;
pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_user(state: &AppState, signup: &SignupRequest) -> Result<User, AppError> {
    validate_signup(signup)?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&signup.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let password_hash = hash_secret(&signup.password)?;
    let security_answer_hash = hash_secret(&signup.security_answer)?;

    let result = sqlx::query(
        "INSERT INTO users (first_name, last_name, gender, age, email, password_hash, \
         security_question, security_answer_hash, profile_completed, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(&signup.first_name)
    .bind(&signup.last_name)
    .bind(&signup.gender)
    .bind(signup.age)
    .bind(&signup.email)
    .bind(&password_hash)
    .bind(&signup.security_question)
    .bind(&security_answer_hash)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    fetch_user(state, result.last_insert_rowid()).await
}

pub async fn authenticate_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_secret(password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }
    Ok(user)
}

pub async fn fetch_user(state: &AppState, user_id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub fn hash_secret(secret: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))
}

pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

fn validate_signup(signup: &SignupRequest) -> Result<(), AppError> {
    if signup.first_name.trim().is_empty() || signup.last_name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    if !GENDERS.contains(&signup.gender.as_str()) {
        return Err(AppError::Validation("Unknown gender option".into()));
    }
    if signup.age < MIN_AGE {
        return Err(AppError::Validation(
            "You must be 18 or older to sign up".into(),
        ));
    }
    validate_email(&signup.email)?;
    validate_password(&signup.password)?;
    if !SECURITY_QUESTIONS.contains(&signup.security_question.as_str()) {
        return Err(AppError::Validation("Unknown security question".into()));
    }
    if signup.security_answer.trim().is_empty() {
        return Err(AppError::Validation(
            "Security answer must not be empty".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email address".into()))
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".into(),
        ));
    }
    if !password.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one number".into(),
        ));
    }
    if !password.chars().any(|ch| ch.is_alphabetic()) {
        return Err(AppError::Validation(
            "Password must contain at least one letter".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            first_name: "Asha".into(),
            last_name: "Nair".into(),
            gender: "Female".into(),
            age: 24,
            email: "asha@example.com".into(),
            password: "wander1ng".into(),
            security_question: SECURITY_QUESTIONS[0].into(),
            security_answer: "goa".into(),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(validate_signup(&signup()).is_ok());
    }

    #[test]
    fn minors_are_rejected() {
        let mut req = signup();
        req.age = 17;
        assert!(matches!(
            validate_signup(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn password_rules_require_length_letter_and_digit() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("wander1ng").is_ok());
    }

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("asha").is_err());
        assert!(validate_email("asha@nodot").is_err());
    }

    #[test]
    fn unknown_security_questions_are_rejected() {
        let mut req = signup();
        req.security_question = "What is your quest?".into();
        assert!(matches!(
            validate_signup(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_secret("wander1ng").expect("hashes");
        assert!(verify_secret("wander1ng", &hash));
        assert!(!verify_secret("wrong-pass1", &hash));
        assert!(!verify_secret("wander1ng", "not-a-hash"));
    }
}

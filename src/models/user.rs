use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Verification links stay valid for seven days.
pub const VERIFICATION_TOKEN_TTL_DAYS: i64 = 7;

/// Veterinarian (or veterinary student) account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub clinic_name: Option<String>,
    pub order_number: Option<String>,
    pub specialty: Option<String>,
    pub is_student: bool,
    pub school_name: Option<String>,
    pub is_verified: bool,
    #[serde(skip)]
    pub verification_token: Option<String>,
    #[serde(skip)]
    pub verification_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub clinic_name: Option<String>,
    pub order_number: Option<String>,
    pub specialty: Option<String>,
    pub is_student: bool,
    pub school_name: Option<String>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        hashed_password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        profile: ProfileFields,
        verification_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            hashed_password: hashed_password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            clinic_name: profile.clinic_name,
            order_number: profile.order_number,
            specialty: profile.specialty,
            is_student: profile.is_student,
            school_name: profile.school_name,
            is_verified: false,
            verification_token: Some(verification_token),
            verification_token_expires: Some(now + Duration::days(VERIFICATION_TOKEN_TTL_DAYS)),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn verification_token_valid(&self) -> bool {
        match (&self.verification_token, self.verification_token_expires) {
            (Some(_), Some(expires)) => Utc::now() < expires,
            _ => false,
        }
    }

    /// Mark the account verified and consume the token.
    pub fn verify_email(&mut self) {
        self.is_verified = true;
        self.verification_token = None;
        self.verification_token_expires = None;
        self.touch();
    }

    /// Issue a fresh verification token, restarting the validity window.
    pub fn rotate_verification_token(&mut self, token: String) {
        self.verification_token = Some(token);
        self.verification_token_expires =
            Some(Utc::now() + Duration::days(VERIFICATION_TOKEN_TTL_DAYS));
        self.touch();
    }

    pub fn apply_profile(&mut self, profile: ProfileFields) {
        self.clinic_name = profile.clinic_name;
        self.order_number = profile.order_number;
        self.specialty = profile.specialty;
        self.is_student = profile.is_student;
        self.school_name = profile.school_name;
        self.touch();
    }
}

/// Short-lived bearer token accepted by the API, stored hashed.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(user_id: Uuid, token_hash: String, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            user_id,
            expires_at: now + Duration::minutes(ttl_minutes),
            created_at: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Long-lived token backing session renewal, stored hashed.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshToken {
    pub fn new(user_id: Uuid, token_hash: String, ttl_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at: now + Duration::days(ttl_days),
            created_at: now,
            revoked: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.revoked && Utc::now() < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "vet@clinique.fr",
            "hashed",
            "Claire",
            "Moreau",
            ProfileFields::default(),
            "tok".to_string(),
        )
    }

    #[test]
    fn new_user_starts_unverified_with_token() {
        let user = test_user();
        assert!(!user.is_verified);
        assert!(user.verification_token_valid());
    }

    #[test]
    fn verify_email_consumes_token() {
        let mut user = test_user();
        user.verify_email();
        assert!(user.is_verified);
        assert!(user.verification_token.is_none());
        assert!(!user.verification_token_valid());
    }

    #[test]
    fn expired_token_is_invalid() {
        let mut user = test_user();
        user.verification_token_expires = Some(Utc::now() - Duration::hours(1));
        assert!(!user.verification_token_valid());
    }

    #[test]
    fn revoked_refresh_token_is_invalid() {
        let mut token = RefreshToken::new(Uuid::new_v4(), "hash".into(), 30);
        assert!(token.is_valid());
        token.revoked = true;
        assert!(!token.is_valid());
    }

    #[test]
    fn serialized_user_hides_credentials() {
        let json = serde_json::to_string(&test_user()).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("verification_token"));
    }
}

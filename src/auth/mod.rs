pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::normalize_email;
use crate::models::User;

pub use extractors::Authenticated;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginRequest {
    /// Applies the same trimming as signup, so credentials match what was stored.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
        }
    }
}

/// Response of signup and login: the account and the freshly issued session token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "mike@example.com".to_string(),
            password: "ahsgT12#g".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "mikeexample.com".to_string(),
            password: "ahsgT12#g".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "mike@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_auth_response_shape() {
        let user = User::new(NewUser {
            name: "Ola".to_string(),
            email: "olaola@example.com".to_string(),
            password_hash: "hash".to_string(),
            age: 0,
        });
        let json = serde_json::to_value(AuthResponse {
            user,
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["user"]["email"], "olaola@example.com");
        assert!(json["user"].get("tokens").is_none());
    }
}

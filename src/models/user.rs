//! Session claims of an authenticated establishment member

use serde::{Deserialize, Serialize};

use super::enums::Role;
use crate::error::AppError;

/// JWT claims. Tokens are issued by the authentication service; this
/// server only validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub establishment_id: i32,
    pub role: Role,
    /// Staff record of the user, when the user is a service provider
    pub staff_id: Option<i32>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    // Authorization checks
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin rights required".to_string()))
        }
    }

    /// Staff id the caller is restricted to, or None for admins
    pub fn staff_scope(&self) -> Result<Option<i32>, AppError> {
        match self.role {
            Role::Admin => Ok(None),
            Role::Staff => self.staff_id.map(Some).ok_or_else(|| {
                AppError::Authorization("Staff account is not linked to a staff member".to_string())
            }),
        }
    }

    /// Admins may act on any staff member, staff only on themselves
    pub fn require_staff_access(&self, staff_id: i32) -> Result<(), AppError> {
        match self.staff_scope()? {
            None => Ok(()),
            Some(own) if own == staff_id => Ok(()),
            Some(_) => Err(AppError::Authorization(
                "Staff members can only access their own data".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, staff_id: Option<i32>) -> UserClaims {
        UserClaims {
            sub: "user@salon.app".to_string(),
            user_id: 7,
            establishment_id: 1,
            role,
            staff_id,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let c = claims(Role::Staff, Some(4));
        let token = c.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.staff_id, Some(4));
        assert_eq!(parsed.role, Role::Staff);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_staff_scope() {
        assert_eq!(claims(Role::Admin, None).staff_scope().unwrap(), None);
        assert_eq!(claims(Role::Staff, Some(4)).staff_scope().unwrap(), Some(4));
        assert!(claims(Role::Staff, None).staff_scope().is_err());
    }

    #[test]
    fn test_staff_access() {
        let staff = claims(Role::Staff, Some(4));
        assert!(staff.require_staff_access(4).is_ok());
        assert!(staff.require_staff_access(5).is_err());
        assert!(staff.require_admin().is_err());
        assert!(claims(Role::Admin, None).require_staff_access(5).is_ok());
    }
}

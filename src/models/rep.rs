//! Field representative identity types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One row of the rep directory sheet (`Area Code | User | PIN`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub area_code: String,
    pub name: String,
    pub pin: String,
}

/// Resolved identity returned by PIN authentication.
///
/// `area_code` is either the unrestricted sentinel `"All"` or a comma-joined
/// list of codes when the same PIN appears on several directory rows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepProfile {
    pub name: String,
    pub area_code: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "PIN is required"))]
    pub pin: String,
}

/// Session token claims carrying the rep's access-scope profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepClaims {
    /// Rep display name
    pub sub: String,
    pub area_code: String,
    pub exp: i64,
    pub iat: i64,
}

impl RepClaims {
    /// Create a new session token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse a session token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn profile(&self) -> RepProfile {
        RepProfile {
            name: self.sub.clone(),
            area_code: self.area_code.clone(),
        }
    }
}

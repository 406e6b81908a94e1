use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

use crate::models::{AuthenticationResponse, Role, Student};

/// The authenticated user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<Student>,
    pub role: Role,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    role: Option<Role>,
}

impl Session {
    /// Builds a session from a bare bearer token, reading the role from the
    /// token's `role` claim. Tokens without a readable claim get [`Role::User`].
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let role = token_role(&token).unwrap_or_default();

        Self {
            token,
            user: None,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn require_admin(&self) -> Result<(), crate::Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(crate::Error::Forbidden)
        }
    }
}

impl From<AuthenticationResponse> for Session {
    fn from(AuthenticationResponse { token, user, role }: AuthenticationResponse) -> Self {
        Self {
            token,
            user: Some(user),
            role,
        }
    }
}

fn token_role(token: &str) -> Option<Role> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&decoded).ok()?;

    claims.role
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    use crate::models::{AuthenticationResponse, Role, Student, StudentId};

    use super::Session;

    fn token(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_role_claim() {
        let session = Session::from_token(token(r#"{"sub":"admin@example.com","role":"ADMIN"}"#));
        assert!(session.is_admin());
        assert!(session.require_admin().is_ok());

        let session = Session::from_token(token(r#"{"sub":"jana@example.com"}"#));
        assert_eq!(session.role, Role::User);
        assert!(matches!(session.require_admin(), Err(crate::Error::Forbidden)));
    }

    #[test]
    fn test_opaque_token() {
        let session = Session::from_token("not-a-jwt");
        assert_eq!(session.role, Role::User);
        assert_eq!(session.authorization(), "Bearer not-a-jwt");
    }

    #[test]
    fn test_from_response() {
        let session = Session::from(AuthenticationResponse {
            token: String::from("t"),
            user: Student {
                id: StudentId(1),
                name: String::from("Admin"),
                email: String::from("admin@example.com"),
                role: Some(Role::Admin),
            },
            role: Role::Admin,
        });

        assert!(session.is_admin());
        assert_eq!(session.user.map(|user| user.id), Some(StudentId(1)));
    }
}

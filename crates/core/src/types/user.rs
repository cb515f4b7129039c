//! User identity record.

use serde::{Deserialize, Serialize};

use crate::{Role, UserId};

/// A MediStore account as returned by `/auth/me` and `/auth/login`.
///
/// The API owns this record. The storefront keeps a cached copy in the
/// visitor's session which may lag behind the API until the next fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Account status string (e.g. `ACTIVE`, `BANNED`); not interpreted here.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Whether the user holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_api_user() {
        let json = r#"{"id":1,"name":"Rahim","email":"rahim@example.com","role":"CUSTOMER","status":"ACTIVE"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.avatar, None);
        assert!(user.has_role(Role::Customer));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn test_missing_status_defaults_to_empty() {
        let json = r#"{"id":2,"name":"Karim","email":"k@example.com","role":"SELLER"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.status.is_empty());
    }

    #[test]
    fn test_avatar_omitted_when_absent() {
        let user = User {
            id: UserId::new(3),
            name: "Nadia".to_string(),
            email: "nadia@example.com".to_string(),
            role: Role::Admin,
            status: "ACTIVE".to_string(),
            avatar: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("avatar"));
    }
}

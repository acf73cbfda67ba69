use serde::{Deserialize, Serialize};

/// Body of the login and register requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login payload. Only the token is mandatory; the admin user
/// and profile blobs are kept opaque and handed back to the UI as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "adminUser", default)]
    pub admin_user: Option<serde_json::Value>,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
    #[serde(rename = "isAuthorLogin", default)]
    pub is_author_login: bool,
}

/// First/last name edit of a user or author row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameUpdate {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /api/admin/addcategories`.
///
/// Keywords travel as the comma-separated string the admin typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub keywords: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_minimal() {
        let resp: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(resp.token, "abc");
        assert!(resp.admin_user.is_none());
        assert!(!resp.is_author_login);
    }

    #[test]
    fn test_login_response_without_token_fails() {
        assert!(serde_json::from_str::<LoginResponse>(r#"{"message":"ok"}"#).is_err());
    }

    #[test]
    fn test_login_response_full() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"token":"t","adminUser":{"email":"root@example.com"},"profile":{"bio":"x"},"isAuthorLogin":true}"#,
        )
        .unwrap();
        assert_eq!(resp.admin_user.unwrap()["email"], "root@example.com");
        assert!(resp.is_author_login);
    }
}

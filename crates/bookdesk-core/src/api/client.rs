//! API client for the audiobook catalog admin service.
//!
//! This module provides the `ApiClient` struct: every request goes through
//! one place that attaches the JSON content type and bearer token, checks the
//! status, and signs the admin out on a 401.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::endpoints::{Endpoint, Mutation};
use super::error::{ApiError, ApiResult};
use super::mutation::MutationRequest;
use crate::auth::{AuthAction, SharedAuth};
use crate::models::{
    Audiobook, Author, Category, Credentials, Entity, ListQuery, LoginResponse, Page, User,
};
use crate::stats::CatalogCounts;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the admin backend
pub const DEFAULT_BASE_URL: &str = "https://audiblebooks-admin-backend.onrender.com";

/// HTTP request timeout in seconds.
/// The hosted backend cold-starts slowly; 30s covers that without hanging the UI forever.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Count endpoints answer with one of these field names.
#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(alias = "numUsers", alias = "numAuthors", alias = "numAudiobooks")]
    count: u64,
}

/// API client for the admin backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    auth: SharedAuth,
}

impl ApiClient {
    /// Create a new API client talking to `base_url`, reading credentials from `auth`
    pub fn new(base_url: &str, auth: SharedAuth) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            auth,
        })
    }

    pub fn auth(&self) -> &SharedAuth {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers sent with every request: JSON content type, plus the bearer
    /// token whenever one is stored.
    pub fn prepare_headers(&self) -> ApiResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.auth.token() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidResponse("Stored token is not a valid header value".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// A 401 signs the admin out before the error is handed back.
    async fn check_response(&self, path: &str, response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        if error.is_unauthorized() {
            warn!(path = path, "Received 401, clearing credentials");
            self.auth.dispatch(AuthAction::LoggedOut);
        }
        Err(error)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
        body: Option<&B>,
    ) -> ApiResult<String> {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending request");

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.prepare_headers()?);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let response = self.check_response(path, response).await?;
        Ok(response.text().await?)
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let text = self.send(method, path, query, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    // ===== Authentication =====

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let mutation = Mutation::Login;
        self.request(mutation.method(), mutation.path(), None, Some(credentials))
            .await
    }

    /// Register a new admin account. The response body is passed through untouched.
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<Value> {
        let mutation = Mutation::Register;
        let text = self
            .send(mutation.method(), mutation.path(), None, Some(credentials))
            .await?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    // ===== Paginated Lists =====

    /// Fetch one page of any entity kind's list endpoint.
    pub async fn fetch_page<T: Entity + DeserializeOwned>(&self, query: &ListQuery) -> ApiResult<Page<T>> {
        let endpoint = Endpoint::list_of(T::KIND);
        let body: Value = self
            .request(endpoint.method(), endpoint.path(), Some(query), None::<&()>)
            .await?;
        parse_page(body, T::KIND.envelope_field())
    }

    pub async fn fetch_users(&self, query: &ListQuery) -> ApiResult<Page<User>> {
        self.fetch_page(query).await
    }

    pub async fn fetch_authors(&self, query: &ListQuery) -> ApiResult<Page<Author>> {
        self.fetch_page(query).await
    }

    pub async fn fetch_audiobooks(&self, query: &ListQuery) -> ApiResult<Page<Audiobook>> {
        self.fetch_page(query).await
    }

    pub async fn fetch_categories(&self, query: &ListQuery) -> ApiResult<Page<Category>> {
        self.fetch_page(query).await
    }

    /// Fetch every audiobook written by one author
    pub async fn fetch_author_audiobooks(&self, author_id: &str) -> ApiResult<Vec<Audiobook>> {
        let endpoint = Endpoint::AudiobooksOfAuthor;
        let body = serde_json::json!({ "authorId": author_id });
        self.request(endpoint.method(), endpoint.path(), None, Some(&body))
            .await
    }

    // ===== Counts =====

    pub async fn fetch_count(&self, endpoint: Endpoint) -> ApiResult<u64> {
        let response: CountResponse = self
            .request(endpoint.method(), endpoint.path(), None, None::<&()>)
            .await?;
        Ok(response.count)
    }

    /// Fetch all three catalog counts concurrently
    pub async fn fetch_counts(&self) -> ApiResult<CatalogCounts> {
        let (users, authors, audiobooks) = futures::try_join!(
            self.fetch_count(Endpoint::UsersCount),
            self.fetch_count(Endpoint::AuthorsCount),
            self.fetch_count(Endpoint::AudiobooksCount),
        )?;
        Ok(CatalogCounts {
            users,
            authors,
            audiobooks,
        })
    }

    // ===== Mutations =====

    /// Send a catalog write. Whatever the server answers with on success is ignored;
    /// callers refetch through cache invalidation.
    pub async fn perform(&self, request: &MutationRequest) -> ApiResult<()> {
        let mutation = request.mutation();
        self.send(mutation.method(), mutation.path(), None, Some(&request.body()))
            .await?;
        Ok(())
    }
}

/// Split a `{ <field>: [...], total: n }` envelope into a typed page.
/// Any other shape is rejected.
pub fn parse_page<T: DeserializeOwned>(body: Value, field: &str) -> ApiResult<Page<T>> {
    let mut object = match body {
        Value::Object(map) => map,
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "expected an object with `{}`, got {}",
                field,
                json_kind(&other)
            )))
        }
    };

    let rows = object
        .remove(field)
        .ok_or_else(|| ApiError::InvalidResponse(format!("missing `{}` in list response", field)))?;
    let rows: Vec<T> = serde_json::from_value(rows)
        .map_err(|e| ApiError::InvalidResponse(format!("malformed `{}`: {}", field, e)))?;

    let total = object
        .get("total")
        .and_then(Value::as_u64)
        .ok_or_else(|| ApiError::InvalidResponse("missing or non-numeric `total`".to_string()))?;

    Ok(Page::new(rows, total))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthState, SessionData};
    use chrono::Utc;
    use serde_json::json;

    fn signed_in(token: &str) -> SharedAuth {
        SharedAuth::new(AuthState::new(Some(SessionData {
            token: token.to_string(),
            email: "admin@example.com".to_string(),
            admin_user: None,
            profile: None,
            is_author_login: false,
            remember_me: false,
            created_at: Utc::now(),
        })))
    }

    #[test]
    fn test_headers_include_bearer_when_signed_in() {
        let api = ApiClient::new("http://localhost:1/", signed_in("abc123")).unwrap();
        let headers = api.prepare_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc123");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_headers_omit_authorization_when_signed_out() {
        let api = ApiClient::new("http://localhost:1", SharedAuth::default()).unwrap();
        let headers = api.prepare_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiClient::new("http://localhost:1///", SharedAuth::default()).unwrap();
        assert_eq!(api.url("/api/admin/login"), "http://localhost:1/api/admin/login");
    }

    #[test]
    fn test_parse_page_users() {
        let body = json!({
            "users": [
                {"_id": "1", "first_name": "A", "last_name": "B", "email": "a@b.c"},
                {"_id": "2", "first_name": "C", "last_name": "D", "email": "c@d.e"}
            ],
            "total": 23
        });
        let page: Page<User> = parse_page(body, "users").unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total, 23);
        assert_eq!(page.page_count(5), 5);
    }

    #[test]
    fn test_parse_page_fails_closed() {
        let missing_rows = parse_page::<User>(json!({"total": 3}), "users");
        assert!(matches!(missing_rows, Err(ApiError::InvalidResponse(_))));

        let missing_total = parse_page::<User>(json!({"users": []}), "users");
        assert!(matches!(missing_total, Err(ApiError::InvalidResponse(_))));

        let bare_array = parse_page::<User>(json!([]), "users");
        assert!(matches!(bare_array, Err(ApiError::InvalidResponse(_))));

        let bad_row = parse_page::<Category>(json!({"categories": [{"_id": "c"}], "total": 1}), "categories");
        assert!(matches!(bad_row, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_page_empty_is_valid() {
        let page: Page<Author> = parse_page(json!({"authors": [], "total": 0}), "authors").unwrap();
        assert!(page.is_empty());
        assert_eq!(page.page_count(5), 0);
    }

    #[test]
    fn test_count_response_aliases() {
        for body in [r#"{"numUsers":4}"#, r#"{"numAuthors":4}"#, r#"{"numAudiobooks":4}"#] {
            let parsed: CountResponse = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.count, 4);
        }
    }
}

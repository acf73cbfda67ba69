//! End-to-end flows against a local fake admin backend.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use bookdesk_core::api::{ApiClient, ApiError, Endpoint, MutationRequest};
use bookdesk_core::auth::{AuthAction, AuthState, SessionData, SharedAuth};
use bookdesk_core::cache::{QueryCache, QueryKey, Tag};
use bookdesk_core::forms::{CategoryForm, ValidationError};
use bookdesk_core::listing::ListController;
use bookdesk_core::models::{Credentials, EntityKind, ListQuery, Page, User};
use bookdesk_core::notify::Notifications;
use bookdesk_core::routing::{resolve, Resolution, Route};
use chrono::Utc;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Log = Arc<Mutex<Vec<String>>>;

/// Start a server answering every request with `route(method, path)`.
/// Returns its base URL and a log of raw requests received.
async fn fake_backend<F>(route: F) -> (String, Log)
where
    F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::default();
    let route = Arc::new(route);

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let log = server_log.clone();
            let route = route.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut socket).await;
                let mut parts = raw.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();
                let path = target.split('?').next().unwrap_or_default().to_string();
                log.lock().unwrap().push(raw);

                let (status, body) = route(&method, &path);
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), log)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn signed_in() -> SharedAuth {
    let auth = SharedAuth::default();
    auth.dispatch(AuthAction::LoggedIn(SessionData {
        token: "tok-123".to_string(),
        email: "admin@example.com".to_string(),
        admin_user: None,
        profile: None,
        is_author_login: false,
        remember_me: false,
        created_at: Utc::now(),
    }));
    auth
}

fn five_users() -> String {
    let rows: Vec<_> = (0..5)
        .map(|i| json!({"_id": format!("u{}", i), "first_name": "F", "last_name": "L", "email": "x@y.z"}))
        .collect();
    json!({"users": rows, "total": 23}).to_string()
}

#[tokio::test]
async fn unauthorized_response_signs_out_and_guard_redirects() {
    let (base, _log) = fake_backend(|_, _| (401, r#"{"message":"jwt expired"}"#.to_string())).await;
    let auth = signed_in();
    let api = ApiClient::new(&base, auth.clone()).unwrap();

    let result = api.fetch_users(&ListQuery::new(1, 5, "")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(!auth.is_logged_in());
    assert_eq!(
        resolve(Route::Users, &auth.snapshot()),
        Resolution::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn paging_through_users_reports_page_two_of_five() {
    let (base, log) = fake_backend(|method, path| match (method, path) {
        ("GET", "/api/admin/userslist") => (200, five_users()),
        _ => (404, String::new()),
    })
    .await;
    let api = ApiClient::new(&base, signed_in()).unwrap();
    let mut users: ListController<User> = ListController::new(EntityKind::User, 5);
    let now = Instant::now();

    let first = users.poll(now).unwrap();
    let page = api.fetch_users(&first).await.unwrap();
    assert!(users.on_loaded(&first, page));

    users.next_page();
    let second = users.poll(now).unwrap();
    let page = api.fetch_users(&second).await.unwrap();
    assert!(users.on_loaded(&second, page));
    assert_eq!(users.page_label(), "Page 2 of 5");
    assert_eq!(users.rows().len(), 5);

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    let second_request = requests[1].to_lowercase();
    assert!(second_request.starts_with("get /api/admin/userslist?page=2&limit=5 "));
    assert!(!second_request.contains("searchterm"));
    assert!(second_request.contains("authorization: bearer tok-123"));
    assert!(second_request.contains("content-type: application/json"));
}

#[tokio::test]
async fn search_term_is_sent_when_present() {
    let (base, log) = fake_backend(|_, _| (200, json!({"authors": [], "total": 0}).to_string())).await;
    let api = ApiClient::new(&base, signed_in()).unwrap();

    let page = api.fetch_authors(&ListQuery::new(1, 5, "tolkien")).await.unwrap();
    assert!(page.is_empty());
    assert!(log.lock().unwrap()[0].contains("searchTerm=tolkien"));
}

#[tokio::test]
async fn delete_refetches_the_active_list() {
    let (base, log) = fake_backend(|method, path| match (method, path) {
        ("DELETE", "/api/admin/deleteuser") => (200, r#"{"message":"deleted"}"#.to_string()),
        _ => (200, five_users()),
    })
    .await;
    let api = ApiClient::new(&base, signed_in()).unwrap();
    let mut cache: QueryCache<Page<User>> = QueryCache::new();
    let mut users: ListController<User> = ListController::new(EntityKind::User, 5);
    let now = Instant::now();

    let query = users.poll(now).unwrap();
    let key = QueryKey::new(Endpoint::UsersList, &query);
    cache.subscribe(&key, now);
    let page = api.fetch_users(&query).await.unwrap();
    cache.insert(key.clone(), page.clone(), now);
    users.on_loaded(&query, page);
    assert!(!cache.needs_fetch(&key));

    let request = MutationRequest::delete(EntityKind::User, "u3");
    api.perform(&request).await.unwrap();
    let tag = request.mutation().invalidates().unwrap();
    assert_eq!(tag, Tag::User);
    let refetch = cache.invalidate(tag);
    assert_eq!(refetch, vec![key.clone()]);
    users.on_row_deleted();

    let again = users.poll(now).unwrap();
    assert_eq!(QueryKey::new(Endpoint::UsersList, &again), key);
    assert!(cache.needs_fetch(&key));

    let delete_request = log.lock().unwrap()[1].clone();
    assert!(delete_request.starts_with("DELETE /api/admin/deleteuser "));
    assert!(delete_request.ends_with(r#"{"userId":"u3"}"#));
}

#[tokio::test]
async fn server_error_message_shown_inline() {
    let (base, _log) = fake_backend(|_, _| (500, r#"{"message":"db down"}"#.to_string())).await;
    let auth = signed_in();
    let api = ApiClient::new(&base, auth.clone()).unwrap();
    let mut users: ListController<User> = ListController::new(EntityKind::User, 5);

    let query = users.poll(Instant::now()).unwrap();
    let err = api.fetch_users(&query).await.unwrap_err();
    users.on_failed(&query, err.user_message());

    assert_eq!(users.error(), Some("db down"));
    assert!(!users.show_no_results());
    // Only a 401 signs out
    assert!(auth.is_logged_in());
}

#[tokio::test]
async fn malformed_list_fails_closed() {
    let (base, _log) = fake_backend(|_, _| (200, r#"[{"_id":"u1"}]"#.to_string())).await;
    let api = ApiClient::new(&base, signed_in()).unwrap();
    let result = api.fetch_users(&ListQuery::new(1, 5, "")).await;
    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}

#[tokio::test]
async fn empty_category_name_never_reaches_the_server() {
    let (_base, log) = fake_backend(|_, _| (200, "{}".to_string())).await;
    let mut notifications = Notifications::new();
    let mut form = CategoryForm::default();
    form.name = "   ".to_string();

    match form.validate() {
        Ok(_) => panic!("blank category name accepted"),
        Err(e) => {
            assert_eq!(e, ValidationError::EmptyCategoryName);
            notifications.error(e.to_string(), Instant::now());
        }
    }

    assert_eq!(
        notifications.latest().map(|t| t.message.as_str()),
        Some("Category name cannot be empty.")
    );
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn counts_are_fetched_together() {
    let (base, _log) = fake_backend(|_, path| match path {
        "/api/admin/getuserscount" => (200, r#"{"numUsers":12}"#.to_string()),
        "/api/admin/getauthorscount" => (200, r#"{"numAuthors":4}"#.to_string()),
        "/api/admin/getaudiobookscount" => (200, r#"{"numAudiobooks":31}"#.to_string()),
        _ => (404, String::new()),
    })
    .await;
    let api = ApiClient::new(&base, signed_in()).unwrap();

    let counts = api.fetch_counts().await.unwrap();
    assert_eq!((counts.users, counts.authors, counts.audiobooks), (12, 4, 31));
}

#[tokio::test]
async fn login_stores_token_for_later_requests() {
    let (base, log) = fake_backend(|_, path| match path {
        "/api/admin/login" => (
            200,
            json!({"token": "fresh", "adminUser": {"name": "Root"}}).to_string(),
        ),
        _ => (200, json!({"categories": [], "total": 0}).to_string()),
    })
    .await;
    let auth = SharedAuth::new(AuthState::default());
    let api = ApiClient::new(&base, auth.clone()).unwrap();

    let credentials = Credentials {
        email: "admin@example.com".to_string(),
        password: "secret".to_string(),
    };
    let response = api.login(&credentials).await.unwrap();
    let session = SessionData::from_login(&credentials.email, response, false);
    assert_eq!(session.display_name(), "Root");
    auth.dispatch(AuthAction::LoggedIn(session));

    assert_eq!(resolve(Route::Login, &auth.snapshot()), Resolution::Redirect(Route::Home));
    api.fetch_categories(&ListQuery::new(1, 5, "")).await.unwrap();

    let requests = log.lock().unwrap().clone();
    assert!(!requests[0].to_lowercase().contains("authorization"));
    assert!(requests[1].to_lowercase().contains("authorization: bearer fresh"));
}

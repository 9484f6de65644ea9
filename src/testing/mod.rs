//! In-memory [`Repository`] and request helpers for router-level tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::auth::{SubjectId, TokenService};
use crate::database::{DatabaseError, Repository, Resource, Row};
use crate::pagination::PageSize;
use crate::routes;
use crate::state::AppState;
use crate::validation::ValidatedRecord;

pub const TEST_SECRET: &[u8] = b"router-test-secret";
pub const TEST_PAGE_SIZE: i64 = 3;

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<HashMap<Resource, BTreeMap<i64, Row>>>,
}

impl MemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Put a row in place with a fixed id
    pub fn seed(&self, resource: Resource, id: i64, mut row: Row) {
        row.insert("id".to_string(), Value::from(id));
        self.tables.lock().unwrap().entry(resource).or_default().insert(id, row);
    }

    pub fn row(&self, resource: Resource, id: i64) -> Option<Row> {
        self.tables.lock().unwrap().get(&resource).and_then(|t| t.get(&id).cloned())
    }
}

fn same_id(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a.and_then(SubjectId::from_json), b.and_then(SubjectId::from_json)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn insert(&self, resource: Resource, record: &ValidatedRecord) -> Result<i64, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(resource).or_default();
        let id = table.keys().next_back().map_or(1, |last| last + 1);
        let mut row = record.to_record();
        row.insert("id".to_string(), Value::from(id));
        table.insert(id, row);
        Ok(id)
    }

    async fn find_by_id(&self, resource: Resource, id: i64) -> Result<Option<Row>, DatabaseError> {
        Ok(self.row(resource, id))
    }

    async fn update_by_id(&self, resource: Resource, id: i64, record: &ValidatedRecord) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.get_mut(&resource).and_then(|t| t.get_mut(&id)) else {
            return Ok(false);
        };
        for (key, value) in record.iter() {
            row.insert(key.to_string(), value.clone());
        }
        Ok(true)
    }

    async fn delete_by_id(&self, resource: Resource, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.get_mut(&resource).and_then(|t| t.remove(&id)).is_some())
    }

    async fn list(&self, resource: Resource) -> Result<Vec<Row>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(&resource).map(|t| t.values().cloned().collect()).unwrap_or_default())
    }

    async fn count(&self, resource: Resource) -> Result<i64, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(&resource).map_or(0, |t| t.len() as i64))
    }

    async fn list_by_owner(&self, resource: Resource, owner: SubjectId) -> Result<Vec<Row>, DatabaseError> {
        let Some(column) = resource.owner_column() else {
            return Ok(Vec::new());
        };
        let owner = Value::from(owner.get());
        let rows = self.list(resource).await?;
        Ok(rows.into_iter().filter(|r| same_id(r.get(column), Some(&owner))).collect())
    }

    async fn count_reviews_by(&self, review: &ValidatedRecord) -> Result<i64, DatabaseError> {
        let rows = self.list(Resource::Review).await?;
        let count = rows
            .iter()
            .filter(|r| same_id(r.get("userid"), review.get("userid")))
            .filter(|r| same_id(r.get("businessid"), review.get("businessid")))
            .count();
        Ok(count as i64)
    }

    async fn password_digest(&self, user: SubjectId) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .row(Resource::User, user.get())
            .and_then(|r| r.get("password").and_then(Value::as_str).map(str::to_string)))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub fn test_state(repository: Arc<MemoryRepository>) -> AppState {
    let tokens = TokenService::with_default_validity(TEST_SECRET).unwrap();
    AppState::new(repository, tokens, PageSize::new(TEST_PAGE_SIZE).unwrap(), 4)
}

pub fn test_app(repository: Arc<MemoryRepository>) -> Router {
    routes::app(test_state(repository), &[])
}

/// Send one request and return the status with the parsed JSON body (Null if empty)
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use serde_json::json;

    fn business(owner: i64, name: &str) -> Value {
        json!({
            "ownerid": owner,
            "name": name,
            "address": "1 Main St",
            "city": "Corvallis",
            "state": "OR",
            "zip": "97330",
            "phone": "555-0100",
            "category": "Restaurant",
            "subcategory": "Pizza"
        })
    }

    fn seed_user(repo: &MemoryRepository, id: i64, password: &str) {
        let row = json!({
            "name": "Test User",
            "email": "user@example.com",
            "password": hash_password(password, 4).unwrap(),
            "admin": false
        });
        repo.seed(Resource::User, id, row.as_object().cloned().unwrap());
    }

    async fn login(app: &Router, id: Value, password: &str) -> String {
        let (status, body) = send(app, Method::POST, "/users/login", None, Some(json!({"id": id, "password": password}))).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn owner_scoped_access_end_to_end() {
        let repo = MemoryRepository::new();
        seed_user(&repo, 42, "secret");
        let app = test_app(repo.clone());

        let (status, _) = send(&app, Method::POST, "/businesses", None, Some(business(42, "Pizza Place"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, Method::POST, "/businesses", None, Some(business(43, "Other"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let token = login(&app, json!(42), "secret").await;

        let (status, body) = send(&app, Method::GET, "/users/42/businesses", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let owned = body["businesses"].as_array().unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0]["name"], "Pizza Place");

        let (status, body) = send(&app, Method::GET, "/users/43/businesses", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn login_accepts_string_ids() {
        let repo = MemoryRepository::new();
        seed_user(&repo, 7, "pw");
        let app = test_app(repo);

        let token = login(&app, json!("7"), "pw").await;
        let (status, _) = send(&app, Method::GET, "/users/7/reviews", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn owner_routes_require_a_valid_token() {
        let repo = MemoryRepository::new();
        seed_user(&repo, 5, "pw");
        let app = test_app(repo);

        let (status, body) = send(&app, Method::GET, "/users/5/photos", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let token = login(&app, json!(5), "pw").await;
        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", unsigned, flipped, &signature[1..]);
        let (status, body) = send(&app, Method::GET, "/users/5/photos", Some(&tampered), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired authentication token");

        let foreign = TokenService::with_default_validity(b"someone-else").unwrap().issue(SubjectId::new(5)).unwrap();
        let (status, _) = send(&app, Method::GET, "/users/5/photos", Some(&foreign), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let repo = MemoryRepository::new();
        seed_user(&repo, 1, "right");
        let app = test_app(repo);

        let (status, _) = send(&app, Method::POST, "/users/login", None, Some(json!({"id": 1, "password": "wrong"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::POST, "/users/login", None, Some(json!({"id": 99, "password": "right"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::POST, "/users/login", None, Some(json!({"id": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request body needs user id and password.");

        for incomplete in [json!({"id": 0, "password": "right"}), json!({"id": 1, "password": ""})] {
            let (status, _) = send(&app, Method::POST, "/users/login", None, Some(incomplete)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn registration_hashes_password_and_reads_redact_it() {
        let repo = MemoryRepository::new();
        let app = test_app(repo.clone());

        let user = json!({"name": "Ada", "email": "ada@example.com", "password": "hunter2", "admin": true, "id": 500});
        let (status, body) = send(&app, Method::POST, "/users", None, Some(user)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();
        assert_ne!(id, 500);

        let stored = repo.row(Resource::User, id).unwrap();
        assert_ne!(stored["password"], "hunter2");

        let token = login(&app, json!(id), "hunter2").await;
        let (status, body) = send(&app, Method::GET, &format!("/users/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_and_drops_undeclared_ones() {
        let repo = MemoryRepository::new();
        let app = test_app(repo.clone());

        let (status, body) = send(&app, Method::POST, "/photos", None, Some(json!({"caption": "hi"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"].get("userid").is_some());
        assert!(body["field_errors"].get("businessid").is_some());

        let photo = json!({"userid": 1, "businessid": 2, "caption": "hi", "injected": "DROP"});
        let (status, body) = send(&app, Method::POST, "/photos", None, Some(photo)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["links"]["photo"], "/photos/1");
        assert_eq!(body["links"]["business"], "/businesses/2");
        assert!(repo.row(Resource::Photo, 1).unwrap().get("injected").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let app = test_app(MemoryRepository::new());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/businesses")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn business_listing_is_paginated() {
        let repo = MemoryRepository::new();
        let app = test_app(repo);
        for i in 0..4 {
            let (status, _) = send(&app, Method::POST, "/businesses", None, Some(business(1, &format!("B{}", i)))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, Method::GET, "/businesses?page=2", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pageNumber"], 2);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["pageSize"], TEST_PAGE_SIZE);
        assert_eq!(body["totalCount"], 4);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["links"], json!({"prevPage": "/businesses?page=1", "firstPage": "/businesses?page=1"}));

        let (_, body) = send(&app, Method::GET, "/businesses?page=99999999999999999999", None, None).await;
        assert_eq!(body["pageNumber"], 2);

        let (_, body) = send(&app, Method::GET, "/businesses?page=abc", None, None).await;
        assert_eq!(body["pageNumber"], 1);
        assert_eq!(body["links"], json!({"nextPage": "/businesses?page=2", "lastPage": "/businesses?page=2"}));

        let (_, body) = send(&app, Method::GET, "/businesses", None, None).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn second_review_of_a_business_is_forbidden() {
        let app = test_app(MemoryRepository::new());
        let review = json!({"userid": 3, "businessid": 9, "dollars": 2, "stars": 4});

        let (status, body) = send(&app, Method::POST, "/reviews", None, Some(review)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["links"]["review"], "/reviews/1");

        let again = json!({"userid": "3", "businessid": 9, "dollars": 1, "stars": 1});
        let (status, body) = send(&app, Method::POST, "/reviews", None, Some(again)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "User has already posted a review of this business");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let app = test_app(MemoryRepository::new());
        let photo = json!({"userid": 1, "businessid": 2});

        let (status, _) = send(&app, Method::PUT, "/photos/1", None, Some(photo.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, Method::POST, "/photos", None, Some(photo.clone())).await;

        let (status, _) = send(&app, Method::PUT, "/photos/1", None, Some(json!({"caption": "only"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let updated = json!({"userid": 1, "businessid": 2, "caption": "new"});
        let (status, body) = send(&app, Method::PUT, "/photos/1", None, Some(updated)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": 1, "links": {"photo": "/photos/1"}}));

        let (status, body) = send(&app, Method::GET, "/photos/1", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caption"], "new");

        let (status, body) = send(&app, Method::DELETE, "/photos/1", None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::DELETE, "/photos/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app(MemoryRepository::new());
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");
    }
}

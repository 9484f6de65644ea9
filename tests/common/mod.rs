#![allow(dead_code)]

use bizreview_api::auth::TokenService;
use bizreview_api::pagination::{PageSize, Paginator};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

pub const SECRET: &[u8] = b"integration-secret";

pub fn tokens() -> TokenService {
    TokenService::with_default_validity(SECRET).expect("non-empty secret")
}

pub fn paginator(path: &str, size: i64) -> Paginator {
    Paginator::new(path, PageSize::new(size).expect("positive page size"))
}

/// Fixed clock origin so expiry arithmetic is exact
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {}", other),
    }
}

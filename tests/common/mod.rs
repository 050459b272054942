//! Shared fixtures for the exporter integration tests.
//!
//! Provides canned Sunsynk API bodies and helpers that register them on a
//! `mockito` server, plus a builder preconfigured to talk to that server.

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::time::Duration;
use sunsynk_export::{Credentials, SunsynkExporter, SunsynkExporterBuilder};

pub const USERNAME: &str = "owner@example.com";
pub const PASSWORD: &str = "s3cret";
pub const TOKEN: &str = "test-token";
pub const PLANT_ID: u64 = 227328;

/// Exporter pointed at the mock server, logging in with the test credentials.
pub fn builder_for(server: &ServerGuard) -> SunsynkExporterBuilder {
    SunsynkExporter::builder()
        .base_url(server.url())
        .timeout(Duration::from_secs(5))
        .credentials(Credentials::new(USERNAME, PASSWORD))
}

/// Successful `/oauth/token` exchange, expected exactly once.
pub fn mock_login(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::PartialJson(json!({
            "areaCode": "sunsynk",
            "client_id": "csp-web",
            "grant_type": "password",
            "source": "sunsynk",
            "username": USERNAME,
            "password": PASSWORD
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "msg": "Success",
                "success": true,
                "data": {"access_token": TOKEN, "token_type": "bearer"}
            })
            .to_string(),
        )
        .expect(1)
        .create()
}

/// Plant list with a single plant.
pub fn mock_plants(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/api/v1/plants")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "msg": "Success",
                "success": true,
                "data": {"pageSize": 1, "pageNumber": 1, "total": 1,
                         "infos": [{"id": PLANT_ID, "name": "Home"}]}
            })
            .to_string(),
        )
        .create()
}

/// One category as the energy endpoints return it.
pub fn category(label: &str, unit: &str, records: &[(&str, &str)]) -> Value {
    json!({
        "id": null,
        "label": label,
        "unit": unit,
        "groupCode": null,
        "records": records
            .iter()
            .map(|(time, value)| json!({"time": time, "value": value, "updateTime": null}))
            .collect::<Vec<_>>()
    })
}

/// Energy endpoint answer for one period.
pub fn mock_energy(
    server: &mut ServerGuard,
    granularity: &str,
    date: &str,
    infos: Vec<Value>,
) -> Mock {
    server
        .mock("GET", format!("/api/v1/plant/energy/{}/{}", PLANT_ID, granularity).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lan".into(), "en".into()),
            Matcher::UrlEncoded("date".into(), date.into()),
            Matcher::UrlEncoded("id".into(), PLANT_ID.to_string()),
        ]))
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "msg": "Success",
                "success": true,
                "data": {"infos": infos}
            })
            .to_string(),
        )
        .create()
}

/// Energy endpoint answer with no `data`, which ends a history walk.
pub fn mock_energy_empty(server: &mut ServerGuard, granularity: &str, date: &str) -> Mock {
    server
        .mock("GET", format!("/api/v1/plant/energy/{}/{}", PLANT_ID, granularity).as_str())
        .match_query(Matcher::UrlEncoded("date".into(), date.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"code": 0, "msg": "Success", "success": true, "data": null}).to_string())
        .expect(1)
        .create()
}

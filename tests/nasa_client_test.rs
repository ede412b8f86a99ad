use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use apod_timeline::client::{ApodSource, NasaApodClient};
use apod_timeline::config::NasaEndpoint;
use apod_timeline::demo::is_demo;
use apod_timeline::loader::ApodLoader;
use apod_timeline::media::ImageUrlResolver;
use apod_timeline::types::{ErrorKind, FetchOutcome};

const API_KEY: &str = "test-key";
const PROXY: &str = "https://res.cloudinary.com/demo/image/fetch";

async fn entry(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    let date = params.get("date").cloned().unwrap_or_default();
    Json(json!({
        "title": format!("Sky on {date}"),
        "date": date,
        "url": format!("https://apod.nasa.gov/apod/image/{date}.jpg"),
        "explanation": "Stars and dust.",
        "media_type": "image",
        "service_version": "v1"
    }))
    .into_response()
}

async fn video() -> impl IntoResponse {
    Json(json!({
        "title": "Eclipse timelapse",
        "url": "https://www.youtube.com/embed/abc123?rel=0",
        "explanation": "A video entry.",
        "media_type": "video"
    }))
}

async fn outage() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "upstream down")
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "msg": "No data available" })))
}

async fn not_json() -> impl IntoResponse {
    (StatusCode::OK, "<html>maintenance</html>")
}

async fn missing_fields() -> impl IntoResponse {
    Json(json!({ "title": "Untitled", "media_type": "other" }))
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({ "title": "late", "url": "u", "explanation": "e" }))
}

/// Outage only for the newest date of the window.
async fn outage_on_newest(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("date").map(String::as_str) == Some("2024-01-05") {
        return outage().await.into_response();
    }
    entry(Query(params)).await.into_response()
}

/// Only the middle date of the window fails.
async fn one_bad_day(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("date").map(String::as_str) == Some("2024-01-04") {
        return not_found().await.into_response();
    }
    entry(Query(params)).await.into_response()
}

fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/apod", get(entry))
        .route("/video", get(video))
        .route("/outage", get(outage))
        .route("/not-found", get(not_found))
        .route("/not-json", get(not_json))
        .route("/missing", get(missing_fields))
        .route("/slow", get(slow))
        .route("/outage-on-newest", get(outage_on_newest))
        .route("/one-bad-day", get(one_bad_day));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(server);
    addr
}

fn client_for(location: String, timeout: Duration, proxy: Option<&str>) -> NasaApodClient {
    NasaApodClient::new(
        reqwest::Client::new(),
        NasaEndpoint {
            location,
            api_key: API_KEY.to_string(),
            timeout,
        },
        ImageUrlResolver::new(proxy.map(String::from)),
        800,
        600,
    )
}

fn client(addr: SocketAddr, path: &str) -> NasaApodClient {
    client_for(format!("http://{addr}{path}"), Duration::from_secs(2), None)
}

fn kind(outcome: &FetchOutcome) -> Option<ErrorKind> {
    outcome.error().map(|e| e.kind)
}

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

#[tokio::test]
async fn fetches_and_stamps_requested_date() {
    let addr = spawn_upstream();
    let outcome = client(addr, "/apod").fetch_one("2024-01-03").await;

    let FetchOutcome::Ok(record) = outcome else {
        panic!("expected a record, got {outcome:?}");
    };
    assert_eq!(record.title, "Sky on 2024-01-03");
    assert_eq!(record.date, "2024-01-03");
    assert_eq!(record.media_url, "https://apod.nasa.gov/apod/image/2024-01-03.jpg");
    assert_eq!(record.explanation, "Stars and dust.");
}

#[tokio::test]
async fn image_urls_go_through_the_proxy() {
    let addr = spawn_upstream();
    let client = client_for(format!("http://{addr}/apod"), Duration::from_secs(2), Some(PROXY));

    let FetchOutcome::Ok(record) = client.fetch_one("2024-01-03").await else {
        panic!("expected a record");
    };
    assert_eq!(
        record.media_url,
        format!("{PROXY}/w_800,h_600,c_fill,f_auto,q_auto/https://apod.nasa.gov/apod/image/2024-01-03.jpg")
    );
}

#[tokio::test]
async fn video_urls_skip_the_proxy() {
    let addr = spawn_upstream();
    let client = client_for(format!("http://{addr}/video"), Duration::from_secs(2), Some(PROXY));

    let FetchOutcome::Ok(record) = client.fetch_one("2024-01-03").await else {
        panic!("expected a record");
    };
    assert_eq!(record.media_url, "https://www.youtube.com/embed/abc123?rel=0");
}

#[tokio::test]
async fn server_errors_are_outages() {
    let addr = spawn_upstream();
    let outcome = client(addr, "/outage").fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::ServiceOutage));
}

#[tokio::test]
async fn client_errors_are_api_errors() {
    let addr = spawn_upstream();
    let outcome = client(addr, "/not-found").fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::ApiError));
}

#[tokio::test]
async fn wrong_key_is_an_api_error() {
    let addr = spawn_upstream();
    let endpoint = NasaEndpoint {
        location: format!("http://{addr}/apod"),
        api_key: "wrong".to_string(),
        timeout: Duration::from_secs(2),
    };
    let client = NasaApodClient::new(
        reqwest::Client::new(),
        endpoint,
        ImageUrlResolver::default(),
        800,
        600,
    );
    let outcome = client.fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::ApiError));
}

#[tokio::test]
async fn non_json_body_is_an_api_error() {
    let addr = spawn_upstream();
    let outcome = client(addr, "/not-json").fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::ApiError));
}

#[tokio::test]
async fn incomplete_payload_is_absent() {
    let addr = spawn_upstream();
    let outcome = client(addr, "/missing").fetch_one("2024-01-03").await;
    assert_eq!(outcome, FetchOutcome::Absent);
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let addr = spawn_upstream();
    let client = client_for(format!("http://{addr}/slow"), Duration::from_millis(100), None);
    let outcome = client.fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::Timeout));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let outcome = client(addr, "/apod").fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::Network));
}

#[tokio::test]
async fn unusable_location_is_an_api_error() {
    let client = client_for("not a url".to_string(), Duration::from_secs(2), None);
    let outcome = client.fetch_one("2024-01-03").await;
    assert_eq!(kind(&outcome), Some(ErrorKind::ApiError));
}

#[tokio::test]
async fn loader_returns_window_newest_first() {
    let addr = spawn_upstream();
    let loader = ApodLoader::new(Arc::new(client(addr, "/apod"))).with_clock(fixed_today);

    let result = loader
        .load(3, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .await;

    let dates: Vec<_> = result.apods.iter().map(|a| a.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-04", "2024-01-03"]);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn loader_keeps_partial_window_and_reports_failure() {
    let addr = spawn_upstream();
    let loader = ApodLoader::new(Arc::new(client(addr, "/one-bad-day"))).with_clock(fixed_today);

    let result = loader
        .load(3, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .await;

    let dates: Vec<_> = result.apods.iter().map(|a| a.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-03"]);
    assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::ApiError));
}

#[tokio::test]
async fn loader_serves_demo_on_newest_date_outage() {
    let addr = spawn_upstream();
    let loader =
        ApodLoader::new(Arc::new(client(addr, "/outage-on-newest"))).with_clock(fixed_today);

    let result = loader
        .load(3, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .await;

    assert_eq!(result.apods.len(), 1);
    assert!(is_demo(&result.apods[0]));
    assert_eq!(result.apods[0].date, "2024-01-10");
    assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::ServiceOutage));
}

#[tokio::test]
async fn loader_serves_demo_when_nothing_is_usable() {
    let addr = spawn_upstream();
    let loader = ApodLoader::new(Arc::new(client(addr, "/missing"))).with_clock(fixed_today);

    let result = loader
        .load(3, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .await;

    assert_eq!(result.apods.len(), 1);
    assert!(is_demo(&result.apods[0]));
    let error = result.error.expect("demo fallback carries an error");
    assert_eq!(error.kind, ErrorKind::ApiError);
}

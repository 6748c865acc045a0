//! End-to-end report generation against a fake time-tracking API

use serde_json::json;
use tally::config::DiscoveryConfig;
use tally::report::{ReportError, ReportRequest, ReportService};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(default_base_url: String) -> ReportService {
    ReportService::new(DiscoveryConfig {
        default_base_url,
        retries: 0,
        timeout_ms: 2000,
        backoff_ms: 1,
        default_shift_hours: 8.0,
    })
    .unwrap()
}

fn request(base_url: Option<String>) -> ReportRequest {
    ReportRequest {
        api_key_id: Some("key-id".into()),
        api_key_secret: Some("key-secret".into()),
        base_url,
        date: Some("2024-03-04".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn versioned_api_with_api_key_header() {
    let server = MockServer::start().await;

    // Only /v2 answers, and only with the X-API-KEY strategy
    Mock::given(method("GET"))
        .and(path("/v2/users"))
        .and(header("X-API-KEY", "key-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [
                    {"person_id": "u1", "first_name": "Grace", "last_name": "Hopper"},
                    {"uuid": "u2", "displayName": "Linus"}
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/timesheets"))
        .and(query_param("person_id", "u1"))
        .and(query_param("date", "2024-03-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"project": "Compiler", "startTime": "2024-03-04T08:00:00Z", "endTime": "2024-03-04T10:00:00Z"},
                {"project": "Review", "startTime": "2024-03-04T10:00:00Z", "endTime": "2024-03-04T10:45:00Z"},
                {"project": "Compiler", "startTime": "2024-03-04T13:00:00Z", "endTime": "2024-03-04T15:30:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let base = format!("{}/v2", server.uri());
    let report = service("http://127.0.0.1:9".into())
        .generate_report(&request(Some(base.clone())))
        .await
        .unwrap();

    assert_eq!(report.base_url, base);
    assert_eq!(report.people_endpoint, "/users");
    assert_eq!(report.auth_strategy, "API key header");
    assert_eq!(report.entries_endpoint.as_deref(), Some("/timesheets"));
    assert_eq!(report.people_count, report.reports.len());
    assert_eq!(report.people_count, 2);

    let grace = &report.reports[0];
    assert_eq!(grace.name, "Grace Hopper");
    let labels: Vec<&str> = grace.grouped_entries.iter().map(|g| g.property.as_str()).collect();
    assert_eq!(labels, ["Compiler", "Review"]);

    let compiler = &grace.grouped_entries[0];
    assert_eq!(compiler.total_minutes, 270);
    assert_eq!(compiler.time_in_formatted, "08:00:00");
    assert_eq!(compiler.time_out_formatted, "15:30:00");

    for person in &report.reports {
        let summed: i64 = person.grouped_entries.iter().map(|g| g.total_minutes).sum();
        assert_eq!(person.total_minutes, summed);
        assert_eq!(person.balance_minutes, (480 - person.total_minutes).max(0));
    }

    assert_eq!(grace.total_formatted, "5h 15m");
    assert_eq!(grace.balance_formatted, "2h 45m");

    let linus = &report.reports[1];
    assert_eq!(linus.name, "Linus");
    assert!(linus.grouped_entries.is_empty());
    assert_eq!(linus.balance_formatted, "8h 00m");
}

#[tokio::test]
async fn payload_uses_camel_case_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "name": "Ann"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let report = service(server.uri()).generate_report(&request(None)).await.unwrap();
    let payload = serde_json::to_value(&report).unwrap();

    assert_eq!(payload["baseUrl"], server.uri());
    assert_eq!(payload["authStrategy"], "HTTP Basic");
    assert_eq!(payload["peopleEndpoint"], "/people");
    assert_eq!(payload["peopleCount"], 1);
    assert_eq!(payload["reports"][0]["id"], "7");
    assert_eq!(payload["reports"][0]["groupedEntries"], json!([]));
    assert_eq!(payload["reports"][0]["balanceFormatted"], "8h 00m");
}

#[tokio::test]
async fn invalid_input_makes_no_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let svc = service(server.uri());

    let mut no_date = request(None);
    no_date.date = None;
    let err = svc.generate_report(&no_date).await.unwrap_err();
    assert_eq!(err.to_string(), "Please pick a date to run the report.");

    let mut no_id = request(None);
    no_id.api_key_id = Some("   ".into());
    let err = svc.generate_report(&no_id).await.unwrap_err();
    assert!(matches!(err, ReportError::Input(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn discovery_failure_lists_every_base_url_tried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("<h1>Forbidden</h1>"))
        .mount(&server)
        .await;

    let mut req = request(None);
    req.auth_mode = Some("bearer".into());

    let err = service(server.uri()).generate_report(&req).await.unwrap_err();
    let failure = match err {
        ReportError::Discovery(failure) => failure,
        other => panic!("expected discovery failure, got {:?}", other),
    };

    assert_eq!(failure.details, "Forbidden");
    assert_eq!(
        failure.tried_base_urls,
        vec![
            server.uri(),
            format!("{}/v1", server.uri()),
            format!("{}/v2", server.uri()),
            format!("{}/api/v1", server.uri()),
            format!("{}/api/v2", server.uri()),
        ]
    );

    // One strategy, five people aliases, five base URLs, no retries on 4xx
    let calls = server.received_requests().await.unwrap();
    assert_eq!(calls.len(), 25);
}

#[tokio::test]
async fn time_entries_try_every_auth_strategy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people"))
        .and(header("X-API-KEY", "key-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "p1", "name": "Ann"}])))
        .mount(&server)
        .await;

    // Entries only accept the bearer token, which failed for people
    Mock::given(method("GET"))
        .and(path("/time_entries"))
        .and(header("Authorization", "Bearer key-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"location": "HQ", "start": "2024-03-04T09:00Z", "end": "2024-03-04T12:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;

    let report = service(server.uri()).generate_report(&request(None)).await.unwrap();

    assert_eq!(report.auth_strategy, "API key header");
    assert_eq!(report.entries_endpoint.as_deref(), Some("/time_entries"));

    let ann = &report.reports[0];
    assert_eq!(ann.grouped_entries.len(), 1);
    assert_eq!(ann.grouped_entries[0].property, "HQ");
    assert_eq!(ann.total_minutes, 180);
    assert_eq!(ann.balance_formatted, "5h 00m");
}

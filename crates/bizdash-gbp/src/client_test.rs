use chrono::NaiveDate;

use super::*;

fn test_client(base_url: &str) -> GbpClient {
    GbpClient::with_base_urls("test-token", 30, GbpBaseUrls::single(base_url))
        .expect("client construction should not fail")
}

#[test]
fn join_keeps_base_path() {
    let client = test_client("https://mybusiness.googleapis.com/v4");
    let url = join(
        &client.endpoints.reviews,
        "accounts/1/locations/2/reviews",
    )
    .unwrap();
    assert_eq!(
        url.as_str(),
        "https://mybusiness.googleapis.com/v4/accounts/1/locations/2/reviews"
    );
}

#[test]
fn daily_metrics_url_carries_metrics_and_range() {
    let client = test_client("https://businessprofileperformance.googleapis.com/v1/");
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap();
    let url = client.daily_metrics_url("locations/99", &range).unwrap();

    assert_eq!(url.path(), "/v1/locations/99:fetchMultiDailyMetricsTimeSeries");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let metrics: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "dailyMetrics")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(metrics.len(), DAILY_METRICS.len());
    assert!(pairs.contains(&("dailyRange.endDate.day".to_string(), "31".to_string())));
    assert!(pairs.contains(&("dailyRange.startDate.month".to_string(), "1".to_string())));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = GbpClient::with_base_urls("t", 30, GbpBaseUrls::single("not a url")).unwrap_err();
    assert!(matches!(err, GbpError::ApiError(ref m) if m.contains("invalid base URL")));
}

#[test]
fn api_error_message_prefers_upstream_message() {
    let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
    assert_eq!(
        api_error_message(StatusCode::FORBIDDEN, body),
        "403 Forbidden: The caller does not have permission"
    );
    assert_eq!(
        api_error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
        "502 Bad Gateway"
    );
}

#[test]
fn empty_page_token_ends_pagination() {
    assert_eq!(next_token(Some(String::new())), None);
    assert_eq!(next_token(Some("abc".to_string())).as_deref(), Some("abc"));
}

#[test]
fn debug_output_redacts_token() {
    let client = test_client("https://example.com");
    let debug = format!("{client:?}");
    assert!(!debug.contains("test-token"));
}

use super::*;
use crate::api::fake::{error_envelope, ok_envelope, FakeTransport};
use crate::credentials::extract_account_id;
use serde_json::json;

fn account() -> AccountId {
    extract_account_id("4242_token").unwrap()
}

#[test]
fn test_illusts_before_manga_in_key_order() {
    let transport = FakeTransport::new(|_, _| {
        Ok(ok_envelope(json!({
            "illusts": { "10": null, "20": null },
            "manga": { "30": null },
            "novels": { "99": null }
        })))
    });

    let ids = enumerate_work_ids(&transport, &account()).unwrap();
    assert_eq!(ids, vec!["10", "20", "30"]);
    assert_eq!(transport.calls()[0].path, "/ajax/user/4242/profile/all");
}

#[test]
fn test_response_key_order_is_kept() {
    let transport = FakeTransport::new(|_, _| {
        Ok(ok_envelope(json!({
            "illusts": { "300": {}, "100": {}, "200": {} },
            "manga": []
        })))
    });

    let ids = enumerate_work_ids(&transport, &account()).unwrap();
    assert_eq!(ids, vec!["300", "100", "200"]);
}

#[test]
fn test_missing_and_empty_groups() {
    let transport = FakeTransport::new(|_, _| Ok(ok_envelope(json!({ "manga": null }))));
    let ids = enumerate_work_ids(&transport, &account()).unwrap();
    assert!(ids.is_empty());
}

#[test]
fn test_upstream_error_is_enumeration_failure() {
    let transport = FakeTransport::new(|_, _| Ok(error_envelope("Invalid user")));
    let err = enumerate_work_ids(&transport, &account()).unwrap_err();
    assert_eq!(
        err,
        AnalyticsError::EnumerationFailed {
            message: "Invalid user".to_string()
        }
    );
}

#[test]
fn test_transport_error_passes_through() {
    let transport = FakeTransport::new(|_, _| {
        Err(AnalyticsError::Transport {
            message: "HTTP 500 from /ajax".to_string(),
        })
    });
    let err = enumerate_work_ids(&transport, &account()).unwrap_err();
    assert_eq!(
        err,
        AnalyticsError::Transport {
            message: "HTTP 500 from /ajax".to_string()
        }
    );
    assert_eq!(err.exit_code(), 1);
}

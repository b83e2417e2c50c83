mod common;

use axum::http::StatusCode;
use common::{TestApp, setup_app};
use serde_json::json;

/// Owner token, voter token and a submission on the owner's open brief.
async fn submission_fixture(t: &TestApp) -> (String, String, String, String) {
    let (_, owner) = t.register_user("owner").await;
    let (_, creator) = t.register_user("creator").await;
    let (_, fan) = t.register_user("fan").await;
    let brief_id = t.open_brief(&owner).await;
    let (_, body) = t.submit(&creator, &brief_id).await;
    (
        owner,
        fan,
        brief_id,
        body["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_like_is_strict_and_counted() {
    let t = setup_app().await;
    let (_, fan, _, submission_id) = submission_fixture(&t).await;
    let uri = format!("/api/submissions/{}/reactions", submission_id);

    let (status, body) = t
        .call("POST", &uri, Some(&fan), Some(json!({ "type": "like" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["likes"], 1);
    assert_eq!(body["votes"], 0);

    let (status, body) = t
        .call("POST", &uri, Some(&fan), Some(json!({ "type": "like" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_REACTION");

    // Anonymous viewers get counters only
    let (status, body) = t.call("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);
    assert!(body.get("liked").is_none());

    let (_, body) = t.call("GET", &uri, Some(&fan), None).await;
    assert_eq!(body["liked"], true);
    assert_eq!(body["voted"], false);

    // A bad token on a public read falls back to anonymous
    let (status, body) = t.call("GET", &uri, Some("garbage"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("liked").is_none());

    let (status, body) = t
        .call("DELETE", &format!("{}/like", uri), Some(&fan), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 0);

    let (status, _) = t
        .call("DELETE", &format!("{}/like", uri), Some(&fan), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_flips_state() {
    let t = setup_app().await;
    let (_, fan, _, submission_id) = submission_fixture(&t).await;
    let toggle = json!({ "submission_id": submission_id, "type": "like" });

    let (status, body) = t
        .call("POST", "/api/reactions/toggle", Some(&fan), Some(toggle.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["type"], "like");
    assert_eq!(body["counts"]["likes"], 1);

    let (status, body) = t
        .call("POST", "/api/reactions/toggle", Some(&fan), Some(toggle))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
    assert_eq!(body["counts"]["likes"], 0);

    let (_, submission) = t
        .call("GET", &format!("/api/submissions/{}", submission_id), None, None)
        .await;
    assert_eq!(submission["likes"], 0);
}

#[tokio::test]
async fn test_votes_only_during_review() {
    let t = setup_app().await;
    let (owner, fan, brief_id, submission_id) = submission_fixture(&t).await;
    let uri = format!("/api/submissions/{}/reactions", submission_id);

    let (status, body) = t
        .call("POST", &uri, Some(&fan), Some(json!({ "type": "vote" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRIEF_NOT_OPEN");

    t.set_status(&owner, &brief_id, "in_review").await;
    let (status, body) = t
        .call("POST", &uri, Some(&fan), Some(json!({ "type": "vote" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["votes"], 1);

    // A voting window that already ended closes voting again
    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&owner),
            Some(json!({
                "voting_start": "2000-01-01T00:00:00Z",
                "voting_end": "2000-01-02T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let toggle = json!({ "submission_id": submission_id, "type": "vote" });
    let (status, _) = t
        .call("POST", "/api/reactions/toggle", Some(&fan), Some(toggle))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reactions_require_authentication() {
    let t = setup_app().await;
    let (_, _, _, submission_id) = submission_fixture(&t).await;

    let (status, _) = t
        .call(
            "POST",
            &format!("/api/submissions/{}/reactions", submission_id),
            None,
            Some(json!({ "type": "like" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

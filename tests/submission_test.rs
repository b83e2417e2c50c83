mod common;

use axum::http::StatusCode;
use briefhub_backend::entities::types::Role;
use common::setup_app;
use serde_json::json;

#[tokio::test]
async fn test_one_submission_per_user_and_brief() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (creator_id, creator) = t.register_user("creator").await;
    let brief_id = t.open_brief(&owner).await;

    let (status, body) = t.submit(&creator, &brief_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], creator_id.as_str());
    assert_eq!(body["brief_id"], brief_id.as_str());

    let (status, body) = t.submit(&creator, &brief_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_SUBMISSION");

    let (_, brief) = t
        .call("GET", &format!("/api/briefs/{}", brief_id), None, None)
        .await;
    assert_eq!(brief["submission_count"], 1);
}

#[tokio::test]
async fn test_submissions_need_an_open_brief() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, creator) = t.register_user("creator").await;
    let brand_id = t.create_brand(&owner, "Acme").await;
    let brief_id = t.create_brief(&owner, &brand_id, "Logo").await;

    // Still a draft
    let (status, body) = t.submit(&creator, &brief_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRIEF_NOT_OPEN");

    t.set_status(&owner, &brief_id, "submission").await;
    let (status, body) = t.submit(&creator, &brief_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = body["id"].as_str().unwrap().to_string();

    t.set_status(&owner, &brief_id, "in_review").await;
    let (status, body) = t
        .call(
            "PATCH",
            &format!("/api/submissions/{}", submission_id),
            Some(&creator),
            Some(json!({ "description": "Too late" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRIEF_NOT_OPEN");
}

#[tokio::test]
async fn test_passed_deadline_closes_brief() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, creator) = t.register_user("creator").await;
    let brief_id = t.open_brief(&owner).await;

    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&owner),
            Some(json!({ "submission_deadline": "2000-01-01T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.submit(&creator, &brief_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRIEF_NOT_OPEN");
}

#[tokio::test]
async fn test_only_author_edits_submission() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, creator) = t.register_user("creator").await;
    let (_, other) = t.register_user("other").await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;
    let brief_id = t.open_brief(&owner).await;

    let (_, body) = t.submit(&creator, &brief_id).await;
    let submission_id = body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/submissions/{}", submission_id);

    for token in [&other, &owner, &admin] {
        let (status, body) = t
            .call("PATCH", &uri, Some(token), Some(json!({ "description": "Edited" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NOT_OWNER");
    }

    let (status, body) = t
        .call("PATCH", &uri, Some(&creator), Some(json!({ "description": "Edited" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Edited");

    // Deleting is open to the author and admins, not to others
    let (status, _) = t.call("DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = t.call("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, brief) = t
        .call("GET", &format!("/api/briefs/{}", brief_id), None, None)
        .await;
    assert_eq!(brief["submission_count"], 0);
}

#[tokio::test]
async fn test_finalists_and_winner() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, first) = t.register_user("first").await;
    let (_, second) = t.register_user("second").await;
    let brief_id = t.open_brief(&owner).await;

    let (_, a) = t.submit(&first, &brief_id).await;
    let (_, b) = t.submit(&second, &brief_id).await;
    let a_id = a["id"].as_str().unwrap().to_string();
    let b_id = b["id"].as_str().unwrap().to_string();

    // Not in review yet
    let (status, _) = t
        .call(
            "POST",
            &format!("/api/briefs/{}/winner", brief_id),
            Some(&owner),
            Some(json!({ "submission_id": a_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    t.set_status(&owner, &brief_id, "in_review").await;

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/briefs/{}/finalists", brief_id),
            Some(&owner),
            Some(json!({ "submission_ids": [a_id, b_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Participants cannot pick the winner
    let (status, _) = t
        .call(
            "POST",
            &format!("/api/briefs/{}/winner", brief_id),
            Some(&first),
            Some(json!({ "submission_id": a_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/briefs/{}/winner", brief_id),
            Some(&owner),
            Some(json!({ "submission_id": b_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brief"]["status"], "winner");
    assert_eq!(body["submission"]["id"], b_id.as_str());
    assert_eq!(body["submission"]["is_winner"], true);

    let (_, finalists) = t
        .call(
            "GET",
            &format!("/api/submissions?brief_id={}&is_finalist=true", brief_id),
            None,
            None,
        )
        .await;
    assert_eq!(finalists.as_array().unwrap().len(), 2);
    let winners: Vec<_> = finalists
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["is_winner"] == true)
        .collect();
    assert_eq!(winners.len(), 1);
}

#[tokio::test]
async fn test_submission_file_upload() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, creator) = t.register_user("creator").await;
    let brief_id = t.open_brief(&owner).await;
    let (_, body) = t.submit(&creator, &brief_id).await;
    let submission_id = body["id"].as_str().unwrap().to_string();

    let boundary = "briefhub-boundary";
    let payload = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"files\"; filename=\"draft.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        first draft\r\n\
        --{boundary}--\r\n",
        boundary = boundary
    );
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(format!("/api/submissions/{}/files", submission_id))
        .header("Authorization", format!("Bearer {}", creator))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(axum::body::Body::from(payload))
        .unwrap();

    let (status, body) = t.send(req).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["files"][0]["filename"], "draft.txt");
    assert_eq!(t.storage.files.lock().unwrap().len(), 1);
}

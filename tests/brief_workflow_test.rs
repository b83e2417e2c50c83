mod common;

use axum::http::StatusCode;
use briefhub_backend::entities::types::Role;
use common::setup_app;
use serde_json::json;

#[tokio::test]
async fn test_brief_defaults_to_draft() {
    let t = setup_app().await;
    let (user_id, token) = t.register_user("brandowner").await;
    let brand_id = t.create_brand(&token, "Acme").await;

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&token),
            Some(json!({ "title": "Logo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["title"], "Logo");
    assert_eq!(body["brand_id"], brand_id.as_str());
    assert_eq!(body["created_by"], user_id.as_str());
    assert_eq!(body["submission_count"], 0);
}

#[tokio::test]
async fn test_brand_mismatch_on_create_and_update() {
    let t = setup_app().await;
    let (_, token) = t.register_user("owner").await;
    let brand_a = t.create_brand(&token, "Alpha").await;
    let brand_b = t.create_brand(&token, "Beta").await;

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_a),
            Some(&token),
            Some(json!({ "title": "Logo", "brand_id": brand_b })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRAND_MISMATCH");

    let brief_id = t.create_brief(&token, &brand_a, "Logo").await;
    let (status, body) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&token),
            Some(json!({ "brand_id": brand_b })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRAND_MISMATCH");

    // Repeating the current brand is accepted
    let (status, body) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&token),
            Some(json!({ "brand_id": brand_a, "title": "Logo v2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Logo v2");
}

#[tokio::test]
async fn test_create_via_briefs_requires_brand_id() {
    let t = setup_app().await;
    let (_, token) = t.register_user("owner").await;
    let brand_id = t.create_brand(&token, "Acme").await;

    let (status, _) = t
        .call("POST", "/api/briefs", Some(&token), Some(json!({ "title": "Logo" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .call(
            "POST",
            "/api/briefs",
            Some(&token),
            Some(json!({ "title": "Logo", "brand_id": brand_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
}

#[tokio::test]
async fn test_status_transitions() {
    let t = setup_app().await;
    let (_, token) = t.register_user("owner").await;
    let brand_id = t.create_brand(&token, "Acme").await;
    let brief_id = t.create_brief(&token, &brand_id, "Logo").await;

    // draft -> in_review skips a step
    let (status, body) = t.set_status(&token, &brief_id, "in_review").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = t.set_status(&token, &brief_id, "submission").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submission");

    // Same state is a no-op
    let (status, body) = t.set_status(&token, &brief_id, "submission").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submission");

    let (status, _) = t.set_status(&token, &brief_id, "in_review").await;
    assert_eq!(status, StatusCode::OK);

    // Reopen, then review again
    let (status, _) = t.set_status(&token, &brief_id, "submission").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = t.set_status(&token, &brief_id, "in_review").await;
    assert_eq!(status, StatusCode::OK);

    // Only admins may send a brief back to draft
    let (status, _) = t.set_status(&token, &brief_id, "draft").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, admin_token) = t.account_with_role("moderator", Role::Admin).await;
    let (status, body) = t.set_status(&admin_token, &brief_id, "draft").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "draft");
}

#[tokio::test]
async fn test_only_owner_or_admin_manages_brief() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (_, stranger) = t.register_user("stranger").await;
    let brand_id = t.create_brand(&owner, "Acme").await;
    let brief_id = t.create_brief(&owner, &brand_id, "Logo").await;

    let (status, body) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&stranger),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    let (status, _) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&stranger),
            Some(json!({ "title": "Spam" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;
    let (status, body) = t
        .call(
            "PATCH",
            &format!("/api/briefs/{}", brief_id),
            Some(&admin),
            Some(json!({ "title": "Moderated" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Moderated");

    let (status, _) = t
        .call("DELETE", &format!("/api/briefs/{}", brief_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .call("GET", &format!("/api/briefs/{}", brief_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_paid_brief_needs_prize() {
    let t = setup_app().await;
    let (_, token) = t.register_user("owner").await;
    let brand_id = t.create_brand(&token, "Acme").await;

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&token),
            Some(json!({ "title": "Logo", "is_paid": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&token),
            Some(json!({ "title": "Logo", "is_paid": true, "prize_amount": 500.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_paid"], true);
}

#[tokio::test]
async fn test_tag_snapshots_and_filters() {
    let t = setup_app().await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;
    let (_, token) = t.register_user("owner").await;

    let (status, tag) = t
        .call(
            "POST",
            "/api/tags",
            Some(&admin),
            Some(json!({ "name": "  Branding " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tag["name"], "branding");
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let brand_id = t.create_brand(&token, "Acme").await;
    let (status, body) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&token),
            Some(json!({ "title": "Logo", "tag_ids": [tag_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tags"][0]["name"], "branding");
    t.create_brief(&token, &brand_id, "Untagged").await;

    // Renaming the tag leaves the snapshot alone
    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/tags/{}", tag_id),
            Some(&admin),
            Some(json!({ "name": "identity" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .call("GET", &format!("/api/briefs?tag={}", tag_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let briefs = body.as_array().unwrap();
    assert_eq!(briefs.len(), 1);
    assert_eq!(briefs[0]["tags"][0]["name"], "branding");

    let (_, body) = t
        .call("GET", "/api/briefs?status=draft&per_page=1", None, None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Unknown tags are rejected
    let (status, _) = t
        .call(
            "POST",
            &format!("/api/brands/{}/briefs", brand_id),
            Some(&token),
            Some(json!({ "title": "Bad", "tag_ids": ["missing"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Blank names are rejected after trimming
    let (status, body) = t
        .call("POST", "/api/tags", Some(&admin), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/tags/{}", tag_id),
            Some(&admin),
            Some(json!({ "name": " \t " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Regular users cannot manage tags
    let (status, body) = t
        .call("POST", "/api/tags", Some(&token), Some(json!({ "name": "spam" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");
}

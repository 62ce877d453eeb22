mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{authed_get, authed_put, register_user};

#[tokio::test]
async fn user_search_finds_others_but_not_self() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let me = register_user(base, "Search Self").await?;
    let other = register_user(base, "Search Other").await?;

    // searching for the other user's unique address finds exactly them
    let res = authed_get(
        base,
        &format!("/api/users/search?email={}", other.email),
        &me.token,
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let users = body["data"]["users"].as_array().context("users")?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], other.email.as_str());

    // the caller is excluded from their own results
    let res = authed_get(
        base,
        &format!("/api/users/search?email={}", me.email),
        &me.token,
    )
    .await?;
    let body: Value = res.json().await?;
    assert!(body["data"]["users"].as_array().context("users")?.is_empty());

    // missing query parameter is a 400
    let res = authed_get(base, "/api/users/search", &me.token).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Email query parameter is required");
    Ok(())
}

#[tokio::test]
async fn preferences_merge_across_updates() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let user = register_user(base, "Pref User").await?;

    let res = authed_put(
        base,
        "/api/users/preferences",
        &user.token,
        &json!({ "theme": "dark" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = authed_put(
        base,
        "/api/users/preferences",
        &user.token,
        &json!({ "language": "en" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;

    // earlier keys survive later partial updates
    assert_eq!(body["data"]["user"]["preferences"]["theme"], "dark");
    assert_eq!(body["data"]["user"]["preferences"]["language"], "en");
    Ok(())
}

#[tokio::test]
async fn stats_count_boards_and_assignments() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let user = register_user(base, "Stats User").await?;

    let res = common::authed_post(base, "/api/boards", &user.token, &json!({ "title": "Mine" }))
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "{}", res.text().await?);

    let res = authed_get(base, "/api/users/stats", &user.token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["stats"]["ownedBoards"], 1);
    assert_eq!(body["data"]["stats"]["totalBoards"], 1);
    assert_eq!(body["data"]["stats"]["memberBoards"], 0);
    Ok(())
}

#[tokio::test]
async fn profile_update_rejects_taken_email() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let a = register_user(base, "Email Holder").await?;
    let b = register_user(base, "Email Wanter").await?;

    let res = authed_put(
        base,
        "/api/auth/profile",
        &b.token,
        &json!({ "email": a.email }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Email is already taken");
    Ok(())
}

mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{authed_delete, authed_get, authed_post, authed_put, register_user};

async fn create_board(base: &str, token: &str, title: &str) -> Result<String> {
    let res = authed_post(base, "/api/boards", token, &json!({ "title": title })).await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "{}", res.text().await?);
    let body: Value = res.json().await?;
    Ok(body["data"]["board"]["id"].as_str().context("board id")?.to_string())
}

async fn create_list(base: &str, token: &str, board: &str, title: &str) -> Result<Value> {
    let res = authed_post(
        base,
        "/api/lists",
        token,
        &json!({ "title": title, "board": board }),
    )
    .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "{}", res.text().await?);
    let body: Value = res.json().await?;
    Ok(body["data"]["list"].clone())
}

async fn create_card(base: &str, token: &str, list: &str, title: &str) -> Result<Value> {
    let res = authed_post(
        base,
        "/api/cards",
        token,
        &json!({ "title": title, "list": list }),
    )
    .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "{}", res.text().await?);
    let body: Value = res.json().await?;
    Ok(body["data"]["card"].clone())
}

/// Positions of a board's lists, in returned order.
async fn list_positions(base: &str, token: &str, board: &str) -> Result<Vec<(String, i64)>> {
    let res = authed_get(base, &format!("/api/lists/board/{}", board), token).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "{}", res.text().await?);
    let body: Value = res.json().await?;
    Ok(body["data"]["lists"]
        .as_array()
        .context("lists")?
        .iter()
        .map(|l| {
            (
                l["title"].as_str().unwrap_or_default().to_string(),
                l["position"].as_i64().unwrap_or(-1),
            )
        })
        .collect())
}

async fn card_positions(base: &str, token: &str, list: &str) -> Result<Vec<(String, i64)>> {
    let res = authed_get(base, &format!("/api/cards/list/{}", list), token).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "{}", res.text().await?);
    let body: Value = res.json().await?;
    Ok(body["data"]["cards"]
        .as_array()
        .context("cards")?
        .iter()
        .map(|c| {
            (
                c["title"].as_str().unwrap_or_default().to_string(),
                c["position"].as_i64().unwrap_or(-1),
            )
        })
        .collect())
}

fn assert_contiguous(positions: &[(String, i64)]) {
    let mut seen: Vec<i64> = positions.iter().map(|(_, p)| *p).collect();
    seen.sort_unstable();
    let expected: Vec<i64> = (0..positions.len() as i64).collect();
    assert_eq!(seen, expected, "positions must be 0..n-1: {positions:?}");
}

#[tokio::test]
async fn editor_moves_card_between_lists() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    // owner U1 creates a private board; U2 joins as editor
    let u1 = register_user(base, "Worked Owner").await?;
    let u2 = register_user(base, "Worked Editor").await?;
    let board = create_board(base, &u1.token, "Worked Example").await?;
    let res = authed_post(
        base,
        &format!("/api/boards/{}/members", board),
        &u1.token,
        &json!({ "email": u2.email, "role": "editor" }),
    )
    .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "{}", res.text().await?);

    // U2 creates L1 then L2
    let l1 = create_list(base, &u2.token, &board, "L1").await?;
    let l2 = create_list(base, &u2.token, &board, "L2").await?;
    assert_eq!(l1["position"], 0);
    assert_eq!(l2["position"], 1);

    // U2 creates C1 in L1
    let l1_id = l1["id"].as_str().context("l1 id")?;
    let l2_id = l2["id"].as_str().context("l2 id")?;
    let c1 = create_card(base, &u2.token, l1_id, "C1").await?;
    assert_eq!(c1["position"], 0);

    // move C1 to L2 at position 0
    let c1_id = c1["id"].as_str().context("c1 id")?;
    let res = authed_put(
        base,
        &format!("/api/cards/{}/move", c1_id),
        &u2.token,
        &json!({ "listId": l2_id, "position": 0 }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["card"]["position"], 0);
    assert_eq!(body["data"]["card"]["listId"], l2_id);

    assert!(card_positions(base, &u2.token, l1_id).await?.is_empty());
    let l2_cards = card_positions(base, &u2.token, l2_id).await?;
    assert_eq!(l2_cards, vec![("C1".to_string(), 0)]);
    Ok(())
}

#[tokio::test]
async fn list_reorder_and_delete_keep_positions_contiguous() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let owner = register_user(base, "List Shuffler").await?;
    let board = create_board(base, &owner.token, "Reorder Board").await?;

    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let list = create_list(base, &owner.token, &board, title).await?;
        ids.push(list["id"].as_str().context("list id")?.to_string());
    }

    // move A (position 0) to position 2
    let res = authed_put(
        base,
        &format!("/api/lists/{}/reorder", ids[0]),
        &owner.token,
        &json!({ "position": 2 }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let positions = list_positions(base, &owner.token, &board).await?;
    assert_contiguous(&positions);
    assert_eq!(
        positions,
        vec![
            ("B".to_string(), 0),
            ("C".to_string(), 1),
            ("A".to_string(), 2),
            ("D".to_string(), 3),
        ]
    );

    // move D (position 3) back to position 0
    let res = authed_put(
        base,
        &format!("/api/lists/{}/reorder", ids[3]),
        &owner.token,
        &json!({ "position": 0 }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let positions = list_positions(base, &owner.token, &board).await?;
    assert_contiguous(&positions);
    assert_eq!(positions[0], ("D".to_string(), 0));

    // delete the middle list and the gap closes
    let res = authed_delete(base, &format!("/api/lists/{}", ids[2]), &owner.token).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let positions = list_positions(base, &owner.token, &board).await?;
    assert_eq!(positions.len(), 3);
    assert_contiguous(&positions);
    Ok(())
}

#[tokio::test]
async fn card_moves_shift_neighbors_in_both_lists() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let owner = register_user(base, "Card Shuffler").await?;
    let board = create_board(base, &owner.token, "Card Moves").await?;
    let todo = create_list(base, &owner.token, &board, "Todo").await?;
    let doing = create_list(base, &owner.token, &board, "Doing").await?;
    let todo_id = todo["id"].as_str().context("todo id")?;
    let doing_id = doing["id"].as_str().context("doing id")?;

    for title in ["t0", "t1", "t2"] {
        create_card(base, &owner.token, todo_id, title).await?;
    }
    for title in ["d0", "d1"] {
        create_card(base, &owner.token, doing_id, title).await?;
    }

    // move t1 (position 1 in Todo) to Doing position 0
    let todo_cards = card_positions(base, &owner.token, todo_id).await?;
    assert_eq!(todo_cards[1].0, "t1");
    let res = authed_get(base, &format!("/api/cards/list/{}", todo_id), &owner.token).await?;
    let body: Value = res.json().await?;
    let t1_id = body["data"]["cards"][1]["id"].as_str().context("t1 id")?.to_string();

    let res = authed_put(
        base,
        &format!("/api/cards/{}/move", t1_id),
        &owner.token,
        &json!({ "listId": doing_id, "position": 0 }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let todo_after = card_positions(base, &owner.token, todo_id).await?;
    assert_contiguous(&todo_after);
    assert_eq!(
        todo_after,
        vec![("t0".to_string(), 0), ("t2".to_string(), 1)]
    );

    // exactly one card at position 0, previously >= 0 shifted up by one
    let doing_after = card_positions(base, &owner.token, doing_id).await?;
    assert_contiguous(&doing_after);
    assert_eq!(
        doing_after,
        vec![
            ("t1".to_string(), 0),
            ("d0".to_string(), 1),
            ("d1".to_string(), 2),
        ]
    );

    // same-list move keeps the collection contiguous too
    let res = authed_put(
        base,
        &format!("/api/cards/{}/move", t1_id),
        &owner.token,
        &json!({ "listId": doing_id, "position": 2 }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doing_after = card_positions(base, &owner.token, doing_id).await?;
    assert_contiguous(&doing_after);
    assert_eq!(doing_after[2], ("t1".to_string(), 2));
    Ok(())
}

#[tokio::test]
async fn deleting_a_board_cascades_to_lists_cards_and_comments() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let base = &server.base_url;

    let owner = register_user(base, "Cascade Owner").await?;
    let board = create_board(base, &owner.token, "Doomed Board").await?;
    let list = create_list(base, &owner.token, &board, "Doomed List").await?;
    let list_id = list["id"].as_str().context("list id")?;

    let mut card_ids = Vec::new();
    for title in ["c0", "c1"] {
        let card = create_card(base, &owner.token, list_id, title).await?;
        card_ids.push(card["id"].as_str().context("card id")?.to_string());
    }

    let res = authed_post(
        base,
        &format!("/api/cards/{}/comments", card_ids[0]),
        &owner.token,
        &json!({ "text": "about to disappear" }),
    )
    .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "{}", res.text().await?);

    let res = authed_delete(base, &format!("/api/boards/{}", board), &owner.token).await?;
    assert_eq!(res.status(), StatusCode::OK);

    // nothing referencing the board may survive
    let url = std::env::var("DATABASE_URL")?;
    let pool = sqlx::postgres::PgPool::connect(&url).await?;
    let board_id: uuid::Uuid = board.parse()?;
    let card_uuids: Vec<uuid::Uuid> = card_ids
        .iter()
        .map(|id| id.parse())
        .collect::<Result<_, _>>()?;

    let lists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lists WHERE board_id = $1")
        .bind(board_id)
        .fetch_one(&pool)
        .await?;
    let cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE board_id = $1")
        .bind(board_id)
        .fetch_one(&pool)
        .await?;
    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE card_id = ANY($1)")
        .bind(&card_uuids)
        .fetch_one(&pool)
        .await?;

    assert_eq!((lists, cards, comments), (0, 0, 0));
    Ok(())
}

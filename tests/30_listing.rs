mod common;

use std::collections::HashSet;

use anyhow::Result;
use portfolio_api::config::FilterConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;

use common::{id_of, ids_of, TestServer};

async fn seed_categories(server: &TestServer, count: usize) -> Result<Vec<i64>> {
    let mut ids = vec![];
    for i in 1..=count {
        let kind = if i % 3 == 0 { "soft" } else { "tech" };
        let (status, body) = server
            .post("/api/categories", json!({ "code": format!("cat-{:02}", i), "type": kind }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "seed failed: {}", body);
        ids.push(id_of(&body)?);
    }
    Ok(ids)
}

#[sqlx::test(migrations = "./migrations")]
async fn pages_are_contiguous_and_total_is_stable(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let seeded = seed_categories(&server, 7).await?;

    let mut seen = vec![];
    for (page, expected_len) in [(1, 3), (2, 3), (3, 1), (4, 0)] {
        let (status, body) = server
            .get(&format!("/api/categories/full?page={}&pageSize=3", page))
            .await?;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["total"], 7);
        assert_eq!(body["page"], page);
        assert_eq!(body["pageSize"], 3);
        let ids = ids_of(&body);
        assert_eq!(ids.len(), expected_len, "page {}", page);
        seen.extend(ids);
    }

    let unique: HashSet<i64> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "pages overlap");
    assert_eq!(seen, seeded, "default order is by id");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn total_counts_filtered_rows(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    seed_categories(&server, 9).await?;

    let (status, body) = server
        .get("/api/categories/full?filterField[]=type&filterValue[]=soft&filterOperator[]=equals&pageSize=2")
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total"], 3);
    assert_eq!(ids_of(&body).len(), 2);

    // Operators default to `contains` and match case-insensitively.
    let (_, body) = server
        .get("/api/categories/full?filterField[]=code&filterValue[]=CAT-0")
        .await?;
    assert_eq!(body["total"], 9);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn sort_order_is_applied(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    seed_categories(&server, 4).await?;

    let (_, body) = server.get("/api/categories/full?sortField=code&sortOrder=desc").await?;
    let codes: Vec<Value> = body["items"]
        .as_array()
        .map(|items| items.iter().map(|i| i["code"].clone()).collect())
        .unwrap_or_default();
    assert_eq!(codes, vec![json!("cat-04"), json!("cat-03"), json!("cat-02"), json!("cat-01")]);

    let (status, _) = server.get("/api/categories/full?sortOrder=sideways").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn localized_fields_filter_and_sort_by_text(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let en = server.language("en", "English", true).await?;

    let mut ids = vec![];
    for name in ["Python", "Go", "Rust"] {
        let (_, body) = server
            .post(
                "/api/skills",
                json!({ "type": "language", "skill_texts": [{ "language_id": en, "name": name }] }),
            )
            .await?;
        ids.push(id_of(&body)?);
    }

    let (_, body) = server.get("/api/skills/full?sortField=name").await?;
    assert_eq!(ids_of(&body), vec![ids[1], ids[0], ids[2]]);

    // `?name=` is a shortcut for a `contains` filter.
    let (_, body) = server.get("/api/skills/full?name=ru").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(ids_of(&body), vec![ids[2]]);

    let (_, body) = server.get("/api/skills/full?type=lang").await?;
    assert_eq!(body["total"], 3);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn relation_filters_match_linked_ids(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    let (_, rust) = server.post("/api/skills", json!({ "type": "tech" })).await?;
    let (_, sql) = server.post("/api/skills", json!({ "type": "tech" })).await?;
    let (rust, sql) = (id_of(&rust)?, id_of(&sql)?);

    let (_, api) = server.post("/api/projects", json!({ "skills": [rust, sql] })).await?;
    let (_, cli) = server.post("/api/projects", json!({ "skills": [rust] })).await?;
    let (api, cli) = (id_of(&api)?, id_of(&cli)?);

    let (_, body) = server
        .get(&format!("/api/projects/full?filterField[]=skills&filterValue[]={}", sql))
        .await?;
    assert_eq!(ids_of(&body), vec![api]);

    let (_, body) = server
        .get(&format!("/api/projects/full?filterField[]=skill&filterValue[]={}", rust))
        .await?;
    assert_eq!(ids_of(&body), vec![api, cli]);

    let (status, _) = server
        .get("/api/projects/full?filterField[]=skills&filterValue[]=rust")
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn malformed_listing_parameters_are_rejected(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    for query in [
        "page=0",
        "pageSize=0",
        "pageSize=101",
        "page=abc",
        "page=9223372036854775807",
        "page=9223372036854775807&pageSize=10",
        "filterField[]=code",
        "filterField[]=password&filterValue[]=x",
        "sortField=password",
        "filterField[]=code&filterValue[]=x&filterOperator[]=gt",
    ] {
        let (status, body) = server.get(&format!("/api/categories/full?{}", query)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", query, body);
        assert_eq!(body["code"], "VALIDATION_ERROR", "{}", query);
    }
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn lenient_mode_ignores_unknown_fields(pool: PgPool) -> Result<()> {
    let filter = FilterConfig {
        strict_fields: false,
        ..FilterConfig::default()
    };
    let server = TestServer::start_with(pool, filter).await?;
    seed_categories(&server, 2).await?;

    let (status, body) = server
        .get("/api/categories/full?filterField[]=password&filterValue[]=x&sortField=nope")
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total"], 2);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn extended_operators_apply_to_roles(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let mut ids = vec![];
    for name in ["admin", "editor", "viewer"] {
        let (_, body) = server.post("/api/roles", json!({ "name": name, "description": "" })).await?;
        ids.push(id_of(&body)?);
    }

    let (status, body) = server
        .get(&format!("/api/roles/full?filterField[]=id&filterValue[]={}&filterOperator[]=gt", ids[0]))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(ids_of(&body), vec![ids[1], ids[2]]);

    let (status, _) = server
        .get("/api/roles/full?filterField[]=name&filterValue[]=admin&filterOperator[]=equals")
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

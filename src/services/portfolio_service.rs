use once_cell::sync::Lazy;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::database::models::{ImageInput, ImageOut, Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::database::relations::{
    replace_links, PORTFOLIO_CATEGORIES, PORTFOLIO_EXPERIENCES, PORTFOLIO_PROJECTS, PORTFOLIO_SECTIONS,
};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::PORTFOLIOS, ListParams};

use super::refs::{category_refs, experience_refs, images_json, project_refs, section_refs};
use super::{fetch_one, fetch_ordered, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"name\", t.\"description\", {} AS \"categories\", {} AS \"experiences\", \
         {} AS \"projects\", {} AS \"sections\", {} AS \"images\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"portfolios\" t",
        category_refs(&PORTFOLIO_CATEGORIES, "t.\"id\""),
        experience_refs(&PORTFOLIO_EXPERIENCES, "t.\"id\""),
        project_refs(&PORTFOLIO_PROJECTS, "t.\"id\""),
        section_refs(&PORTFOLIO_SECTIONS, "t.\"id\""),
        images_json("portfolio_images", "portfolio_id", "t.\"id\"")
    )
});

pub struct PortfolioService {
    pool: PgPool,
}

impl PortfolioService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_names(&self) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar("SELECT \"name\" FROM \"portfolios\" ORDER BY \"id\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Portfolio>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&PORTFOLIOS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Portfolio, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Portfolio not found".to_string()))
    }

    pub async fn create(&self, input: PortfolioCreate, actor: Option<i64>) -> Result<Portfolio, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"portfolios\" (\"name\", \"description\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_links(&mut tx, &PORTFOLIO_CATEGORIES, id, &input.categories).await?;
        replace_links(&mut tx, &PORTFOLIO_EXPERIENCES, id, &input.experiences).await?;
        replace_links(&mut tx, &PORTFOLIO_PROJECTS, id, &input.projects).await?;
        replace_links(&mut tx, &PORTFOLIO_SECTIONS, id, &input.sections).await?;
        for image in &input.images {
            insert_image(&mut tx, id, image, actor).await?;
        }
        tx.commit().await?;

        info!("Created portfolio {} ({})", input.name, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: PortfolioUpdate, actor: Option<i64>) -> Result<Portfolio, DatabaseError> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"portfolios\" SET \"name\" = COALESCE($2, \"name\"), \"description\" = COALESCE($3, \"description\"), \
             \"updated_at\" = now(), \"updated_by\" = $4 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        let links = [
            (&PORTFOLIO_CATEGORIES, &input.categories),
            (&PORTFOLIO_EXPERIENCES, &input.experiences),
            (&PORTFOLIO_PROJECTS, &input.projects),
            (&PORTFOLIO_SECTIONS, &input.sections),
        ];
        for (link, ids) in links {
            if let Some(ids) = ids {
                replace_links(&mut tx, link, id, ids).await?;
            }
        }
        tx.commit().await?;

        debug!("Updated portfolio {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Portfolio, DatabaseError> {
        let portfolio = self.get(id).await?;
        sqlx::query("DELETE FROM \"portfolios\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted portfolio {} ({})", portfolio.name, id);
        Ok(portfolio)
    }

    pub async fn add_image(&self, id: i64, image: &ImageInput, actor: Option<i64>) -> Result<ImageOut, DatabaseError> {
        self.get(id).await?;
        let mut conn = self.pool.acquire().await?;
        insert_image(&mut conn, id, image, actor).await
    }

    pub async fn delete_image(&self, id: i64, image_id: i64) -> Result<ImageOut, DatabaseError> {
        sqlx::query_as(
            "DELETE FROM \"portfolio_images\" WHERE \"id\" = $2 AND \"portfolio_id\" = $1 \
             RETURNING \"id\", \"image_path\", \"category\"",
        )
        .bind(id)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Portfolio image not found".to_string()))
    }
}

async fn insert_image(
    conn: &mut PgConnection,
    portfolio_id: i64,
    image: &ImageInput,
    actor: Option<i64>,
) -> Result<ImageOut, DatabaseError> {
    let image = sqlx::query_as(
        "INSERT INTO \"portfolio_images\" (\"portfolio_id\", \"image_path\", \"category\", \"created_by\", \"updated_by\") \
         VALUES ($1, $2, $3, $4, $4) RETURNING \"id\", \"image_path\", \"category\"",
    )
    .bind(portfolio_id)
    .bind(&image.image_path)
    .bind(&image.category)
    .bind(actor)
    .fetch_one(&mut *conn)
    .await?;
    Ok(image)
}

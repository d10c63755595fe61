use once_cell::sync::Lazy;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::database::models::{
    AttachmentInput, AttachmentOut, ImageInput, ImageOut, NamedSummary, Project, ProjectCreate, ProjectUpdate,
};
use crate::database::relations::{replace_links, PROJECT_CATEGORIES, PROJECT_SKILLS};
use crate::database::texts::{default_text_expr, replace_texts, texts_json};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::fields::{PROJECTS, PROJECT_TEXTS};
use crate::filter::ListParams;

use super::refs::{category_refs, images_json, skill_refs};
use super::{fetch_one, fetch_ordered, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"repository_url\", t.\"website_url\", {} AS \"project_texts\", {} AS \"images\", \
         COALESCE((SELECT json_agg(json_build_object('id', a.\"id\", 'file_path', a.\"file_path\", \
         'file_name', a.\"file_name\") ORDER BY a.\"id\") FROM \"project_attachments\" a \
         WHERE a.\"project_id\" = t.\"id\"), '[]'::json) AS \"attachments\", {} AS \"categories\", {} AS \"skills\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"projects\" t",
        texts_json(&PROJECT_TEXTS, &["name", "description"], "t.\"id\""),
        images_json("project_images", "project_id", "t.\"id\""),
        category_refs(&PROJECT_CATEGORIES, "t.\"id\""),
        skill_refs(&PROJECT_SKILLS, "t.\"id\"")
    )
});

static SUMMARY: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", {} AS \"name\" FROM \"projects\" t ORDER BY t.\"id\"",
        default_text_expr(&PROJECT_TEXTS, "name", "t.\"id\"")
    )
});

pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `{id, name}` of every project, named in the default language.
    pub async fn list_summaries(&self) -> Result<Vec<NamedSummary>, DatabaseError> {
        let summaries = sqlx::query_as(&SUMMARY).fetch_all(&self.pool).await?;
        Ok(summaries)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Project>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&PROJECTS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Project, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Project not found".to_string()))
    }

    pub async fn create(&self, input: ProjectCreate, actor: Option<i64>) -> Result<Project, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"projects\" (\"repository_url\", \"website_url\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.repository_url)
        .bind(&input.website_url)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_texts(&mut tx, &PROJECT_TEXTS, id, &input.project_texts, actor).await?;
        replace_links(&mut tx, &PROJECT_CATEGORIES, id, &input.categories).await?;
        replace_links(&mut tx, &PROJECT_SKILLS, id, &input.skills).await?;
        for image in &input.images {
            insert_image(&mut tx, id, image, actor).await?;
        }
        for attachment in &input.attachments {
            insert_attachment(&mut tx, id, attachment, actor).await?;
        }
        tx.commit().await?;

        info!("Created project {}", id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: ProjectUpdate, actor: Option<i64>) -> Result<Project, DatabaseError> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"projects\" SET \"repository_url\" = COALESCE($2, \"repository_url\"), \
             \"website_url\" = COALESCE($3, \"website_url\"), \"updated_at\" = now(), \"updated_by\" = $4 \
             WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.repository_url)
        .bind(&input.website_url)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(texts) = &input.project_texts {
            replace_texts(&mut tx, &PROJECT_TEXTS, id, texts, actor).await?;
        }
        if let Some(categories) = &input.categories {
            replace_links(&mut tx, &PROJECT_CATEGORIES, id, categories).await?;
        }
        if let Some(skills) = &input.skills {
            replace_links(&mut tx, &PROJECT_SKILLS, id, skills).await?;
        }
        tx.commit().await?;

        debug!("Updated project {}", id);
        self.get(id).await
    }

    /// Deletes the project; its images and attachments cascade. The returned
    /// project still lists them so their files can be removed.
    pub async fn delete(&self, id: i64) -> Result<Project, DatabaseError> {
        let project = self.get(id).await?;
        sqlx::query("DELETE FROM \"projects\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted project {}", id);
        Ok(project)
    }

    pub async fn add_image(&self, id: i64, image: &ImageInput, actor: Option<i64>) -> Result<ImageOut, DatabaseError> {
        self.get(id).await?;
        let mut conn = self.pool.acquire().await?;
        insert_image(&mut conn, id, image, actor).await
    }

    /// Removes the image row and returns it.
    pub async fn delete_image(&self, id: i64, image_id: i64) -> Result<ImageOut, DatabaseError> {
        sqlx::query_as(
            "DELETE FROM \"project_images\" WHERE \"id\" = $2 AND \"project_id\" = $1 \
             RETURNING \"id\", \"image_path\", \"category\"",
        )
        .bind(id)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Project image not found".to_string()))
    }

    pub async fn add_attachment(
        &self,
        id: i64,
        attachment: &AttachmentInput,
        actor: Option<i64>,
    ) -> Result<AttachmentOut, DatabaseError> {
        self.get(id).await?;
        let mut conn = self.pool.acquire().await?;
        insert_attachment(&mut conn, id, attachment, actor).await
    }

    pub async fn delete_attachment(&self, id: i64, attachment_id: i64) -> Result<AttachmentOut, DatabaseError> {
        sqlx::query_as(
            "DELETE FROM \"project_attachments\" WHERE \"id\" = $2 AND \"project_id\" = $1 \
             RETURNING \"id\", \"file_path\", \"file_name\"",
        )
        .bind(id)
        .bind(attachment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Project attachment not found".to_string()))
    }
}

async fn insert_image(
    conn: &mut PgConnection,
    project_id: i64,
    image: &ImageInput,
    actor: Option<i64>,
) -> Result<ImageOut, DatabaseError> {
    let image = sqlx::query_as(
        "INSERT INTO \"project_images\" (\"project_id\", \"image_path\", \"category\", \"created_by\", \"updated_by\") \
         VALUES ($1, $2, $3, $4, $4) RETURNING \"id\", \"image_path\", \"category\"",
    )
    .bind(project_id)
    .bind(&image.image_path)
    .bind(&image.category)
    .bind(actor)
    .fetch_one(&mut *conn)
    .await?;
    Ok(image)
}

async fn insert_attachment(
    conn: &mut PgConnection,
    project_id: i64,
    attachment: &AttachmentInput,
    actor: Option<i64>,
) -> Result<AttachmentOut, DatabaseError> {
    let attachment = sqlx::query_as(
        "INSERT INTO \"project_attachments\" (\"project_id\", \"file_path\", \"file_name\", \"created_by\", \"updated_by\") \
         VALUES ($1, $2, $3, $4, $4) RETURNING \"id\", \"file_path\", \"file_name\"",
    )
    .bind(project_id)
    .bind(&attachment.file_path)
    .bind(&attachment.file_name)
    .bind(actor)
    .fetch_one(&mut *conn)
    .await?;
    Ok(attachment)
}

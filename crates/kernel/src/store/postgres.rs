//! PostgreSQL menu store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{
    CategoryRecord, ItemRecord, MenuContents, MenuRecord, MenuStore, NewMenu, SLUG_CONSTRAINT,
    StoreError,
};

const MENU_COLUMNS: &str =
    "id, user_id, business_name, slug, public_url, currency, is_published, created_at";

const ITEM_COLUMNS: &str = "id, menu_id, category_id, name, price::float8 AS price, description, \
     has_image, image_url, is_available, sort_order";

/// Menu store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate a sqlx error into a [`StoreError`], recognising the slug
/// uniqueness constraint and other integrity violations.
fn classify(err: sqlx::Error, slug: Option<&str>) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(SLUG_CONSTRAINT) {
            return StoreError::SlugConflict(slug.unwrap_or_default().to_string());
        }
        if db_err.is_unique_violation()
            || db_err.is_foreign_key_violation()
            || db_err.is_check_violation()
        {
            return StoreError::Constraint(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn list_menus_by_owner(&self, owner_id: Uuid) -> Result<Vec<MenuRecord>, StoreError> {
        let menus = sqlx::query_as::<_, MenuRecord>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(menus)
    }

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, StoreError> {
        let menu = sqlx::query_as::<_, MenuRecord>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(menu)
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<MenuRecord>, StoreError> {
        let menu = sqlx::query_as::<_, MenuRecord>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE slug = $1 AND is_published = TRUE"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(menu)
    }

    async fn slug_holder(&self, slug: &str) -> Result<Option<Uuid>, StoreError> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM menus WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn list_categories(&self, menu_id: Uuid) -> Result<Vec<CategoryRecord>, StoreError> {
        let categories = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, menu_id, name, sort_order FROM categories WHERE menu_id = $1 ORDER BY sort_order, id",
        )
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn list_items(&self, menu_id: Uuid) -> Result<Vec<ItemRecord>, StoreError> {
        let items = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE menu_id = $1 ORDER BY sort_order, id"
        ))
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn insert_menu(&self, input: NewMenu) -> Result<MenuRecord, StoreError> {
        let id = Uuid::now_v7();

        let menu = sqlx::query_as::<_, MenuRecord>(&format!(
            r#"
            INSERT INTO menus (id, user_id, business_name, currency, is_published)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.user_id)
        .bind(&input.business_name)
        .bind(&input.currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, None))?;

        Ok(menu)
    }

    async fn replace_menu_contents(&self, contents: MenuContents) -> Result<bool, StoreError> {
        let slug = contents.menu.slug.as_deref();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE menus
            SET business_name = $1, currency = $2, slug = $3, public_url = $4, is_published = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&contents.menu.business_name)
        .bind(&contents.menu.currency)
        .bind(slug)
        .bind(&contents.menu.public_url)
        .bind(contents.menu.is_published)
        .bind(contents.menu_id)
        .bind(contents.owner_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify(e, slug))?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM items WHERE menu_id = $1")
            .bind(contents.menu_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE menu_id = $1")
            .bind(contents.menu_id)
            .execute(&mut *tx)
            .await?;

        for category in &contents.categories {
            sqlx::query(
                "INSERT INTO categories (id, menu_id, name, sort_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(category.id)
            .bind(contents.menu_id)
            .bind(&category.name)
            .bind(category.sort_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, slug))?;
        }

        for item in &contents.items {
            sqlx::query(
                r#"
                INSERT INTO items (id, menu_id, category_id, name, price, description,
                                   has_image, image_url, is_available, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(item.id)
            .bind(contents.menu_id)
            .bind(item.category_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(&item.description)
            .bind(item.has_image)
            .bind(&item.image_url)
            .bind(item.is_available)
            .bind(item.sort_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, slug))?;
        }

        tx.commit().await?;

        debug!(
            menu_id = %contents.menu_id,
            categories = contents.categories.len(),
            items = contents.items.len(),
            "menu contents replaced"
        );

        Ok(true)
    }

    async fn delete_menu(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}

impl std::fmt::Debug for PgMenuStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgMenuStore").finish_non_exhaustive()
    }
}

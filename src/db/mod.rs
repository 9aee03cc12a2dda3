//! SQLite persistence for canonical products and their issues.
//!
//! Storage is keyed by product id (`products`) and by `(id, issue)`
//! (`issues`), so re-running the pipeline against the same feed overwrites
//! prior values instead of duplicating rows. All writes for one run happen
//! inside a single transaction: a failure mid-save leaves nothing behind.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{Issue, IssueCode, Product};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub title: Option<String>,
    /// AI-improved title; survives runs where no improvement was produced.
    pub improved_title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub gtin: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub category: Option<String>,
    pub availability: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Handle to the product store.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) a file-backed store and bootstrap its schema.
    ///
    /// The path is configuration: it comes from the CLI or environment, never
    /// from a baked-in literal.
    pub async fn connect(path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.bootstrap().await?;
        Ok(db)
    }

    /// In-memory store for tests.
    pub async fn connect_in_memory() -> DbResult<Self> {
        // A single connection keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.bootstrap().await?;
        Ok(db)
    }

    async fn bootstrap(&self) -> DbResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products ( \
                 id TEXT PRIMARY KEY, \
                 title TEXT, \
                 improved_title TEXT, \
                 description TEXT, \
                 price REAL, \
                 currency TEXT, \
                 gtin TEXT, \
                 brand TEXT, \
                 image_url TEXT, \
                 product_url TEXT, \
                 category TEXT, \
                 availability TEXT, \
                 updated_at TEXT NOT NULL \
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS issues ( \
                 id TEXT NOT NULL, \
                 issue TEXT NOT NULL, \
                 PRIMARY KEY (id, issue) \
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upsert a batch of products (with optional improved titles) and their
    /// issues in one transaction.
    ///
    /// Conflicts on `id` update every product column in place, except
    /// `improved_title`, which only moves forward: a `None` improvement never
    /// overwrites a previously stored title. Issue conflicts are ignored —
    /// `(id, issue)` pairs are a set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DbError::Sqlx`] if any statement fails; the
    /// transaction rolls back and nothing is visible.
    pub async fn save(
        &self,
        products: &[(Product, Option<String>)],
        issues: &[Issue],
    ) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (product, improved) in products {
            sqlx::query(
                "INSERT INTO products \
                     (id, title, improved_title, description, price, currency, \
                      gtin, brand, image_url, product_url, category, availability, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                     title          = excluded.title, \
                     improved_title = COALESCE(excluded.improved_title, improved_title), \
                     description    = excluded.description, \
                     price          = excluded.price, \
                     currency       = excluded.currency, \
                     gtin           = excluded.gtin, \
                     brand          = excluded.brand, \
                     image_url      = excluded.image_url, \
                     product_url    = excluded.product_url, \
                     category       = excluded.category, \
                     availability   = excluded.availability, \
                     updated_at     = excluded.updated_at",
            )
            .bind(&product.id)
            .bind(&product.title)
            .bind(improved)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.currency)
            .bind(&product.gtin)
            .bind(&product.brand)
            .bind(&product.image_url)
            .bind(&product.product_url)
            .bind(&product.category)
            .bind(product.availability.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for issue in issues {
            sqlx::query(
                "INSERT INTO issues (id, issue) VALUES (?, ?) \
                 ON CONFLICT(id, issue) DO NOTHING",
            )
            .bind(&issue.id)
            .bind(issue.code.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Number of stored products.
    pub async fn product_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of stored `(id, issue)` pairs.
    pub async fn issue_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetch one stored product by id.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, improved_title, description, price, currency, \
                    gtin, brand, image_url, product_url, category, availability, updated_at \
             FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Issue codes stored for one product id, alphabetical.
    pub async fn issues_for(&self, id: &str) -> DbResult<Vec<IssueCode>> {
        let codes: Vec<String> =
            sqlx::query_scalar("SELECT issue FROM issues WHERE id = ? ORDER BY issue")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        Ok(codes
            .iter()
            .filter_map(|code| IssueCode::from_code(code))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, IssueCode};

    fn sample_product(id: &str) -> Product {
        let mut p = Product::new(id);
        p.title = Some("Löpband X1".into());
        p.price = Some(4999.0);
        p.gtin = Some("7312345678903".into());
        p.availability = Availability::InStock;
        p
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let db = Database::connect_in_memory().await.unwrap();
        let products = vec![(sample_product("A100"), Some("Acme Löpband X1".to_string()))];
        let issues = vec![Issue::new("A100", IssueCode::MissingImageUrl)];

        db.save(&products, &issues).await.unwrap();

        let row = db.get_product("A100").await.unwrap().unwrap();
        assert_eq!(row.title.as_deref(), Some("Löpband X1"));
        assert_eq!(row.improved_title.as_deref(), Some("Acme Löpband X1"));
        assert_eq!(row.price, Some(4999.0));
        assert_eq!(row.availability.as_deref(), Some("in_stock"));
        assert_eq!(
            db.issues_for("A100").await.unwrap(),
            vec![IssueCode::MissingImageUrl]
        );
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        let products = vec![
            (sample_product("A100"), None),
            (sample_product("A200"), None),
        ];
        let issues = vec![
            Issue::new("A100", IssueCode::MissingImageUrl),
            Issue::new("A100", IssueCode::WeakTitle),
        ];

        db.save(&products, &issues).await.unwrap();
        db.save(&products, &issues).await.unwrap();

        assert_eq!(db.product_count().await.unwrap(), 2);
        assert_eq!(db.issue_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_none_improvement_does_not_clobber_stored_title() {
        let db = Database::connect_in_memory().await.unwrap();
        let p = sample_product("A100");

        db.save(&[(p.clone(), Some("Acme Löpband X1".to_string()))], &[])
            .await
            .unwrap();
        db.save(&[(p, None)], &[]).await.unwrap();

        let row = db.get_product("A100").await.unwrap().unwrap();
        assert_eq!(row.improved_title.as_deref(), Some("Acme Löpband X1"));
    }

    #[tokio::test]
    async fn test_rerun_overwrites_changed_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut p = sample_product("A100");
        db.save(&[(p.clone(), None)], &[]).await.unwrap();

        p.price = Some(3999.0);
        p.availability = Availability::OutOfStock;
        db.save(&[(p, None)], &[]).await.unwrap();

        let row = db.get_product("A100").await.unwrap().unwrap();
        assert_eq!(row.price, Some(3999.0));
        assert_eq!(row.availability.as_deref(), Some("out_of_stock"));
        assert_eq!(db.product_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.db");
        let db = Database::connect(path.to_str().unwrap()).await.unwrap();

        db.save(&[(sample_product("A100"), None)], &[]).await.unwrap();
        assert_eq!(db.product_count().await.unwrap(), 1);
        assert!(path.exists());
    }
}

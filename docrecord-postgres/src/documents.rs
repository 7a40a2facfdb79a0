//! Document repository
//!
//! One row per record:
//! - `id` holds the record's `_id` as JSONB
//! - `body` holds the whole record, `_id` included
//! - create: plain INSERT, the primary key rejects duplicates
//! - merge: `body || patch`, upserting via ON CONFLICT

use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use docrecord_core::{Record, RecordId, UpdateOutcome};

/// Repository over `docrecord_documents`.
pub struct DocumentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All bodies in `collection`, oldest first.
    pub async fn list(&self, collection: &str) -> Result<Vec<JsonValue>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM docrecord_documents
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("body")).collect())
    }

    pub async fn get(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<JsonValue>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT body
            FROM docrecord_documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_value())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| row.get("body")))
    }

    /// Insert `record` under `id`. A duplicate surfaces as a unique violation.
    pub async fn insert(
        &self,
        collection: &str,
        id: &RecordId,
        record: &Record,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO docrecord_documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection)
        .bind(id.as_value())
        .bind(Json(record))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Overlay `patch` onto the stored body.
    ///
    /// With `upsert`, a missing row is inserted with `patch` as its body;
    /// `xmax = 0` tells a fresh insert apart from a conflict update.
    pub async fn merge(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Record,
        upsert: bool,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        if !upsert {
            let result = sqlx::query(
                r#"
                UPDATE docrecord_documents
                SET body = body || $3
                WHERE collection = $1 AND id = $2
                "#,
            )
            .bind(collection)
            .bind(id.as_value())
            .bind(Json(patch.without_id()))
            .execute(self.pool)
            .await?;
            return Ok(UpdateOutcome::matched(result.rows_affected()));
        }

        let mut created = patch.clone();
        created.set_id(id);

        let row = sqlx::query(
            r#"
            INSERT INTO docrecord_documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE
            SET body = docrecord_documents.body || $4
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(collection)
        .bind(id.as_value())
        .bind(Json(&created))
        .bind(Json(patch.without_id()))
        .fetch_one(self.pool)
        .await?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            UpdateOutcome::upserted()
        } else {
            UpdateOutcome::matched(1)
        })
    }

    /// Delete by id (idempotent); returns rows removed.
    pub async fn delete(&self, collection: &str, id: &RecordId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM docrecord_documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_value())
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

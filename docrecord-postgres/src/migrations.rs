//! Schema for the document table

use sqlx::PgPool;

/// Create the document table and its ordering index if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::debug!("Ensuring docrecord schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS docrecord_documents (
            collection TEXT NOT NULL,
            id JSONB NOT NULL,
            body JSONB NOT NULL,
            seq BIGSERIAL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_docrecord_documents_seq
        ON docrecord_documents (collection, seq)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

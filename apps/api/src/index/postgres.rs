use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;

use crate::errors::MatchError;
use crate::index::{check_k, IndexEntry, IndexHit, VectorIndex};

/// pgvector-backed index over the `profile_vectors` table.
///
/// Each upsert is a single `INSERT ... ON CONFLICT` statement, so a reader sees either
/// the old row or the new one.
#[derive(Clone)]
pub struct PgVectorIndex {
    pool: PgPool,
    dimension: usize,
}

/// Nearest neighbours by cosine distance (`<=>`); similarity = 1 - distance.
///
/// Rows written under another embedding dimension are skipped: pgvector refuses to
/// compare vectors of different sizes, and one stale row would fail the whole query.
const QUERY_SQL: &str = r#"
    SELECT profile_id,
           account_id,
           (1 - (embedding <=> $1))::float8 AS similarity
    FROM profile_vectors
    WHERE vector_dims(embedding) = $3
    ORDER BY embedding <=> $1, inserted_at DESC
    LIMIT $2
"#;

#[derive(sqlx::FromRow)]
struct HitRow {
    profile_id: String,
    account_id: String,
    similarity: f64,
}

impl PgVectorIndex {
    pub fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), MatchError> {
        if vector.len() != self.dimension {
            return Err(MatchError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Entries written under another dimension. Queries skip them until their
    /// accounts re-ingest.
    pub async fn stale_entries(&self) -> Result<usize, MatchError> {
        let (n,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM profile_vectors WHERE vector_dims(embedding) <> $1")
                .bind(self.dimension as i32)
                .fetch_one(&self.pool)
                .await?;
        Ok(n.max(0) as usize)
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn upsert(&self, entry: IndexEntry) -> Result<(), MatchError> {
        self.check_dimension(&entry.vector)?;

        sqlx::query(
            r#"
            INSERT INTO profile_vectors (profile_id, account_id, embedding, inserted_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (profile_id) DO UPDATE
               SET account_id  = EXCLUDED.account_id,
                   embedding   = EXCLUDED.embedding,
                   inserted_at = EXCLUDED.inserted_at
            "#,
        )
        .bind(&entry.profile_id)
        .bind(&entry.account_id)
        .bind(Vector::from(entry.vector))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(&self, vector: &[f32], k: i64) -> Result<Vec<IndexHit>, MatchError> {
        check_k(k)?;
        self.check_dimension(vector)?;

        let rows: Vec<HitRow> = sqlx::query_as(QUERY_SQL)
            .bind(Vector::from(vector.to_vec()))
            .bind(k)
            .bind(self.dimension as i32)
            .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| IndexHit {
                profile_id: r.profile_id,
                account_id: r.account_id,
                similarity: if r.similarity.is_nan() {
                    0.0
                } else {
                    r.similarity.clamp(-1.0, 1.0)
                },
            })
            .collect())
    }

    async fn delete(&self, profile_id: &str) -> Result<(), MatchError> {
        sqlx::query("DELETE FROM profile_vectors WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, MatchError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile_vectors")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as usize)
    }

    fn backend(&self) -> &'static str {
        "pgvector"
    }
}

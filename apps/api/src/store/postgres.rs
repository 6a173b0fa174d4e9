use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::errors::MatchError;
use crate::models::profile::{Certification, Profile, Skill};
use crate::store::{ProfileStore, SkillFrequencies};

/// Profiles in the `candidate_profiles` table, list fields as JSONB.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    account_id: String,
    display_name: String,
    email: String,
    phone: String,
    summary: String,
    skills: Json<Vec<Skill>>,
    certifications: Json<Vec<Certification>>,
    experience: Json<Vec<String>>,
    education: Json<Vec<String>>,
    experience_years: Option<i32>,
    embedding: Vec<f32>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            account_id: row.account_id,
            display_name: row.display_name,
            email: row.email,
            phone: row.phone,
            summary: row.summary,
            skills: row.skills.0,
            certifications: row.certifications.0,
            experience: row.experience.0,
            education: row.education.0,
            experience_years: row.experience_years.and_then(|y| u32::try_from(y).ok()),
            embedding: row.embedding,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "account_id, display_name, email, phone, summary, skills, certifications, \
     experience, education, experience_years, embedding, updated_at";

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn put(&self, profile: &Profile) -> Result<(), MatchError> {
        sqlx::query(
            r#"
            INSERT INTO candidate_profiles
                (account_id, display_name, email, phone, summary, skills, certifications,
                 experience, education, experience_years, embedding, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (account_id) DO UPDATE
               SET display_name     = EXCLUDED.display_name,
                   email            = EXCLUDED.email,
                   phone            = EXCLUDED.phone,
                   summary          = EXCLUDED.summary,
                   skills           = EXCLUDED.skills,
                   certifications   = EXCLUDED.certifications,
                   experience       = EXCLUDED.experience,
                   education        = EXCLUDED.education,
                   experience_years = EXCLUDED.experience_years,
                   embedding        = EXCLUDED.embedding,
                   updated_at       = EXCLUDED.updated_at
            "#,
        )
        .bind(&profile.account_id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.summary)
        .bind(Json(&profile.skills))
        .bind(Json(&profile.certifications))
        .bind(Json(&profile.experience))
        .bind(Json(&profile.education))
        .bind(profile.experience_years.map(|y| y.min(i32::MAX as u32) as i32))
        .bind(&profile.embedding)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, account_id: &str) -> Result<Option<Profile>, MatchError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM candidate_profiles WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Profile::from))
    }

    async fn get_many(&self, account_ids: &[String]) -> Result<HashMap<String, Profile>, MatchError> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM candidate_profiles WHERE account_id = ANY($1)"
        ))
        .bind(account_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.account_id.clone(), Profile::from(r)))
            .collect())
    }

    async fn delete(&self, account_id: &str) -> Result<(), MatchError> {
        sqlx::query("DELETE FROM candidate_profiles WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, MatchError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM candidate_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as usize)
    }

    async fn skill_frequencies(&self) -> Result<SkillFrequencies, MatchError> {
        let (profiles,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM candidate_profiles WHERE jsonb_array_length(skills) > 0",
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT MIN(skill->>'name') AS name, COUNT(DISTINCT account_id) AS profiles
              FROM candidate_profiles, jsonb_array_elements(skills) AS skill
             GROUP BY LOWER(skill->>'name')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(SkillFrequencies {
            profiles: profiles.max(0) as usize,
            counts: rows
                .into_iter()
                .map(|(name, n)| (name, n.max(0) as usize))
                .collect(),
        })
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

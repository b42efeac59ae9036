//! Initial data for a fresh database: the default factor row, a set of panchayats and
//! two starter accounts.

use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::carbon::EmissionFactors;
use crate::db::{
    DbError, EmissionFactorsRow, FactorRepository, NewPanchayat, NewUser, PanchayatRepository,
    Role, UserRepository,
};
use crate::services::auth_service::hash_password;
use crate::services::AuthError;

/// Panchayats are only seeded while the table holds fewer than this many rows.
pub const MIN_PANCHAYATS: i64 = 5;
pub const DEFAULT_STATE: &str = "Kerala";
pub const DEFAULT_POPULATION: i32 = 25_000;
const NAME_PREFIX: &str = "Gram Panchayat ";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// One entry of a panchayat seed file: `[{"id"?, "name", "district", "state"?}]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanchayatSeed {
    pub id: Option<Uuid>,
    pub name: String,
    pub district: String,
    pub state: Option<String>,
}

impl PanchayatSeed {
    pub fn to_new_panchayat(&self) -> NewPanchayat {
        NewPanchayat {
            name: format!("{NAME_PREFIX}{}", self.name.trim()),
            district: self.district.clone(),
            state: self
                .state
                .clone()
                .unwrap_or_else(|| DEFAULT_STATE.to_string()),
            total_population: DEFAULT_POPULATION,
        }
    }
}

pub fn parse_panchayat_seeds(json: &str) -> Result<Vec<PanchayatSeed>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a seed file; a missing file yields `None` so callers can fall back.
pub fn load_panchayat_file(path: &Path) -> Result<Option<Vec<PanchayatSeed>>, SeedError> {
    match std::fs::read_to_string(path) {
        Ok(json) => parse_panchayat_seeds(&json).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, using fallback samples", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn fallback_panchayats() -> Vec<NewPanchayat> {
    [
        ("Chandpur", "Varanasi", "Uttar Pradesh", 4500),
        ("Ramgarh", "Lucknow", "Uttar Pradesh", 3200),
        ("Sundarpur", "Patna", "Bihar", 5100),
    ]
    .into_iter()
    .map(|(name, district, state, population)| NewPanchayat {
        name: format!("{NAME_PREFIX}{name}"),
        district: district.to_string(),
        state: state.to_string(),
        total_population: population,
    })
    .collect()
}

#[derive(Clone)]
pub struct Seeder {
    factor_repo: FactorRepository,
    panchayat_repo: PanchayatRepository,
    user_repo: UserRepository,
}

impl Seeder {
    pub fn new(pool: PgPool) -> Self {
        Self {
            factor_repo: FactorRepository::new(pool.clone()),
            panchayat_repo: PanchayatRepository::new(pool.clone()),
            user_repo: UserRepository::new(pool),
        }
    }

    pub async fn seed_factors(&self) -> Result<EmissionFactorsRow, SeedError> {
        Ok(self
            .factor_repo
            .ensure_active(&EmissionFactors::default())
            .await?)
    }

    /// Seeds panchayats when the table is (nearly) empty. Entries with an id that
    /// already exists are skipped. `on_progress` is called once per entry processed.
    #[instrument(skip(self, seeds, on_progress))]
    pub async fn seed_panchayats<F>(
        &self,
        seeds: Option<Vec<PanchayatSeed>>,
        mut on_progress: F,
    ) -> Result<usize, SeedError>
    where
        F: FnMut(),
    {
        let existing = self.panchayat_repo.count().await?;
        if existing >= MIN_PANCHAYATS {
            info!("{} panchayats present, skipping", existing);
            return Ok(0);
        }

        let mut created = 0;
        match seeds {
            Some(seeds) => {
                info!("Seeding {} panchayats from file", seeds.len());
                for seed in &seeds {
                    let panchayat = seed.to_new_panchayat();
                    let inserted = match seed.id {
                        Some(id) => self
                            .panchayat_repo
                            .insert_if_absent(id, &panchayat)
                            .await?
                            .is_some(),
                        None => {
                            self.panchayat_repo.insert(&panchayat).await?;
                            true
                        }
                    };
                    if inserted {
                        created += 1;
                    }
                    on_progress();
                }
            }
            None => {
                for panchayat in fallback_panchayats() {
                    self.panchayat_repo.insert(&panchayat).await?;
                    created += 1;
                    on_progress();
                }
            }
        }

        info!("Seeded {} panchayats", created);
        Ok(created)
    }

    /// Creates `admin` and `chandpur_user` when there are no users at all.
    #[instrument(skip(self))]
    pub async fn seed_users(&self) -> Result<usize, SeedError> {
        if self.user_repo.count().await? > 0 {
            info!("Users present, skipping");
            return Ok(0);
        }

        let chandpur = self.panchayat_repo.find_by_name_containing("Chandpur").await?;
        if chandpur.is_none() {
            warn!("No Chandpur panchayat found; chandpur_user will have no panchayat");
        }

        let users = [
            NewUser {
                username: "admin".to_string(),
                email: Some("admin@ecotrackhub.com".to_string()),
                hashed_password: hash_password("admin123".to_string()).await?,
                role: Role::Admin,
                panchayat_id: None,
            },
            NewUser {
                username: "chandpur_user".to_string(),
                email: Some("chandpur@example.com".to_string()),
                hashed_password: hash_password("password123".to_string()).await?,
                role: Role::User,
                panchayat_id: chandpur.map(|p| p.id),
            },
        ];

        for user in &users {
            self.user_repo.insert(user).await?;
        }
        info!("Created {} starter accounts", users.len());
        Ok(users.len())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::carbon::{EmissionFactors, Month, MonthlyUsage, UsageAmounts, UsageAmountsPatch};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sqlx(rename = "admin")]
    Admin,
    #[sqlx(rename = "user")]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

// Database entity models
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub role: Role,
    pub panchayat_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Panchayat {
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub state: String,
    pub total_population: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct MonthlyUsageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub panchayat_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub month: Month,
    pub year: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub usage: UsageAmounts,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyUsage for MonthlyUsageRecord {
    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> Month {
        self.month
    }

    fn usage(&self) -> &UsageAmounts {
        &self.usage
    }
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct EmissionFactorsRow {
    pub id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub factors: EmissionFactors,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Write models and API DTOs (kept here so services and api share them)

/// User as exposed over the API (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub panchayat_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            panchayat_id: user.panchayat_id,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub role: Role,
    pub panchayat_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub panchayat_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPanchayat {
    pub name: String,
    pub district: String,
    pub state: String,
    #[serde(default)]
    pub total_population: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUsageRecord {
    pub user_id: Uuid,
    pub panchayat_id: Option<Uuid>,
    pub month: Month,
    pub year: i32,
    #[serde(flatten)]
    pub usage: UsageAmounts,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UsageRecordUpdate {
    pub month: Option<Month>,
    pub year: Option<i32>,
    #[serde(flatten)]
    pub usage: UsageAmountsPatch,
}

/// Optional filters on usage records, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageFilter {
    pub user_id: Option<Uuid>,
    pub panchayat_id: Option<Uuid>,
    pub month: Option<Month>,
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_usage_record_flattened_quantities() {
        let body = r#"{
            "user_id": "00000000-0000-0000-0000-000000000001",
            "month": "march",
            "year": 2024,
            "electricity_kwh": 120.5,
            "trees_planted": 3
        }"#;
        let record: NewUsageRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.month, Month::Mar);
        assert_eq!(record.panchayat_id, None);
        assert_eq!(record.usage.electricity_kwh, 120.5);
        assert_eq!(record.usage.diesel_liters, 0.0);
        assert_eq!(record.usage.trees_planted, 3);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}

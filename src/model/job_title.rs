use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct JobTitle {
    pub id: u64,
    pub title: String,
    pub grade: Option<String>,
}

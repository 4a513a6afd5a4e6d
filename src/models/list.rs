use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Shopping list row; every list belongs to exactly one user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/rename request for a shopping list
#[derive(Debug, Deserialize, Validate)]
pub struct NewListRequest {
    #[validate(
        length(min = 1, max = 64, message = "Enter a title for your shopping list"),
        custom(function = "crate::validators::non_blank")
    )]
    pub name: String,
}

/// One page of search results over a user's lists
#[derive(Debug, Serialize)]
pub struct ListPage {
    pub lists: Vec<ShoppingList>,
    pub total_pages: i64,
}

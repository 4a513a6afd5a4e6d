use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Item row; quantity is always a positive integer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub list_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Add-item request; quantity defaults to 1 when omitted
#[derive(Debug, Deserialize, Validate)]
pub struct NewItemRequest {
    #[validate(
        length(min = 1, max = 32, message = "Enter a name for this item"),
        custom(function = "crate::validators::non_blank")
    )]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: Option<i32>,
}

/// Partial item update; only supplied fields change
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(
        length(min = 1, max = 32, message = "Enter a name for this item"),
        custom(function = "crate::validators::non_blank")
    )]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: Option<i32>,
}

/// One page of search results over a list's items
#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total_pages: i64,
}

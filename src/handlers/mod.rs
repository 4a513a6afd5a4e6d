/// HTTP request handlers
pub mod auth;
pub mod items;
pub mod lists;

pub use auth::{forgot_password, login, logout, register, reset_password};
pub use items::{add_item, delete_item, update_item, view_list};
pub use lists::{create_list, delete_list, list_lists, update_list};

use serde::Deserialize;

const MAX_PER_PAGE: i64 = 100;

/// Search/pagination query parameters (`?q=`, `?page=`, `?per_page=`)
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SearchParams {
    /// 1-indexed page, clamped to at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, defaulting from configuration and capped
    pub fn per_page(&self, default: i64) -> i64 {
        self.per_page.unwrap_or(default).clamp(1, MAX_PER_PAGE)
    }

    /// Search query, None when absent or blank
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

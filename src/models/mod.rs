/// Data models: persistent rows and request payloads
mod item;
mod list;
mod user;

pub use item::{Item, ItemPage, NewItemRequest, UpdateItemRequest};
pub use list::{ListPage, NewListRequest, ShoppingList};
pub use user::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, User,
};

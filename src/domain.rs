pub mod contact;
pub mod listing;
pub mod manager;
pub mod search;

use crate::errors::AppError;

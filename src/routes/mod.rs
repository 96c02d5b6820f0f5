mod auth;
mod health_check;
mod users;

pub use auth::{login, logout, protected, refresh, register};
pub use health_check::health_check;
pub use users::{delete_user, update_role};

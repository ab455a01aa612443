pub mod create_category;
pub mod create_customer;
pub mod create_order;
pub mod create_product;
pub mod db;
pub mod error;
mod fixture;
pub mod get_category;
pub mod get_customer;
pub mod get_order;
pub mod get_product;
pub mod handler;
pub mod models;
pub mod notify;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod update_order_status;

use deadpool_postgres::Pool;
use std::error::Error as StdError;

pub use create_category::CreateCategoryReq;
pub use create_customer::CreateCustomerReq;
pub use create_order::{CreateOrderReq, OrderLineReq};
pub use create_product::CreateProductReq;
pub use db::{DBClient, PostgresDBClient};
pub use error::Error;
pub use handler::Handler;
pub use models::{Category, CategoryPrice, Customer, Order, OrderItem, OrderStatus, Product};
pub use notify::{
    LogNotifier, Notification, NotificationDispatcher, NotificationWorker, Notifier, NotifyConfig,
};

/// Applies the shop schema migrations.
///
/// # Errors
/// - no database connection available
/// - a migration fails to apply
pub async fn run_migrations(pool: &Pool) -> Result<(), Box<dyn StdError>> {
    database::run_db_migrations!(pool, "migrations");
    Ok(())
}

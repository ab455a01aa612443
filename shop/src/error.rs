use database::DBError;
use http::StatusCode;
use setup::ErrorStatus;
use thiserror::Error;
use uuid::Uuid;

/// Error for the catalogue, customer and order operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("name is required")]
    MissingName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("phone number must be exactly 10 digits")]
    InvalidPhone,

    #[error("price must not be negative")]
    InvalidPrice,

    #[error("stock must not be negative")]
    InvalidStock,

    #[error("quantity must be positive for product: {0}")]
    InvalidQuantity(Uuid),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("Customer not found")]
    CustomerNotFound(Uuid),

    #[error("customer with this email already exists")]
    CustomerExists,

    #[error("Category not found")]
    CategoryNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Order not found")]
    OrderNotFound(Uuid),

    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),

    #[error("database error: {0}")]
    Database(#[from] DBError),
}

impl ErrorStatus for Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingName
            | Self::InvalidEmail(_)
            | Self::InvalidPhone
            | Self::InvalidPrice
            | Self::InvalidStock
            | Self::InvalidQuantity(_)
            | Self::InvalidStatus(_)
            | Self::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            Self::CustomerNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::ProductNotFound(_)
            | Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::CustomerExists => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps [`DBError::NotFound`] onto a domain error and keeps everything else
/// as a database error.
pub(crate) fn not_found(not_found: Error) -> impl FnOnce(DBError) -> Error {
    move |err| match err {
        DBError::NotFound => not_found,
        err => Error::Database(err),
    }
}

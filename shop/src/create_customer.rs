use std::sync::LazyLock;

use common::{Now, UuidGenerator};
use database::DBError;
use regex::Regex;
use serde::Deserialize;
use tracing::instrument;

use crate::{db::DBClient, error::Error, handler::Handler, models::Customer};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerReq {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Registers a new customer.
    ///
    /// # Errors
    /// - name is empty, email is malformed or phone is not 10 digits
    /// - a customer with the same email exists
    /// - database error
    #[instrument(skip_all, fields(customer_id), err)]
    pub async fn create_customer(&self, req: CreateCustomerReq) -> Result<Customer, Error> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::MissingName);
        }

        let email = req.email.trim();
        if !EMAIL_REGEX.is_match(email) {
            return Err(Error::InvalidEmail(email.to_string()));
        }

        let phone = req.phone.trim();
        if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPhone);
        }

        let id = self.uuid.generate();
        tracing::Span::current().record("customer_id", id.to_string());

        let now = N::now();
        let customer = Customer {
            id,
            email: email.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.db
            .insert_customer(&customer)
            .await
            .map_err(|err| match err {
                DBError::AlreadyExists => Error::CustomerExists,
                err => Error::Database(err),
            })?;

        Ok(customer)
    }
}

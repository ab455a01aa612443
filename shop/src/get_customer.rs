use common::{Now, UuidGenerator};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::Customer,
};

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Gets a customer by identifier.
    ///
    /// # Errors
    /// - customer not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn get_customer(&self, id: Uuid) -> Result<Customer, Error> {
        self.db
            .get_customer(id)
            .await
            .map_err(not_found(Error::CustomerNotFound(id)))
    }
}

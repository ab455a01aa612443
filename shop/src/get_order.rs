use common::{Now, UuidGenerator};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::Order,
};

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Gets an order with its customer and items.
    ///
    /// # Errors
    /// - order not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn get_order(&self, id: Uuid) -> Result<Order, Error> {
        self.db
            .get_order(id)
            .await
            .map_err(not_found(Error::OrderNotFound(id)))
    }

    /// Lists a customer's orders, newest first.
    ///
    /// # Errors
    /// - customer not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn list_customer_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, Error> {
        self.get_customer(customer_id).await?;
        Ok(self.db.list_orders_by_customer(customer_id).await?)
    }
}

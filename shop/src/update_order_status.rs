use common::{Now, UuidGenerator};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::{Order, OrderStatus},
};

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Moves an order to `status` and returns the updated order.
    ///
    /// Any status may follow any other.
    ///
    /// # Errors
    /// - status is not one of the known order states
    /// - order not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn update_order_status(&self, id: Uuid, status: &str) -> Result<Order, Error> {
        let status: OrderStatus = status
            .parse()
            .map_err(|_| Error::InvalidStatus(status.to_string()))?;

        self.db
            .update_order_status(id, status, N::now())
            .await
            .map_err(not_found(Error::OrderNotFound(id)))?;

        self.get_order(id).await
    }
}

use common::{Now, UuidGenerator};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::{CategoryPrice, Product, round_cents},
};

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// # Errors
    /// - product not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn get_product(&self, id: Uuid) -> Result<Product, Error> {
        self.db
            .get_product(id)
            .await
            .map_err(not_found(Error::ProductNotFound(id)))
    }

    /// # Errors
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn list_products(&self) -> Result<Vec<Product>, Error> {
        Ok(self.db.list_products().await?)
    }

    /// Lists the products directly in a category.
    ///
    /// # Errors
    /// - category not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn list_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, Error> {
        self.get_category(category_id).await?;
        Ok(self.db.list_products_by_category(category_id).await?)
    }

    /// Average product price of a category, zero for an empty category.
    ///
    /// # Errors
    /// - category not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn average_price_by_category(&self, category_id: Uuid) -> Result<CategoryPrice, Error> {
        let mut price = self
            .db
            .average_price_by_category(category_id)
            .await
            .map_err(not_found(Error::CategoryNotFound(category_id)))?;
        price.average_price = round_cents(price.average_price);
        Ok(price)
    }
}

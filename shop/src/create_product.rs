use common::{Now, UuidGenerator};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::{Product, round_cents},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductReq {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: String,
}

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Adds a product to an existing category. The price is rounded to cents.
    ///
    /// # Errors
    /// - name is empty, price or stock is negative
    /// - category not found
    /// - database error
    #[instrument(skip_all, fields(product_id), err)]
    pub async fn create_product(&self, req: CreateProductReq) -> Result<Product, Error> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        if !req.price.is_finite() || req.price < 0.0 {
            return Err(Error::InvalidPrice);
        }
        if req.stock < 0 {
            return Err(Error::InvalidStock);
        }

        let category = self
            .db
            .get_category(req.category_id)
            .await
            .map_err(not_found(Error::CategoryNotFound(req.category_id)))?;

        let id = self.uuid.generate();
        tracing::Span::current().record("product_id", id.to_string());

        let now = N::now();
        let product = Product {
            id,
            name: name.to_string(),
            description: req.description,
            price: round_cents(req.price),
            category_id: category.id,
            stock: req.stock,
            image_url: req.image_url,
            created_at: now,
            updated_at: now,
            category,
        };

        self.db.insert_product(&product).await?;

        Ok(product)
    }
}

use std::collections::HashMap;

use common::{Now, UuidGenerator};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::{Order, OrderItem, OrderStatus, Product},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderReq {
    pub customer_id: Uuid,
    pub items: Vec<OrderLineReq>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineReq {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Places an order.
    ///
    /// Every line is validated before any stock is touched. Stock is then
    /// decremented per product and the order is stored with its items in a
    /// single transaction. Prices are taken from the product at this moment.
    /// Customer and admin notifications are queued afterwards.
    ///
    /// The stock decrements are separate statements outside the order
    /// transaction, so concurrent orders for the same product can oversell.
    ///
    /// # Errors
    /// - customer not found
    /// - quantity is not positive
    /// - product not found or without enough stock
    /// - database error
    #[instrument(skip_all, fields(customer_id = %req.customer_id, order_id), err)]
    pub async fn create_order(&self, req: CreateOrderReq) -> Result<Order, Error> {
        let customer = self
            .db
            .get_customer(req.customer_id)
            .await
            .map_err(not_found(Error::CustomerNotFound(req.customer_id)))?;

        let mut lines: Vec<(Product, i32)> = Vec::with_capacity(req.items.len());
        let mut remaining: HashMap<Uuid, i32> = HashMap::new();
        for line in &req.items {
            if line.quantity <= 0 {
                return Err(Error::InvalidQuantity(line.product_id));
            }

            let product = self
                .db
                .get_product(line.product_id)
                .await
                .map_err(not_found(Error::ProductNotFound(line.product_id)))?;

            let stock = remaining.entry(product.id).or_insert(product.stock);
            if *stock < line.quantity {
                return Err(Error::InsufficientStock(product.name));
            }
            *stock -= line.quantity;

            lines.push((product, line.quantity));
        }

        for (product_id, stock) in &remaining {
            self.db.update_stock(*product_id, *stock).await?;
        }

        let id = self.uuid.generate();
        tracing::Span::current().record("order_id", id.to_string());

        let items: Vec<OrderItem> = lines
            .into_iter()
            .map(|(product, quantity)| OrderItem {
                id: self.uuid.generate(),
                order_id: id,
                product_id: product.id,
                quantity,
                price: product.price,
                product,
            })
            .collect();
        let total: f64 = items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();

        let now = N::now();
        let order = Order {
            id,
            customer_id: customer.id,
            status: OrderStatus::Pending,
            total,
            created_at: now,
            updated_at: now,
            customer,
            items,
        };

        self.db.insert_order(&order).await?;

        self.notifications.order_placed(&order);

        Ok(order)
    }
}

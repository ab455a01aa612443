use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::DBError;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::models::{Category, CategoryPrice, Customer, Order, OrderItem, OrderStatus, Product};

#[async_trait]
pub trait DBClient: Send + Sync + 'static {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), DBError>;

    async fn get_customer(&self, id: Uuid) -> Result<Customer, DBError>;

    async fn insert_category(&self, category: &Category) -> Result<(), DBError>;

    async fn get_category(&self, id: Uuid) -> Result<Category, DBError>;

    async fn list_categories(&self) -> Result<Vec<Category>, DBError>;

    async fn list_child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DBError>;

    async fn insert_product(&self, product: &Product) -> Result<(), DBError>;

    async fn get_product(&self, id: Uuid) -> Result<Product, DBError>;

    async fn list_products(&self) -> Result<Vec<Product>, DBError>;

    async fn list_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DBError>;

    async fn average_price_by_category(&self, category_id: Uuid) -> Result<CategoryPrice, DBError>;

    async fn update_stock(&self, product_id: Uuid, stock: i32) -> Result<(), DBError>;

    /// Inserts the order header and all of its items in one transaction.
    async fn insert_order(&self, order: &Order) -> Result<(), DBError>;

    async fn get_order(&self, id: Uuid) -> Result<Order, DBError>;

    async fn list_orders_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DBError>;

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DBError>;
}

#[derive(Clone, Debug)]
pub struct PostgresDBClient {
    pub pool: Pool,
}

impl PostgresDBClient {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

const SELECT_CATEGORY: &str = "SELECT id, name, description, parent_id, level, path, created_at, updated_at FROM categories";

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.description, p.price::FLOAT8 AS price, \
     p.category_id, p.stock, p.image_url, p.created_at, p.updated_at, \
     c.id AS c_id, c.name AS c_name, c.description AS c_description, c.parent_id AS c_parent_id, \
     c.level AS c_level, c.path AS c_path, c.created_at AS c_created_at, c.updated_at AS c_updated_at \
     FROM products p JOIN categories c ON c.id = p.category_id";

const SELECT_ORDER: &str = "SELECT o.id, o.customer_id, o.status, o.total::FLOAT8 AS total, \
     o.created_at, o.updated_at, \
     cu.id AS cu_id, cu.email AS cu_email, cu.name AS cu_name, cu.phone AS cu_phone, \
     cu.created_at AS cu_created_at, cu.updated_at AS cu_updated_at \
     FROM orders o JOIN customers cu ON cu.id = o.customer_id";

const SELECT_ORDER_ITEMS: &str = "SELECT i.id AS i_id, i.order_id AS i_order_id, \
     i.product_id AS i_product_id, i.quantity AS i_quantity, i.price::FLOAT8 AS i_price, \
     p.id, p.name, p.description, p.price::FLOAT8 AS price, \
     p.category_id, p.stock, p.image_url, p.created_at, p.updated_at, \
     c.id AS c_id, c.name AS c_name, c.description AS c_description, c.parent_id AS c_parent_id, \
     c.level AS c_level, c.path AS c_path, c.created_at AS c_created_at, c.updated_at AS c_updated_at \
     FROM order_items i \
     JOIN products p ON p.id = i.product_id \
     JOIN categories c ON c.id = p.category_id";

#[async_trait]
impl DBClient for PostgresDBClient {
    /// # Errors
    /// - if the database connection cannot be established
    /// - if the email is already taken
    async fn insert_customer(&self, customer: &Customer) -> Result<(), DBError> {
        let client = self.pool.get().await?;

        client
            .execute(
                "INSERT INTO customers (id, email, name, phone, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &customer.id,
                    &customer.email,
                    &customer.name,
                    &customer.phone,
                    &customer.created_at,
                    &customer.updated_at,
                ],
            )
            .await?;

        Ok(())
    }

    /// # Errors
    /// - if the database query fails
    /// - if the customer is not found
    async fn get_customer(&self, id: Uuid) -> Result<Customer, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(
                "SELECT id, email, name, phone, created_at, updated_at FROM customers WHERE id = $1",
            )
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let Some(row) = row else {
            return Err(DBError::NotFound);
        };

        customer_from_row(&row, "")
    }

    async fn insert_category(&self, category: &Category) -> Result<(), DBError> {
        let client = self.pool.get().await?;

        client
            .execute(
                "INSERT INTO categories \
                 (id, name, description, parent_id, level, path, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &category.id,
                    &category.name,
                    &category.description,
                    &category.parent_id,
                    &category.level,
                    &category.path,
                    &category.created_at,
                    &category.updated_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> Result<Category, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_CATEGORY} WHERE id = $1"))
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let Some(row) = row else {
            return Err(DBError::NotFound);
        };

        category_from_row(&row, "")
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_CATEGORY} ORDER BY path"))
            .await?;
        let rows = client.query(&stmt, &[]).await?;

        rows.iter().map(|row| category_from_row(row, "")).collect()
    }

    async fn list_child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_CATEGORY} WHERE parent_id = $1 ORDER BY name"))
            .await?;
        let rows = client.query(&stmt, &[&parent_id]).await?;

        rows.iter().map(|row| category_from_row(row, "")).collect()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), DBError> {
        let client = self.pool.get().await?;

        client
            .execute(
                "INSERT INTO products \
                 (id, name, description, price, category_id, stock, image_url, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4::FLOAT8, $5, $6, $7, $8, $9)",
                &[
                    &product.id,
                    &product.name,
                    &product.description,
                    &product.price,
                    &product.category_id,
                    &product.stock,
                    &product.image_url,
                    &product.created_at,
                    &product.updated_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_PRODUCT} WHERE p.id = $1"))
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let Some(row) = row else {
            return Err(DBError::NotFound);
        };

        product_from_row(&row)
    }

    async fn list_products(&self) -> Result<Vec<Product>, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_PRODUCT} ORDER BY p.name"))
            .await?;
        let rows = client.query(&stmt, &[]).await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn list_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_PRODUCT} WHERE p.category_id = $1 ORDER BY p.name"))
            .await?;
        let rows = client.query(&stmt, &[&category_id]).await?;

        rows.iter().map(product_from_row).collect()
    }

    /// # Errors
    /// - if the category is not found
    async fn average_price_by_category(&self, category_id: Uuid) -> Result<CategoryPrice, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(
                "SELECT c.id, c.name, COALESCE(AVG(p.price), 0)::FLOAT8 AS average_price, \
                 COUNT(p.id) AS product_count \
                 FROM categories c LEFT JOIN products p ON p.category_id = c.id \
                 WHERE c.id = $1 GROUP BY c.id, c.name",
            )
            .await?;
        let row = client.query_opt(&stmt, &[&category_id]).await?;
        let Some(row) = row else {
            return Err(DBError::NotFound);
        };

        Ok(CategoryPrice {
            category_id: row.try_get("id")?,
            category_name: row.try_get("name")?,
            average_price: row.try_get("average_price")?,
            product_count: row.try_get("product_count")?,
        })
    }

    /// # Errors
    /// - if the product is not found
    async fn update_stock(&self, product_id: Uuid, stock: i32) -> Result<(), DBError> {
        let client = self.pool.get().await?;

        let updated = client
            .execute(
                "UPDATE products SET stock = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
                &[&product_id, &stock],
            )
            .await?;
        if updated == 0 {
            return Err(DBError::NotFound);
        }

        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), DBError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(
            "INSERT INTO orders (id, customer_id, status, total, created_at, updated_at) \
             VALUES ($1, $2, $3, $4::FLOAT8, $5, $6)",
            &[
                &order.id,
                &order.customer_id,
                &order.status.as_str(),
                &order.total,
                &order.created_at,
                &order.updated_at,
            ],
        )
        .await?;

        let stmt = tx
            .prepare(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price, created_at) \
                 VALUES ($1, $2, $3, $4, $5::FLOAT8, $6)",
            )
            .await?;
        for item in &order.items {
            tx.execute(
                &stmt,
                &[
                    &item.id,
                    &item.order_id,
                    &item.product_id,
                    &item.quantity,
                    &item.price,
                    &order.created_at,
                ],
            )
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// # Errors
    /// - if the order is not found
    async fn get_order(&self, id: Uuid) -> Result<Order, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!("{SELECT_ORDER} WHERE o.id = $1"))
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let Some(row) = row else {
            return Err(DBError::NotFound);
        };
        let mut order = order_from_row(&row)?;

        let stmt = client
            .prepare(&format!("{SELECT_ORDER_ITEMS} WHERE i.order_id = $1 ORDER BY p.name"))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;
        order.items = rows.iter().map(order_item_from_row).collect::<Result<_, _>>()?;

        Ok(order)
    }

    async fn list_orders_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DBError> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(&format!(
                "{SELECT_ORDER} WHERE o.customer_id = $1 ORDER BY o.created_at DESC"
            ))
            .await?;
        let rows = client.query(&stmt, &[&customer_id]).await?;
        let mut orders = rows.iter().map(order_from_row).collect::<Result<Vec<_>, _>>()?;

        let stmt = client
            .prepare(&format!(
                "{SELECT_ORDER_ITEMS} JOIN orders o ON o.id = i.order_id \
                 WHERE o.customer_id = $1 ORDER BY p.name"
            ))
            .await?;
        let rows = client.query(&stmt, &[&customer_id]).await?;
        for row in &rows {
            let item = order_item_from_row(row)?;
            if let Some(order) = orders.iter_mut().find(|o| o.id == item.order_id) {
                order.items.push(item);
            }
        }

        Ok(orders)
    }

    /// # Errors
    /// - if the order is not found
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DBError> {
        let client = self.pool.get().await?;

        let updated = client
            .execute(
                "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1",
                &[&id, &status.as_str(), &updated_at],
            )
            .await?;
        if updated == 0 {
            return Err(DBError::NotFound);
        }

        Ok(())
    }
}

/// Reads a customer from columns named `{prefix}id`, `{prefix}email`, ...
fn customer_from_row(row: &Row, prefix: &str) -> Result<Customer, DBError> {
    let col = |name: &str| format!("{prefix}{name}");
    Ok(Customer {
        id: row.try_get(col("id").as_str())?,
        email: row.try_get(col("email").as_str())?,
        name: row.try_get(col("name").as_str())?,
        phone: row.try_get(col("phone").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

fn category_from_row(row: &Row, prefix: &str) -> Result<Category, DBError> {
    let col = |name: &str| format!("{prefix}{name}");
    Ok(Category {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        description: row.try_get(col("description").as_str())?,
        parent_id: row.try_get(col("parent_id").as_str())?,
        level: row.try_get(col("level").as_str())?,
        path: row.try_get(col("path").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

fn product_from_row(row: &Row) -> Result<Product, DBError> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        category_id: row.try_get("category_id")?,
        stock: row.try_get("stock")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        category: category_from_row(row, "c_")?,
    })
}

fn order_from_row(row: &Row) -> Result<Order, DBError> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        status: status.parse().map_err(|_| DBError::Unknown)?,
        total: row.try_get("total")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        customer: customer_from_row(row, "cu_")?,
        items: Vec::new(),
    })
}

fn order_item_from_row(row: &Row) -> Result<OrderItem, DBError> {
    Ok(OrderItem {
        id: row.try_get("i_id")?,
        order_id: row.try_get("i_order_id")?,
        product_id: row.try_get("i_product_id")?,
        quantity: row.try_get("i_quantity")?,
        price: row.try_get("i_price")?,
        product: product_from_row(row)?,
    })
}

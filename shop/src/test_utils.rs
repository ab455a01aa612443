//! In-memory test doubles for the shop crate and its dependents.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::DBError;
use uuid::Uuid;

use crate::db::DBClient;
use crate::models::{Category, CategoryPrice, Customer, Order, OrderStatus, Product};
use crate::notify::{Notification, Notifier, NotifyError};

#[derive(Debug, Default)]
struct Store {
    customers: HashMap<Uuid, Customer>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    fail_next: Option<DBError>,
}

/// A [`DBClient`] backed by hash maps. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDBClient {
    store: Arc<Mutex<Store>>,
}

impl InMemoryDBClient {
    /// Makes the next database call fail with `err`.
    pub fn fail_next(&self, err: DBError) {
        self.lock().fail_next = Some(err);
    }

    pub fn with_customer(self, customer: Customer) -> Self {
        self.lock().customers.insert(customer.id, customer);
        self
    }

    pub fn with_category(self, category: Category) -> Self {
        self.lock().categories.insert(category.id, category);
        self
    }

    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.insert(product.id, product);
        self
    }

    pub fn with_order(self, order: Order) -> Self {
        self.lock().orders.insert(order.id, order);
        self
    }

    /// Current stock of a product, if it exists.
    pub fn stock(&self, product_id: Uuid) -> Option<i32> {
        self.lock().products.get(&product_id).map(|p| p.stock)
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Locks the store, or returns the injected failure.
    fn begin(&self) -> Result<MutexGuard<'_, Store>, DBError> {
        let mut store = self.lock();
        match store.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(store),
        }
    }
}

impl Store {
    fn product(&self, id: Uuid) -> Result<Product, DBError> {
        let mut product = self.products.get(&id).cloned().ok_or(DBError::NotFound)?;
        if let Some(category) = self.categories.get(&product.category_id) {
            product.category = category.clone();
        }
        Ok(product)
    }

    fn order(&self, id: Uuid) -> Result<Order, DBError> {
        let mut order = self.orders.get(&id).cloned().ok_or(DBError::NotFound)?;
        if let Some(customer) = self.customers.get(&order.customer_id) {
            order.customer = customer.clone();
        }
        for item in &mut order.items {
            if let Ok(product) = self.product(item.product_id) {
                item.product = product;
            }
        }
        Ok(order)
    }
}

#[async_trait]
impl DBClient for InMemoryDBClient {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), DBError> {
        let mut store = self.begin()?;
        if store.customers.values().any(|c| c.email == customer.email) {
            return Err(DBError::AlreadyExists);
        }
        store.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn get_customer(&self, id: Uuid) -> Result<Customer, DBError> {
        let store = self.begin()?;
        store.customers.get(&id).cloned().ok_or(DBError::NotFound)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), DBError> {
        let mut store = self.begin()?;
        store.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> Result<Category, DBError> {
        let store = self.begin()?;
        store.categories.get(&id).cloned().ok_or(DBError::NotFound)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DBError> {
        let store = self.begin()?;
        let mut categories: Vec<_> = store.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(categories)
    }

    async fn list_child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DBError> {
        let store = self.begin()?;
        let mut categories: Vec<_> = store
            .categories
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), DBError> {
        let mut store = self.begin()?;
        store.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, DBError> {
        self.begin()?.product(id)
    }

    async fn list_products(&self) -> Result<Vec<Product>, DBError> {
        let store = self.begin()?;
        let mut products = store
            .products
            .keys()
            .map(|id| store.product(*id))
            .collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn list_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DBError> {
        let store = self.begin()?;
        let mut products = store
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .map(|p| store.product(p.id))
            .collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn average_price_by_category(&self, category_id: Uuid) -> Result<CategoryPrice, DBError> {
        let store = self.begin()?;
        let category = store.categories.get(&category_id).ok_or(DBError::NotFound)?;
        let prices: Vec<f64> = store
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .map(|p| p.price)
            .collect();
        let average_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };
        Ok(CategoryPrice {
            category_id,
            category_name: category.name.clone(),
            average_price,
            product_count: prices.len() as i64,
        })
    }

    async fn update_stock(&self, product_id: Uuid, stock: i32) -> Result<(), DBError> {
        let mut store = self.begin()?;
        let product = store.products.get_mut(&product_id).ok_or(DBError::NotFound)?;
        product.stock = stock;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), DBError> {
        let mut store = self.begin()?;
        store.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Order, DBError> {
        self.begin()?.order(id)
    }

    async fn list_orders_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DBError> {
        let store = self.begin()?;
        let mut orders = store
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .map(|o| store.order(o.id))
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DBError> {
        let mut store = self.begin()?;
        let order = store.orders.get_mut(&id).ok_or(DBError::NotFound)?;
        order.status = status;
        order.updated_at = updated_at;
        Ok(())
    }
}

/// A [`Notifier`] that remembers what it was asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl RecordingNotifier {
    /// A notifier whose first `n` deliveries fail.
    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: Arc::new(Mutex::new(n)),
            ..Default::default()
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        {
            let mut failures_left = self
                .failures_left
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err("delivery failed".into());
            }
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

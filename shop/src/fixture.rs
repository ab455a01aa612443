#![cfg(test)]

use std::time::Duration;

use common::{Now as _, mock::MockNow, mock::MockUuidGenerator};
use uuid::Uuid;

use crate::handler::Handler;
use crate::models::{Category, Customer, Order, OrderItem, OrderStatus, Product};
use crate::notify::{NotificationDispatcher, NotificationWorker, NotifyConfig};
use crate::test_utils::{InMemoryDBClient, RecordingNotifier};

pub(crate) type TestHandler = Handler<InMemoryDBClient, MockUuidGenerator, MockNow>;

pub(crate) fn customer_id() -> Uuid {
    Uuid::from_u128(0x11)
}

pub(crate) fn category_id() -> Uuid {
    Uuid::from_u128(0x21)
}

pub(crate) fn product_id() -> Uuid {
    Uuid::from_u128(0x22)
}

pub(crate) fn order_id() -> Uuid {
    Uuid::from_u128(0x31)
}

pub(crate) fn fixture_customer<F>(mut func: F) -> Customer
where
    F: FnMut(&mut Customer),
{
    let mut customer = Customer {
        id: customer_id(),
        email: "jane@example.com".to_string(),
        name: "Jane Doe".to_string(),
        phone: "0712345678".to_string(),
        created_at: MockNow::now(),
        updated_at: MockNow::now(),
    };
    func(&mut customer);
    customer
}

pub(crate) fn fixture_category<F>(mut func: F) -> Category
where
    F: FnMut(&mut Category),
{
    let mut category = Category {
        id: category_id(),
        name: "Electronics".to_string(),
        description: "Gadgets".to_string(),
        parent_id: None,
        level: 0,
        path: "/Electronics".to_string(),
        created_at: MockNow::now(),
        updated_at: MockNow::now(),
    };
    func(&mut category);
    category
}

pub(crate) fn fixture_product<F>(mut func: F) -> Product
where
    F: FnMut(&mut Product),
{
    let mut product = Product {
        id: product_id(),
        name: "Widget".to_string(),
        description: "A widget".to_string(),
        price: 10.5,
        category_id: category_id(),
        stock: 5,
        image_url: "https://cdn.test/widget.png".to_string(),
        created_at: MockNow::now(),
        updated_at: MockNow::now(),
        category: fixture_category(|_| {}),
    };
    func(&mut product);
    product
}

pub(crate) fn fixture_order<F>(mut func: F) -> Order
where
    F: FnMut(&mut Order),
{
    let mut order = Order {
        id: order_id(),
        customer_id: customer_id(),
        status: OrderStatus::Pending,
        total: 21.0,
        created_at: MockNow::now(),
        updated_at: MockNow::now(),
        customer: fixture_customer(|_| {}),
        items: vec![OrderItem {
            id: Uuid::from_u128(0x32),
            order_id: order_id(),
            product_id: product_id(),
            quantity: 2,
            price: 10.5,
            product: fixture_product(|_| {}),
        }],
    };
    func(&mut order);
    order
}

/// A database holding one customer, one category and one product.
pub(crate) fn fixture_db() -> InMemoryDBClient {
    InMemoryDBClient::default()
        .with_customer(fixture_customer(|_| {}))
        .with_category(fixture_category(|_| {}))
        .with_product(fixture_product(|_| {}))
}

pub(crate) struct TestShop {
    pub handler: TestHandler,
    pub db: InMemoryDBClient,
    pub notifier: RecordingNotifier,
    pub worker: NotificationWorker,
}

impl TestShop {
    /// Drops the handler and waits until queued notifications are delivered.
    pub async fn drain(self) -> RecordingNotifier {
        drop(self.handler);
        self.worker.drain(Duration::from_secs(1)).await;
        self.notifier
    }
}

pub(crate) fn fixture_shop(db: InMemoryDBClient) -> TestShop {
    let notifier = RecordingNotifier::default();
    let (dispatcher, worker) = NotificationDispatcher::spawn(
        notifier.clone(),
        NotifyConfig {
            admin_email: "admin@example.com".to_string(),
            queue_capacity: 8,
        },
    );
    TestShop {
        handler: Handler::new(db.clone(), MockUuidGenerator::default(), dispatcher),
        db,
        notifier,
        worker,
    }
}

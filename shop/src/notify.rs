//! Order notifications.
//!
//! Notifications are handed to a single background worker through a bounded
//! queue, so placing an order never waits for delivery. Delivery failures are
//! logged and dropped, nothing is retried.
use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use common::env::env_or;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::Order;

const DEFAULT_ADMIN_EMAIL: &str = "admin@ecommerce.com";
const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Recipient of the admin order summary.
    pub admin_email: String,
    pub queue_capacity: usize,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        let queue_capacity = env_or("NOTIFY_QUEUE_CAPACITY", "")
            .parse::<usize>()
            .ok()
            .filter(|capacity| *capacity > 0)
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);
        Self {
            admin_email: env_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            queue_capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Short text message to the customer's phone.
    Customer { phone: String, message: String },

    /// Order summary mail to the shop admin.
    Admin {
        to: String,
        subject: String,
        body: String,
    },
}

pub type NotifyError = Box<dyn StdError + Send + Sync>;

/// Delivers a single notification.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::Customer { phone, message } => {
                info!(to = %phone, %message, "customer notification");
            }
            Notification::Admin { to, subject, body } => {
                info!(%to, %subject, %body, "admin notification");
            }
        }
        Ok(())
    }
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<Notification>,
    admin_email: String,
}

/// The background task delivering queued notifications.
#[derive(Debug)]
pub struct NotificationWorker {
    handle: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Spawns the delivery worker on the current tokio runtime.
    pub fn spawn<T: Notifier>(notifier: T, config: NotifyConfig) -> (Self, NotificationWorker) {
        let (sender, mut receiver) = mpsc::channel::<Notification>(config.queue_capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(notification) = receiver.recv().await {
                if let Err(err) = notifier.send(&notification).await {
                    warn!(error = %err, ?notification, "failed to deliver notification");
                }
            }
        });

        let dispatcher = Self {
            sender,
            admin_email: config.admin_email,
        };
        (dispatcher, NotificationWorker { handle })
    }

    /// Queues the customer and admin notifications for a new order.
    pub fn order_placed(&self, order: &Order) {
        let short_id = short_order_id(&order.id.to_string());
        let customer = &order.customer;

        self.enqueue(Notification::Customer {
            phone: customer.phone.clone(),
            message: format!(
                "Your order {short_id} has been received. Total: Ksh{:.2}. Status: {}.",
                order.total, order.status
            ),
        });

        let items = order
            .items
            .iter()
            .map(|item| {
                format!(
                    "- {} x{} @ Ksh{:.2} = Ksh{:.2}",
                    item.product.name,
                    item.quantity,
                    item.price,
                    item.price * f64::from(item.quantity)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.enqueue(Notification::Admin {
            to: self.admin_email.clone(),
            subject: format!("New Order Received - {short_id}"),
            body: format!(
                "New order has been placed!\n\n\
                 Order Details:\n\
                 - Order ID: {short_id}\n\
                 - Customer Name: {}\n\
                 - Customer Email: {}\n\
                 - Customer Phone: {}\n\
                 - Total Amount: Ksh{:.2}\n\n\
                 Order Items:\n{items}",
                customer.name, customer.email, customer.phone, order.total
            ),
        });
    }

    /// Queues a notification without waiting. Drops it when the queue is full.
    pub fn enqueue(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(notification)) => {
                warn!(?notification, "notification queue full, dropping notification");
            }
            Err(TrySendError::Closed(notification)) => {
                warn!(?notification, "notification worker stopped, dropping notification");
            }
        }
    }
}

impl NotificationWorker {
    /// Waits for the worker to deliver what is still queued.
    ///
    /// The queue closes once every [`NotificationDispatcher`] is dropped, so
    /// drop them first. Gives up after `deadline`.
    pub async fn drain(self, deadline: Duration) {
        match tokio::time::timeout(deadline, self.handle).await {
            Ok(Ok(())) => info!("notification queue drained"),
            Ok(Err(err)) => warn!(error = %err, "notification worker failed"),
            Err(_) => warn!(?deadline, "notification queue not drained before deadline"),
        }
    }
}

/// First eight and last four characters of an order id.
pub(crate) fn short_order_id(id: &str) -> String {
    if id.len() <= 12 {
        return id.to_string();
    }
    format!("{}...{}", &id[..8], &id[id.len() - 4..])
}

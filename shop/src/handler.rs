use std::marker::PhantomData;

use common::{Now, UuidGenerator};

use crate::{db::DBClient, notify::NotificationDispatcher};

/// Entry point for the shop operations: customers, the category tree,
/// products and orders. Each operation lives in its own module.
pub struct Handler<D, U, N> {
    pub db: D,
    pub uuid: U,
    pub notifications: NotificationDispatcher,
    _now: PhantomData<N>,
}

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    pub fn new(db: D, uuid: U, notifications: NotificationDispatcher) -> Self {
        Self {
            db,
            uuid,
            notifications,
            _now: PhantomData,
        }
    }
}

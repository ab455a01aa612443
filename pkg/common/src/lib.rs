use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod env;

/// Trait for generating entity identifiers.
pub trait UuidGenerator: Send + Sync + 'static {
    /// Generates a new UUID.
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Random v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl UuidGenerator for UuidV4Generator {}

/// Source of the current UTC time.
pub trait Now: Send + Sync + 'static {
    fn now() -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNow;

impl Now for SystemNow {
    fn now() -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(feature = "mock")]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Hands out `00000000-0000-0000-0000-000000000001`, `...0002` and so on.
    ///
    /// Starts at one so that generated ids never collide with the nil fixture id.
    #[derive(Debug, Default)]
    pub struct MockUuidGenerator {
        counter: AtomicU64,
    }

    impl UuidGenerator for MockUuidGenerator {
        fn generate(&self) -> Uuid {
            let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Uuid::from_u128(u128::from(next))
        }
    }

    /// Frozen clock at 2020-01-01 00:00:00 UTC.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MockNow;

    impl Now for MockNow {
        fn now() -> DateTime<Utc> {
            DateTime::from_timestamp(1_577_836_800, 0).unwrap_or_default()
        }
    }
}

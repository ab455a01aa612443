use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, tokio_postgres};
use http::StatusCode;
use refinery::Runner;
use setup::ErrorStatus;
use std::error::Error;
use std::fmt::{Debug, Display};
use std::ops::DerefMut;
use std::path::Path;
use testcontainers::ContainerAsync;
use testcontainers::{
    GenericImage, ImageExt,
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
};
use tokio::sync::OnceCell;

const DB_NAME: &str = "ecommerce_test";

/// Represents a test database running in a container.
struct TestDb {
    /// The underlying PostgreSQL container.
    postgres: ContainerAsync<GenericImage>,
}

/// A global singleton holding the test database.
/// OnceCell ensures the DB is started only once across all tests.
static TEST_DB: OnceCell<TestDb> = OnceCell::const_new();

/// Returns a connection pool to the test database.
///
/// If the test database hasn't been started yet, it will start it and
/// apply the migrations found in `migrations` first.
pub async fn get_test_db(migrations: impl AsRef<Path>) -> Result<Pool, Box<dyn Error>> {
    let db = TEST_DB
        .get_or_init(|| async { start_test_db(migrations).await.unwrap() })
        .await;
    let pool = create_connection_pool(&db.postgres).await?;
    Ok(pool)
}

/// Shutdown postgres container when the process exits.
///
/// A static OnceCell is never dropped, so the container has to be removed
/// explicitly. See <https://github.com/testcontainers/testcontainers-rs/issues/707>.
#[dtor::dtor]
fn on_shutdown() {
    let Some(test_db) = TEST_DB.get() else {
        return;
    };
    let container_id = test_db.postgres.id();

    std::process::Command::new("docker")
        .args(["container", "rm", "-f", container_id])
        .output()
        .expect("failed to stop testcontainer");
}

async fn start_test_db(migrations: impl AsRef<Path>) -> Result<TestDb, Box<dyn Error>> {
    let pg_port = 5432;
    let postgres = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(ContainerPort::Tcp(pg_port))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("PGPORT", pg_port.to_string())
        .with_env_var("POSTGRES_USER", "postgres")
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", DB_NAME)
        .start()
        .await
        .expect("Failed to start postgres");

    let pool = create_connection_pool(&postgres).await?;

    let mut connection = pool.get().await?;
    let migrations = refinery::load_sql_migrations(migrations)?;
    let _ = Runner::new(&migrations)
        .run_async(connection.deref_mut().deref_mut())
        .await?;

    Ok(TestDb { postgres })
}

async fn create_connection_pool(
    postgres: &ContainerAsync<GenericImage>,
) -> Result<Pool, Box<dyn Error>> {
    let host = postgres.get_host().await?;
    let port = postgres.get_host_port_ipv4(5432).await?;

    let mut config = tokio_postgres::Config::new();
    config
        .dbname(DB_NAME)
        .user("postgres")
        .password("postgres")
        .host(host.to_string())
        .port(port);

    let pool = Pool::builder(Manager::from_config(
        config,
        tokio_postgres::NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    ))
    .build()
    .map_err(|e| format!("failed to connect to db: {e}"))?;

    Ok(pool)
}

/// Asserts that an operation's result matches the expected value or status.
pub fn assert_result<T, E>(got: Result<T, E>, want: Result<T, StatusCode>)
where
    T: PartialEq + Debug,
    E: ErrorStatus + Display,
{
    match (got, want) {
        (Ok(got), Ok(want)) => assert_eq!(got, want),
        (Err(got), Err(want)) => assert_eq!(got.status(), want, "error: {got}"),
        (Ok(got), Err(want)) => panic!("left: {got:?}\nright: {want}"),
        (Err(got), Ok(want)) => panic!("left: {got}\nright: {want:?}"),
    }
}

/// Applies the embedded refinery migrations found in `$migrations_folder`
/// (relative to the calling crate's manifest) using a connection from `$pool`.
///
/// Must be expanded inside a function returning `Result<_, Box<dyn Error>>`.
#[macro_export]
macro_rules! run_db_migrations {
    ($pool:expr, $migrations_folder:literal) => {{
        use std::ops::DerefMut;
        refinery::embed_migrations!($migrations_folder);
        let mut conn = $pool
            .get()
            .await
            .map_err(|e| format!("failed to apply database migrations: get db connection: {e}"))?;
        let client = conn.deref_mut().deref_mut();
        let report = migrations::runner().run_async(client).await?;

        for migration in report.applied_migrations() {
            tracing::info!(
                version = migration.version(),
                name = migration.name(),
                "migration applied"
            );
        }
    }};
}

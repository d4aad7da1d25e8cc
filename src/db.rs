// src/db.rs

use std::{str::FromStr, time::Duration};

use chrono::Utc;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    config::Config,
    error::AppError,
    models::user::Role,
    utils::{hash::hash_password, validation::normalize_email},
};

/// Opens the SQLite pool, retrying a few times while the database file or volume comes up.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut retry_count = 0;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    return Err(e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

/// Applies the embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the staff administrator named in the config, if it does not exist yet.
///
/// This is the only way to obtain `is_staff`; accounts created through signup never have it.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = normalize_email(email);

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    if exists.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", email);
    let hashed_password = hash_password(password)?;
    let full_name = config
        .admin_full_name
        .clone()
        .unwrap_or_else(|| "Administrator".to_string());
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (email, full_name, password, role, is_active, is_staff, created_at, updated_at)
        VALUES (?, ?, ?, ?, 1, 1, ?, ?)
        "#,
    )
    .bind(&email)
    .bind(full_name)
    .bind(hashed_password)
    .bind(Role::Admin)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!("Admin user created successfully.");
    Ok(())
}

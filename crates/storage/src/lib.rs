//! SeaORM-backed storage adapters that satisfy the domain storage traits while
//! keeping the database backend swappable (SQLite by default, PostgreSQL via
//! feature flag).

mod address_store;
mod builder;
mod configuration_store;
mod country_store;
mod entity;
mod migration;
mod shipping_rate_store;

use std::sync::Arc;

pub use builder::StorageBuilder;
use sea_orm::DatabaseConnection;
use shipping_domain::storage::StorageResult;

/// Shared storage handle used by the HTTP API.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::builder().database_url(database_url).build().await
    }

    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub(crate) fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use shipping_domain::model::CountryCode;
    use shipping_domain::storage::CountryStore;
    use shipping_domain::Country;

    use crate::SeaOrmStorage;

    pub async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::connect("sqlite::memory:")
            .await
            .expect("storage inits")
    }

    pub fn code(raw: &str) -> CountryCode {
        CountryCode::parse(raw).unwrap()
    }

    pub async fn seed_country(storage: &SeaOrmStorage, iso: &str, name: &str, priority: i32) {
        storage
            .insert_country(Country {
                iso: code(iso),
                name_official: format!("The {name}"),
                name: name.to_string(),
                sort_priority: priority,
            })
            .await
            .unwrap();
    }
}

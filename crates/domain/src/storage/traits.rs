use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    Address, AddressId, Country, CountryCode, NewAddress, NewShippingRate, ShippingRate,
    SiteConfiguration,
};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn insert_address(&self, address: NewAddress) -> StorageResult<Address>;
    async fn list_addresses(&self) -> StorageResult<Vec<Address>>;
    async fn find_address(&self, id: AddressId) -> StorageResult<Option<Address>>;
    /// Replaces every field; `None` when the id does not exist.
    async fn update_address(
        &self,
        id: AddressId,
        address: NewAddress,
    ) -> StorageResult<Option<Address>>;
    /// Removes the row and returns its last state; `None` when the id does
    /// not exist.
    async fn delete_address(&self, id: AddressId) -> StorageResult<Option<Address>>;
}

#[async_trait]
pub trait CountryStore: Send + Sync {
    async fn insert_country(&self, country: Country) -> StorageResult<()>;
    async fn find_country(&self, iso: &CountryCode) -> StorageResult<Option<Country>>;
    /// Countries served by at least one shipping rate.
    async fn shipping_countries(&self) -> StorageResult<Vec<Country>>;
}

#[async_trait]
pub trait ShippingRateStore: Send + Sync {
    async fn insert_rate(&self, rate: NewShippingRate) -> StorageResult<ShippingRate>;
    /// Rates whose country set contains `iso`, ordered by id.
    async fn rates_for_country(&self, iso: &CountryCode) -> StorageResult<Vec<ShippingRate>>;
    /// Lowest-id rate named `name` that serves `iso`.
    async fn find_rate(&self, name: &str, iso: &CountryCode)
        -> StorageResult<Option<ShippingRate>>;
    /// Whether any rate carries `name`, regardless of country.
    async fn rate_name_exists(&self, name: &str) -> StorageResult<bool>;
}

#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn find_configuration(&self, site: &str) -> StorageResult<Option<SiteConfiguration>>;
    async fn upsert_configuration(&self, config: SiteConfiguration) -> StorageResult<()>;
}

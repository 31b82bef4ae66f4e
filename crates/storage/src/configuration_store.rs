use sea_orm::{sea_query::OnConflict, EntityTrait, Set};
use shipping_domain::model::{from_minor_units, to_minor_units, SiteConfiguration};
use shipping_domain::storage::{ConfigurationStore, StorageError, StorageResult};

use crate::entity::site_configurations;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl ConfigurationStore for SeaOrmStorage {
    async fn find_configuration(&self, site: &str) -> StorageResult<Option<SiteConfiguration>> {
        let maybe = site_configurations::Entity::find_by_id(site.to_ascii_lowercase())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(|model| SiteConfiguration {
            site: model.site,
            default_shipping_enabled: model.default_shipping_enabled,
            default_shipping_rate: from_minor_units(model.default_shipping_rate),
            default_shipping_carrier: model.default_shipping_carrier,
        }))
    }

    async fn upsert_configuration(&self, config: SiteConfiguration) -> StorageResult<()> {
        let rate = to_minor_units(config.default_shipping_rate).ok_or_else(|| {
            StorageError::Database(format!(
                "default shipping rate {} out of range",
                config.default_shipping_rate
            ))
        })?;
        let active = site_configurations::ActiveModel {
            site: Set(config.site.to_ascii_lowercase()),
            default_shipping_enabled: Set(config.default_shipping_enabled),
            default_shipping_rate: Set(rate),
            default_shipping_carrier: Set(config.default_shipping_carrier),
        };
        site_configurations::Entity::insert(active)
            .on_conflict(
                OnConflict::column(site_configurations::Column::Site)
                    .update_columns([
                        site_configurations::Column::DefaultShippingEnabled,
                        site_configurations::Column::DefaultShippingRate,
                        site_configurations::Column::DefaultShippingCarrier,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }
}

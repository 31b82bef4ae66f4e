use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use shipping_domain::model::{
    from_minor_units, to_minor_units, CountryCode, NewShippingRate, ShippingRate, ShippingRateId,
};
use shipping_domain::storage::{ShippingRateStore, StorageError, StorageResult};
use tracing::debug;

use crate::entity::{shipping_rate_countries, shipping_rates};
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl ShippingRateStore for SeaOrmStorage {
    async fn insert_rate(&self, rate: NewShippingRate) -> StorageResult<ShippingRate> {
        let cost = to_minor_units(rate.cost)
            .ok_or_else(|| StorageError::Database(format!("cost {} out of range", rate.cost)))?;
        let mut countries = rate.countries;
        countries.sort();
        countries.dedup();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        let created = shipping_rates::ActiveModel {
            name: Set(rate.name),
            cost: Set(cost),
            carrier: Set(rate.carrier),
            description: Set(rate.description),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(StorageError::from_source)?;

        if !countries.is_empty() {
            let links = countries
                .iter()
                .map(|iso| shipping_rate_countries::ActiveModel {
                    rate_id: Set(created.id),
                    country_iso: Set(iso.as_str().to_owned()),
                });
            shipping_rate_countries::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(StorageError::from_source)?;
        }
        txn.commit().await.map_err(StorageError::from_source)?;

        debug!(rate_id = created.id, name = %created.name, "shipping rate stored");
        Ok(rate_to_record(created, countries))
    }

    async fn rates_for_country(&self, iso: &CountryCode) -> StorageResult<Vec<ShippingRate>> {
        let rate_ids = self.rate_ids_for_country(iso).await?;
        if rate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rates = shipping_rates::Entity::find()
            .filter(shipping_rates::Column::Id.is_in(rate_ids))
            .order_by_asc(shipping_rates::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        self.attach_countries(rates).await
    }

    async fn find_rate(
        &self,
        name: &str,
        iso: &CountryCode,
    ) -> StorageResult<Option<ShippingRate>> {
        let rate_ids = self.rate_ids_for_country(iso).await?;
        if rate_ids.is_empty() {
            return Ok(None);
        }

        let maybe = shipping_rates::Entity::find()
            .filter(shipping_rates::Column::Name.eq(name))
            .filter(shipping_rates::Column::Id.is_in(rate_ids))
            .order_by_asc(shipping_rates::Column::Id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        match maybe {
            Some(model) => Ok(self.attach_countries(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn rate_name_exists(&self, name: &str) -> StorageResult<bool> {
        let maybe = shipping_rates::Entity::find()
            .filter(shipping_rates::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.is_some())
    }
}

impl SeaOrmStorage {
    async fn rate_ids_for_country(&self, iso: &CountryCode) -> StorageResult<Vec<ShippingRateId>> {
        shipping_rate_countries::Entity::find()
            .select_only()
            .column(shipping_rate_countries::Column::RateId)
            .filter(shipping_rate_countries::Column::CountryIso.eq(iso.as_str()))
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)
    }

    async fn attach_countries(
        &self,
        rates: Vec<shipping_rates::Model>,
    ) -> StorageResult<Vec<ShippingRate>> {
        let ids: Vec<ShippingRateId> = rates.iter().map(|rate| rate.id).collect();
        let links = shipping_rate_countries::Entity::find()
            .filter(shipping_rate_countries::Column::RateId.is_in(ids))
            .order_by_asc(shipping_rate_countries::Column::CountryIso)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let mut by_rate: BTreeMap<ShippingRateId, Vec<CountryCode>> = BTreeMap::new();
        for link in links {
            let iso = CountryCode::parse(&link.country_iso)
                .map_err(|err| StorageError::Database(err.to_string()))?;
            by_rate.entry(link.rate_id).or_default().push(iso);
        }

        Ok(rates
            .into_iter()
            .map(|rate| {
                let countries = by_rate.remove(&rate.id).unwrap_or_default();
                rate_to_record(rate, countries)
            })
            .collect())
    }
}

fn rate_to_record(model: shipping_rates::Model, countries: Vec<CountryCode>) -> ShippingRate {
    ShippingRate {
        id: model.id,
        name: model.name,
        cost: from_minor_units(model.cost),
        carrier: model.carrier,
        description: model.description,
        countries,
    }
}

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use shipping_domain::model::{Country, CountryCode};
use shipping_domain::storage::{CountryStore, StorageError, StorageResult};

use crate::entity::{countries, shipping_rate_countries};
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl CountryStore for SeaOrmStorage {
    async fn insert_country(&self, country: Country) -> StorageResult<()> {
        let model = countries::ActiveModel {
            iso: Set(country.iso.into_inner()),
            name_official: Set(country.name_official),
            name: Set(country.name),
            sort_priority: Set(country.sort_priority),
        };
        model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }

    async fn find_country(&self, iso: &CountryCode) -> StorageResult<Option<Country>> {
        let maybe = countries::Entity::find_by_id(iso.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        maybe.map(country_to_record).transpose()
    }

    async fn shipping_countries(&self) -> StorageResult<Vec<Country>> {
        let served: Vec<String> = shipping_rate_countries::Entity::find()
            .select_only()
            .column(shipping_rate_countries::Column::CountryIso)
            .distinct()
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        if served.is_empty() {
            return Ok(Vec::new());
        }

        countries::Entity::find()
            .filter(countries::Column::Iso.is_in(served))
            .order_by_desc(countries::Column::SortPriority)
            .order_by_asc(countries::Column::Name)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?
            .into_iter()
            .map(country_to_record)
            .collect()
    }
}

fn country_to_record(model: countries::Model) -> StorageResult<Country> {
    let iso =
        CountryCode::parse(&model.iso).map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(Country {
        iso,
        name_official: model.name_official,
        name: model.name,
        sort_priority: model.sort_priority,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shipping_domain::model::NewShippingRate;
    use shipping_domain::storage::ShippingRateStore;

    use super::*;
    use crate::test_support::{code, seed_country, storage};

    #[tokio::test]
    async fn find_country_by_code() {
        let storage = storage().await;
        seed_country(&storage, "US", "United States", 0).await;

        let found = storage.find_country(&code("us")).await.unwrap().unwrap();
        assert_eq!(found.name, "United States");
        assert_eq!(found.name_official, "The United States");
        assert_eq!(storage.find_country(&code("ZZ")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_country_is_rejected() {
        let storage = storage().await;
        seed_country(&storage, "US", "United States", 0).await;
        let err = storage
            .insert_country(Country {
                iso: code("US"),
                name_official: "Again".into(),
                name: "Again".into(),
                sort_priority: 0,
            })
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn shipping_countries_excludes_countries_without_rates() {
        let storage = storage().await;
        seed_country(&storage, "US", "United States", 0).await;
        seed_country(&storage, "GB", "United Kingdom", 10).await;
        seed_country(&storage, "FR", "France", 0).await;
        assert!(storage.shipping_countries().await.unwrap().is_empty());

        for (name, countries) in [("standard", vec!["US", "GB"]), ("express", vec!["US"])] {
            storage
                .insert_rate(NewShippingRate {
                    name: name.into(),
                    cost: Decimal::new(500, 2),
                    carrier: "Post".into(),
                    description: String::new(),
                    countries: countries.into_iter().map(code).collect(),
                })
                .await
                .unwrap();
        }

        let listed: Vec<String> = storage
            .shipping_countries()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.iso.into_inner())
            .collect();
        assert_eq!(listed, vec!["GB".to_string(), "US".to_string()]);
    }
}

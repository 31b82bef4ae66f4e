use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, QueryOrder, Set};
use shipping_domain::model::{Address, AddressId, CountryCode, NewAddress};
use shipping_domain::storage::{AddressStore, StorageError, StorageResult};

use crate::entity::addresses;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl AddressStore for SeaOrmStorage {
    async fn insert_address(&self, address: NewAddress) -> StorageResult<Address> {
        let model = addresses::ActiveModel {
            name: Set(address.name),
            line_1: Set(address.line_1),
            line_2: Set(address.line_2),
            city: Set(address.city),
            postcode: Set(address.postcode),
            country_iso: Set(address.country.into_inner()),
            ..Default::default()
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        address_to_record(created)
    }

    async fn list_addresses(&self) -> StorageResult<Vec<Address>> {
        addresses::Entity::find()
            .order_by_asc(addresses::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?
            .into_iter()
            .map(address_to_record)
            .collect()
    }

    async fn find_address(&self, id: AddressId) -> StorageResult<Option<Address>> {
        let maybe = addresses::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        maybe.map(address_to_record).transpose()
    }

    async fn update_address(
        &self,
        id: AddressId,
        address: NewAddress,
    ) -> StorageResult<Option<Address>> {
        let maybe = addresses::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        let Some(model) = maybe else {
            return Ok(None);
        };

        let mut active: addresses::ActiveModel = model.into();
        active.name = Set(address.name);
        active.line_1 = Set(address.line_1);
        active.line_2 = Set(address.line_2);
        active.city = Set(address.city);
        active.postcode = Set(address.postcode);
        active.country_iso = Set(address.country.into_inner());
        // The row can vanish between the lookup and the write.
        match active.update(self.connection()).await {
            Ok(updated) => address_to_record(updated).map(Some),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(StorageError::from_source(err)),
        }
    }

    async fn delete_address(&self, id: AddressId) -> StorageResult<Option<Address>> {
        let maybe = addresses::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        let Some(model) = maybe else {
            return Ok(None);
        };

        let snapshot = address_to_record(model)?;
        let result = addresses::Entity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        // Only the caller whose statement removed the row reports it.
        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(snapshot))
    }
}

fn address_to_record(model: addresses::Model) -> StorageResult<Address> {
    let country = CountryCode::parse(&model.country_iso)
        .map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(Address {
        id: model.id,
        name: model.name,
        line_1: model.line_1,
        line_2: model.line_2,
        city: model.city,
        postcode: model.postcode,
        country,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{code, storage};

    fn new_address(city: &str) -> NewAddress {
        NewAddress {
            name: "Ada Lovelace".into(),
            line_1: "12 St James's Square".into(),
            line_2: String::new(),
            city: city.into(),
            postcode: "SW1Y 4JH".into(),
            country: code("GB"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_lists_in_order() {
        let storage = storage().await;
        let first = storage.insert_address(new_address("London")).await.unwrap();
        let second = storage.insert_address(new_address("Leeds")).await.unwrap();
        assert!(second.id > first.id);

        let listed = storage.list_addresses().await.unwrap();
        assert_eq!(listed, vec![first.clone(), second]);
        assert_eq!(
            storage.find_address(first.id).await.unwrap(),
            Some(first)
        );
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let storage = storage().await;
        let created = storage.insert_address(new_address("London")).await.unwrap();

        let mut changed = new_address("Paris");
        changed.country = code("FR");
        let updated = storage
            .update_address(created.id, changed)
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.city, "Paris");
        assert_eq!(updated.country, code("FR"));
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows_return_none() {
        let storage = storage().await;
        assert_eq!(
            storage.update_address(404, new_address("Nowhere")).await.unwrap(),
            None
        );
        assert_eq!(storage.delete_address(404).await.unwrap(), None);
        assert_eq!(storage.find_address(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_returns_removed_snapshot() {
        let storage = storage().await;
        let created = storage.insert_address(new_address("London")).await.unwrap();

        let removed = storage.delete_address(created.id).await.unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert_eq!(storage.find_address(created.id).await.unwrap(), None);
        assert!(storage.list_addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_deletes_report_one_removal() {
        let storage = storage().await;
        let created = storage.insert_address(new_address("London")).await.unwrap();

        let (first, second) = tokio::join!(
            storage.delete_address(created.id),
            storage.delete_address(created.id)
        );
        let removed = [first.unwrap(), second.unwrap()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(removed, vec![created]);
    }

    #[tokio::test]
    async fn update_after_delete_returns_none() {
        let storage = storage().await;
        let created = storage.insert_address(new_address("London")).await.unwrap();

        let (deleted, updated) = tokio::join!(
            storage.delete_address(created.id),
            storage.update_address(created.id, new_address("Paris"))
        );
        assert!(deleted.unwrap().is_some());
        // Whichever ran first, the update never surfaces as an error.
        let updated = updated.unwrap();
        assert!(updated.map_or(true, |address| address.city == "Paris"));
        assert_eq!(storage.find_address(created.id).await.unwrap(), None);
    }
}

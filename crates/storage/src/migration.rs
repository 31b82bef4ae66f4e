use sea_orm::sea_query::{ColumnDef, Index, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};
use shipping_domain::model::{
    CITY_MAX_CHARS, COUNTRY_CODE_LENGTH, LINE_MAX_CHARS, NAME_MAX_CHARS, POSTCODE_MAX_CHARS,
};
use shipping_domain::storage::{StorageError, StorageResult};

use crate::entity::{
    addresses, countries, shipping_rate_countries, shipping_rates, site_configurations,
};

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let countries_table = Table::create()
        .table(countries::Entity)
        .col(
            ColumnDef::new(countries::Column::Iso)
                .string_len(2)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(countries::Column::NameOfficial)
                .string_len(128)
                .not_null(),
        )
        .col(ColumnDef::new(countries::Column::Name).string_len(128).not_null())
        .col(
            ColumnDef::new(countries::Column::SortPriority)
                .integer()
                .not_null()
                .default(0),
        )
        .to_owned();
    create_table(db, backend, countries_table).await?;

    let addresses_table = Table::create()
        .table(addresses::Entity)
        .col(
            ColumnDef::new(addresses::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(addresses::Column::Name)
                .string_len(NAME_MAX_CHARS as u32)
                .not_null(),
        )
        .col(
            ColumnDef::new(addresses::Column::Line1)
                .string_len(LINE_MAX_CHARS as u32)
                .not_null(),
        )
        .col(
            ColumnDef::new(addresses::Column::Line2)
                .string_len(LINE_MAX_CHARS as u32)
                .not_null()
                .default(""),
        )
        .col(
            ColumnDef::new(addresses::Column::City)
                .string_len(CITY_MAX_CHARS as u32)
                .not_null(),
        )
        .col(
            ColumnDef::new(addresses::Column::Postcode)
                .string_len(POSTCODE_MAX_CHARS as u32)
                .not_null(),
        )
        .col(
            ColumnDef::new(addresses::Column::CountryIso)
                .string_len(COUNTRY_CODE_LENGTH as u32)
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, addresses_table).await?;

    let rates_table = Table::create()
        .table(shipping_rates::Entity)
        .col(
            ColumnDef::new(shipping_rates::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(shipping_rates::Column::Name)
                .string_len(32)
                .not_null(),
        )
        .col(
            ColumnDef::new(shipping_rates::Column::Cost)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(shipping_rates::Column::Carrier)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(shipping_rates::Column::Description)
                .string_len(128)
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, rates_table).await?;

    let rate_countries_table = Table::create()
        .table(shipping_rate_countries::Entity)
        .col(
            ColumnDef::new(shipping_rate_countries::Column::RateId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(shipping_rate_countries::Column::CountryIso)
                .string_len(2)
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(shipping_rate_countries::Column::RateId)
                .col(shipping_rate_countries::Column::CountryIso),
        )
        .to_owned();
    create_table(db, backend, rate_countries_table).await?;

    let configurations_table = Table::create()
        .table(site_configurations::Entity)
        .col(
            ColumnDef::new(site_configurations::Column::Site)
                .string_len(255)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(site_configurations::Column::DefaultShippingEnabled)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(site_configurations::Column::DefaultShippingRate)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(site_configurations::Column::DefaultShippingCarrier)
                .string_len(64)
                .not_null()
                .default(""),
        )
        .to_owned();
    create_table(db, backend, configurations_table).await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}

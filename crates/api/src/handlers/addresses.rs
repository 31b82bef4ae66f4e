use actix_web::{web, HttpResponse};
use metrics::counter;
use serde::{Deserialize, Serialize};
use shipping_domain::model::{Address, AddressId, AddressPatch, CountryCode, NewAddress};
use shipping_domain::services::events::{AddressChange, AddressModified};
use shipping_domain::storage::{AddressStore, CountryStore};
use tracing::warn;

use crate::{access::Permitted, state::AppState};

use super::ApiError;

#[derive(Debug, Deserialize, Serialize)]
pub struct AddressPayload {
    pub name: String,
    pub line_1: String,
    #[serde(default)]
    pub line_2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AddressPatchPayload {
    pub name: Option<String>,
    pub line_1: Option<String>,
    pub line_2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressResponse {
    pub id: AddressId,
    pub name: String,
    pub line_1: String,
    pub line_2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            name: address.name,
            line_1: address.line_1,
            line_2: address.line_2,
            city: address.city,
            postcode: address.postcode,
            country: address.country.into_inner(),
        }
    }
}

pub async fn list_addresses_handler(
    _: Permitted,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let addresses = state.storage().list_addresses().await?;
    record_request("list", "ok");
    let body: Vec<AddressResponse> = addresses.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn create_address_handler(
    _: Permitted,
    state: web::Data<AppState>,
    payload: web::Json<AddressPayload>,
) -> Result<HttpResponse, ApiError> {
    let fields = new_address(&state, payload.into_inner()).await?;
    let created = state.storage().insert_address(fields).await?;
    record_request("create", "ok");
    notify_address_modified(&state, AddressChange::Created, &created);
    Ok(HttpResponse::Created().json(AddressResponse::from(created)))
}

pub async fn retrieve_address_handler(
    _: Permitted,
    state: web::Data<AppState>,
    path: web::Path<AddressId>,
) -> Result<HttpResponse, ApiError> {
    let address = state
        .storage()
        .find_address(path.into_inner())
        .await?
        .ok_or_else(|| not_found("retrieve"))?;
    record_request("retrieve", "ok");
    Ok(HttpResponse::Ok().json(AddressResponse::from(address)))
}

pub async fn update_address_handler(
    _: Permitted,
    state: web::Data<AppState>,
    path: web::Path<AddressId>,
    payload: web::Json<AddressPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if state.storage().find_address(id).await?.is_none() {
        return Err(not_found("update"));
    }
    let fields = new_address(&state, payload.into_inner()).await?;
    let updated = state
        .storage()
        .update_address(id, fields)
        .await?
        .ok_or_else(|| not_found("update"))?;
    record_request("update", "ok");
    notify_address_modified(&state, AddressChange::Updated, &updated);
    Ok(HttpResponse::Ok().json(AddressResponse::from(updated)))
}

pub async fn partial_update_address_handler(
    _: Permitted,
    state: web::Data<AppState>,
    path: web::Path<AddressId>,
    payload: web::Json<AddressPatchPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let current = state
        .storage()
        .find_address(id)
        .await?
        .ok_or_else(|| not_found("partial_update"))?;

    let payload = payload.into_inner();
    let country = match payload.country {
        Some(raw) => Some(existing_country(&state, &raw).await?),
        None => None,
    };
    let fields = AddressPatch {
        name: payload.name,
        line_1: payload.line_1,
        line_2: payload.line_2,
        city: payload.city,
        postcode: payload.postcode,
        country,
    }
    .apply_to(&current);
    fields.validate()?;

    let updated = state
        .storage()
        .update_address(id, fields)
        .await?
        .ok_or_else(|| not_found("partial_update"))?;
    record_request("partial_update", "ok");
    notify_address_modified(&state, AddressChange::Updated, &updated);
    Ok(HttpResponse::Ok().json(AddressResponse::from(updated)))
}

pub async fn delete_address_handler(
    _: Permitted,
    state: web::Data<AppState>,
    path: web::Path<AddressId>,
) -> Result<HttpResponse, ApiError> {
    let removed = state
        .storage()
        .delete_address(path.into_inner())
        .await?
        .ok_or_else(|| not_found("delete"))?;
    record_request("delete", "ok");
    notify_address_modified(&state, AddressChange::Deleted, &removed);
    Ok(HttpResponse::NoContent().finish())
}

async fn new_address(state: &AppState, payload: AddressPayload) -> Result<NewAddress, ApiError> {
    let country = existing_country(state, &payload.country).await?;
    let fields = NewAddress {
        name: payload.name,
        line_1: payload.line_1,
        line_2: payload.line_2,
        city: payload.city,
        postcode: payload.postcode,
        country,
    };
    fields.validate()?;
    Ok(fields)
}

async fn existing_country(state: &AppState, raw: &str) -> Result<CountryCode, ApiError> {
    let code =
        CountryCode::parse(raw).map_err(|_| ApiError::InvalidCountryCode(raw.trim().to_owned()))?;
    match state.storage().find_country(&code).await? {
        Some(country) => Ok(country.iso),
        None => Err(ApiError::UnknownCountry(code)),
    }
}

/// Publishes the event once the mutation is committed. Failures are logged
/// and counted but never change the response.
fn notify_address_modified(state: &AppState, change: AddressChange, address: &Address) {
    let label = change.as_ref().to_owned();
    match state
        .publisher()
        .publish(AddressModified::new(change, address.clone()))
    {
        Ok(()) => {
            counter!("api_address_events_total", "change" => label, "status" => "published")
                .increment(1);
        }
        Err(err) => {
            warn!(
                address_id = address.id,
                change = %label,
                error = %err,
                "failed to publish address event"
            );
            counter!("api_address_events_total", "change" => label, "status" => "failed")
                .increment(1);
        }
    }
}

fn not_found(operation: &'static str) -> ApiError {
    record_request(operation, "not_found");
    ApiError::NotFound
}

fn record_request(operation: &'static str, status: &'static str) {
    counter!("api_address_requests_total", "operation" => operation, "status" => status)
        .increment(1);
}

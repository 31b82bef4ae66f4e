use actix_web::{web, HttpResponse};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipping_domain::model::{
    Country, CountryCode, ShippingQuote, ShippingRate, ShippingRateId, DEFAULT_RATE_NAME,
};
use shipping_domain::services::shipping::{
    configuration_for_site, quote_shipping, ShippingCostError,
};
use shipping_domain::storage::{CountryStore, ShippingRateStore};

use crate::{site::SiteKey, state::AppState};

use super::ApiError;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ShippingCostQuery {
    pub country_code: Option<String>,
    pub shipping_rate_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingCostResponse {
    pub cost: Decimal,
    pub is_default: bool,
    pub carrier: String,
    pub description: String,
}

impl From<ShippingQuote> for ShippingCostResponse {
    fn from(quote: ShippingQuote) -> Self {
        Self {
            cost: quote.cost,
            is_default: quote.is_default,
            carrier: quote.carrier,
            description: quote.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryResponse {
    pub iso: String,
    pub name_official: String,
    pub name: String,
    pub sort_priority: i32,
}

impl From<Country> for CountryResponse {
    fn from(country: Country) -> Self {
        Self {
            iso: country.iso.into_inner(),
            name_official: country.name_official,
            name: country.name,
            sort_priority: country.sort_priority,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingRateResponse {
    pub id: ShippingRateId,
    pub name: String,
    pub cost: Decimal,
    pub carrier: String,
    pub description: String,
    pub countries: Vec<String>,
}

impl From<ShippingRate> for ShippingRateResponse {
    fn from(rate: ShippingRate) -> Self {
        Self {
            id: rate.id,
            name: rate.name,
            cost: rate.cost,
            carrier: rate.carrier,
            description: rate.description,
            countries: rate
                .countries
                .into_iter()
                .map(CountryCode::into_inner)
                .collect(),
        }
    }
}

pub async fn shipping_cost_handler(
    state: web::Data<AppState>,
    site: SiteKey,
    query: web::Query<ShippingCostQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let rate_name = query
        .shipping_rate_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RATE_NAME.to_string());

    let Some(code) = query
        .country_code
        .as_deref()
        .and_then(|raw| CountryCode::parse(raw).ok())
    else {
        record_cost_outcome(&ShippingCostError::MissingCountryCode);
        return Err(ShippingCostError::MissingCountryCode.into());
    };

    let config =
        configuration_for_site(state.storage(), site.as_str(), state.default_site()).await?;
    match quote_shipping(state.storage(), &config, &code, &rate_name).await {
        Ok(quote) => {
            let outcome = if quote.is_default { "default" } else { "specific" };
            counter!("api_shipping_cost_requests_total", "outcome" => outcome).increment(1);
            Ok(HttpResponse::Ok().json(ShippingCostResponse::from(quote)))
        }
        Err(err) => {
            record_cost_outcome(&err);
            Err(err.into())
        }
    }
}

pub async fn shipping_countries_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let countries = state.storage().shipping_countries().await?;
    counter!("api_shipping_lookup_requests_total", "endpoint" => "countries").increment(1);
    let body: Vec<CountryResponse> = countries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn shipping_options_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    counter!("api_shipping_lookup_requests_total", "endpoint" => "options").increment(1);
    // An unparseable code cannot match any rate.
    let Ok(code) = CountryCode::parse(&path.into_inner()) else {
        return Ok(HttpResponse::Ok().json(Vec::<ShippingRateResponse>::new()));
    };
    let rates = state.storage().rates_for_country(&code).await?;
    let body: Vec<ShippingRateResponse> = rates.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

fn record_cost_outcome(err: &ShippingCostError) {
    let outcome = match err {
        ShippingCostError::MissingCountryCode => "missing_country_code",
        ShippingCostError::InvalidShippingRate { .. } => "invalid_rate",
        ShippingCostError::InvalidShippingCountry { .. } => "invalid_country",
        ShippingCostError::Storage(_) => "storage_error",
    };
    counter!("api_shipping_cost_requests_total", "outcome" => outcome).increment(1);
}

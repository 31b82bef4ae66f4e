pub mod addresses;
pub mod metrics;
pub mod shipping;

pub use addresses::{
    create_address_handler, delete_address_handler, list_addresses_handler,
    partial_update_address_handler, retrieve_address_handler, update_address_handler,
};
pub use metrics::metrics_handler;
pub use shipping::{shipping_cost_handler, shipping_countries_handler, shipping_options_handler};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use shipping_domain::model::{AddressFieldError, CountryCode};
use shipping_domain::services::shipping::ShippingCostError;
use shipping_domain::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No country code supplied")]
    MissingCountryCode,
    #[error("Shipping option {0} is invalid")]
    InvalidShippingRate(String),
    #[error("Shipping to {0} is not available")]
    InvalidShippingCountry(CountryCode),
    #[error("Invalid country code {0}")]
    InvalidCountryCode(String),
    #[error("Country {0} does not exist")]
    UnknownCountry(CountryCode),
    #[error(transparent)]
    InvalidAddress(#[from] AddressFieldError),
    #[error("Not found.")]
    NotFound,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<ShippingCostError> for ApiError {
    fn from(err: ShippingCostError) -> Self {
        match err {
            ShippingCostError::MissingCountryCode => ApiError::MissingCountryCode,
            ShippingCostError::InvalidShippingRate { name } => ApiError::InvalidShippingRate(name),
            ShippingCostError::InvalidShippingCountry { code } => {
                ApiError::InvalidShippingCountry(code)
            }
            ShippingCostError::Storage(err) => ApiError::Storage(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCountryCode
            | ApiError::InvalidShippingRate(_)
            | ApiError::InvalidShippingCountry(_)
            | ApiError::InvalidCountryCode(_)
            | ApiError::UnknownCountry(_)
            | ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Storage(err) => {
                error!(error = %err, "request failed on storage");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { message })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

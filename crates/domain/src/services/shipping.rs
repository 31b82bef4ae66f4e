//! Shipping cost resolution with the site default fallback.

use thiserror::Error;

use crate::model::{CountryCode, ShippingQuote, ShippingRate, SiteConfiguration};
use crate::storage::{ConfigurationStore, ShippingRateStore, StorageError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShippingCostError {
    #[error("No country code supplied")]
    MissingCountryCode,
    #[error("Shipping option {name} is invalid")]
    InvalidShippingRate { name: String },
    #[error("Shipping to {code} is not available")]
    InvalidShippingCountry { code: CountryCode },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Decides the quote once the lookups are done.
///
/// `matching` is the rate named `rate_name` serving `code`, if any, and
/// `option_exists` tells whether `rate_name` is offered to any country.
pub fn resolve_shipping_cost(
    config: &SiteConfiguration,
    code: &CountryCode,
    rate_name: &str,
    matching: Option<&ShippingRate>,
    option_exists: bool,
) -> Result<ShippingQuote, ShippingCostError> {
    if let Some(rate) = matching {
        return Ok(ShippingQuote::from_rate(rate));
    }
    if !option_exists {
        return Err(ShippingCostError::InvalidShippingRate {
            name: rate_name.to_string(),
        });
    }
    if config.default_shipping_enabled {
        return Ok(ShippingQuote::from_site_default(config));
    }
    Err(ShippingCostError::InvalidShippingCountry { code: code.clone() })
}

/// Looks up the rate for `code`/`rate_name` and applies the fallback policy.
pub async fn quote_shipping<S>(
    store: &S,
    config: &SiteConfiguration,
    code: &CountryCode,
    rate_name: &str,
) -> Result<ShippingQuote, ShippingCostError>
where
    S: ShippingRateStore + ?Sized,
{
    let matching = store.find_rate(rate_name, code).await?;
    let option_exists = match matching {
        Some(_) => true,
        None => store.rate_name_exists(rate_name).await?,
    };
    resolve_shipping_cost(config, code, rate_name, matching.as_ref(), option_exists)
}

/// Configuration for `site`, else for `fallback_site`, else a disabled one.
pub async fn configuration_for_site<S>(
    store: &S,
    site: &str,
    fallback_site: &str,
) -> Result<SiteConfiguration, StorageError>
where
    S: ConfigurationStore + ?Sized,
{
    if let Some(config) = store.find_configuration(site).await? {
        return Ok(config);
    }
    if site != fallback_site {
        if let Some(config) = store.find_configuration(fallback_site).await? {
            return Ok(config);
        }
    }
    Ok(SiteConfiguration::disabled(site))
}

use rust_decimal::Decimal;

use super::CountryCode;

/// Rate option used when the caller does not name one.
pub const DEFAULT_RATE_NAME: &str = "standard";

/// Description attached to quotes served from the site default.
pub const DEFAULT_SHIPPING_DESCRIPTION: &str = "Standard shipping to rest of world";

pub type ShippingRateId = i32;

/// Shipping destination reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub iso: CountryCode,
    pub name_official: String,
    pub name: String,
    pub sort_priority: i32,
}

/// A named rate option and the countries it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRate {
    pub id: ShippingRateId,
    pub name: String,
    pub cost: Decimal,
    pub carrier: String,
    pub description: String,
    pub countries: Vec<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShippingRate {
    pub name: String,
    pub cost: Decimal,
    pub carrier: String,
    pub description: String,
    pub countries: Vec<CountryCode>,
}

/// Site-scoped shipping settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfiguration {
    pub site: String,
    pub default_shipping_enabled: bool,
    pub default_shipping_rate: Decimal,
    pub default_shipping_carrier: String,
}

impl SiteConfiguration {
    /// Settings for a site nobody configured: no default fallback.
    pub fn disabled(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            default_shipping_enabled: false,
            default_shipping_rate: Decimal::ZERO,
            default_shipping_carrier: String::new(),
        }
    }
}

/// Resolved shipping cost for a country and rate option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingQuote {
    pub cost: Decimal,
    pub is_default: bool,
    pub carrier: String,
    pub description: String,
}

impl ShippingQuote {
    pub fn from_rate(rate: &ShippingRate) -> Self {
        Self {
            cost: rate.cost,
            is_default: false,
            carrier: rate.carrier.clone(),
            description: rate.description.clone(),
        }
    }

    pub fn from_site_default(config: &SiteConfiguration) -> Self {
        Self {
            cost: config.default_shipping_rate,
            is_default: true,
            carrier: config.default_shipping_carrier.clone(),
            description: DEFAULT_SHIPPING_DESCRIPTION.to_string(),
        }
    }
}

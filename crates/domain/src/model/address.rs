use thiserror::Error;

use super::CountryCode;

pub type AddressId = i32;

pub const NAME_MAX_CHARS: usize = 64;
pub const LINE_MAX_CHARS: usize = 128;
pub const CITY_MAX_CHARS: usize = 64;
pub const POSTCODE_MAX_CHARS: usize = 10;

/// Raised when an address field exceeds its column width.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Ensure {field} has no more than {max} characters")]
pub struct AddressFieldError {
    pub field: &'static str,
    pub max: usize,
}

/// A persisted postal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub line_1: String,
    pub line_2: String,
    pub city: String,
    pub postcode: String,
    pub country: CountryCode,
}

/// Full set of address fields, used for create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub name: String,
    pub line_1: String,
    pub line_2: String,
    pub city: String,
    pub postcode: String,
    pub country: CountryCode,
}

impl NewAddress {
    /// Checks every text field against the stored column widths.
    pub fn validate(&self) -> Result<(), AddressFieldError> {
        let limits = [
            ("name", &self.name, NAME_MAX_CHARS),
            ("line_1", &self.line_1, LINE_MAX_CHARS),
            ("line_2", &self.line_2, LINE_MAX_CHARS),
            ("city", &self.city, CITY_MAX_CHARS),
            ("postcode", &self.postcode, POSTCODE_MAX_CHARS),
        ];
        for (field, value, max) in limits {
            if value.chars().count() > max {
                return Err(AddressFieldError { field, max });
            }
        }
        Ok(())
    }
}

/// Subset of address fields for a partial update. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    pub name: Option<String>,
    pub line_1: Option<String>,
    pub line_2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<CountryCode>,
}

impl AddressPatch {
    /// Merges the patch over an existing address, producing the full field
    /// set to persist.
    pub fn apply_to(self, current: &Address) -> NewAddress {
        NewAddress {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            line_1: self.line_1.unwrap_or_else(|| current.line_1.clone()),
            line_2: self.line_2.unwrap_or_else(|| current.line_2.clone()),
            city: self.city.unwrap_or_else(|| current.city.clone()),
            postcode: self.postcode.unwrap_or_else(|| current.postcode.clone()),
            country: self.country.unwrap_or_else(|| current.country.clone()),
        }
    }
}

use std::{fmt, str::FromStr};

use crate::errors::QuoteError;

/// Fields that offer suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Currency,
    Country,
    ShippingMethod,
    CompanyName,
}

impl FieldId {
    pub const ALL: [FieldId; 4] = [
        FieldId::Currency,
        FieldId::Country,
        FieldId::ShippingMethod,
        FieldId::CompanyName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Currency => "currency",
            FieldId::Country => "country",
            FieldId::ShippingMethod => "shipping_method",
            FieldId::CompanyName => "company_name",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "company" => return Ok(FieldId::CompanyName),
            "shipping" => return Ok(FieldId::ShippingMethod),
            _ => {}
        }
        FieldId::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| {
                QuoteError::Validation(format!(
                    "`{}` has no suggestions (try currency, country, shipping_method, company_name)",
                    s.trim()
                ))
            })
    }
}

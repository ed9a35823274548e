//! Built-in candidate lists. Order is the display order of suggestions.

pub const CURRENCIES: &[&str] = &[
    "KRW", "USD", "EUR", "JPY", "CNY", "GBP", "HKD", "SGD", "TWD", "AUD", "CAD", "CHF", "SEK",
    "NOK", "DKK", "NZD", "INR", "THB", "VND", "MYR", "IDR", "PHP", "AED", "SAR", "BRL", "MXN",
];

pub const COUNTRIES: &[&str] = &[
    "South Korea",
    "United States",
    "Japan",
    "China",
    "Taiwan",
    "Hong Kong",
    "Singapore",
    "Vietnam",
    "Thailand",
    "Malaysia",
    "Indonesia",
    "Philippines",
    "India",
    "Australia",
    "New Zealand",
    "Canada",
    "Mexico",
    "Brazil",
    "United Kingdom",
    "Germany",
    "France",
    "Netherlands",
    "Belgium",
    "Switzerland",
    "Sweden",
    "Norway",
    "Denmark",
    "Italy",
    "Spain",
    "United Arab Emirates",
    "Saudi Arabia",
];

pub const SHIPPING_METHODS: &[&str] = &[
    "DHL",
    "FedEx",
    "UPS",
    "TNT",
    "EMS",
    "Air Freight",
    "Sea Freight",
    "Courier",
    "Customer Pickup",
];

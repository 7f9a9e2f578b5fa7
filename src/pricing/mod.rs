//! Ride pricing: request schema, rule engine, and the `/get_price` endpoint.

pub mod calculators;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{price_ride, round_money, AppliedRule, FareQuote, PricingRule};
pub use requests::{LocationInput, RideClass, RideRequest, SCHEMA_VERSION};
pub use responses::PriceResponse;
pub use routes::router;
pub use services::quote_ride;

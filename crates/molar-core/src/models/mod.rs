//! Domain models for the molar client.
//!
//! Request parameter structs serialize to query strings or JSON bodies;
//! response structs mirror the shapes the backend returns. Fields the
//! backend may omit carry `#[serde(default)]` so partial payloads parse.

pub mod clinic;
pub mod price;
pub mod review;
pub mod user;

pub use clinic::{
    AspectScores, Clinic, ClinicFilter, ClinicStats, DistrictClinics, DistrictStat, GeoPoint,
    NearbyClinics, SearchPage, SearchParams, SortOrder, TreatmentPrice,
};
pub use price::{
    PriceComparison, PriceFilter, PriceQuote, PriceStats, RegionalPriceStat, RegionalStats,
    TreatmentType,
};
pub use review::{Review, ReviewPage, ReviewQuery, ReviewStatistics};
pub use user::{PasswordChange, ProfileUpdate, Registration, TokenPair, User};

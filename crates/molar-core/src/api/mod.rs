//! REST API module for the molar backend.
//!
//! `Gateway` carries credential injection and the 401 refresh-retry
//! protocol; the typed clients (`ClinicApi`, `ReviewApi`, `PriceApi`)
//! are thin endpoint wrappers routed through it.

pub mod clinics;
pub mod error;
pub mod gateway;
pub mod prices;
pub mod reviews;

pub use clinics::ClinicApi;
pub use error::ApiError;
pub use gateway::Gateway;
pub use prices::PriceApi;
pub use reviews::ReviewApi;

//! Reservation and expiry engine: checkout, expiry, token reissue and the
//! background sweep that cancels abandoned orders.

pub mod checkout;
pub mod error;
pub mod phone;
pub mod policy;
pub mod service;
pub mod sweeper;

pub use checkout::CheckoutRequest;
pub use error::ReservationError;
pub use policy::ExpiryPolicy;
pub use service::ReservationService;
pub use sweeper::ExpirySweeper;

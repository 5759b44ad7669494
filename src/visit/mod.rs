//! Unique-visit counting and device classification
//!
//! A page load is identified by (client IP, user-agent). The first load from
//! an identity inside the dedupe window bumps the ledger counter; repeats only
//! read it back.

pub mod device;
pub mod identity;
pub mod service;

pub use device::is_mobile;
pub use identity::extract_client_identity;
pub use service::VisitService;

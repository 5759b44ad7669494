pub mod visit;

pub use visit::{
    ClientIdentity, LedgerStats, PlatformInfo, VisitCountResponse, VisitErrorResponse,
    VisitOutcome, VisitRecord, COUNTER_ROW_ID, UNKNOWN_CLIENT,
};

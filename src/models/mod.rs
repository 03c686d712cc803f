//! Data models for STRAPT commands and services
//!
//! Value objects, per-user session state and the results returned by services.

pub mod claim;
pub mod duration;
pub mod milestone;
pub mod operation;
pub mod profile;
pub mod session;
pub mod stream;
pub mod token;

pub use claim::{ClaimResult, PendingClaim, ScanResult};
pub use duration::{Duration, DurationUnit};
pub use milestone::{Milestone, MilestoneList};
pub use operation::Operation;
pub use profile::{FaucetResult, ProfilePayload, RegisteredIdentity};
pub use session::{TransferSession, TransferType};
pub use stream::{ReleaseResult, Stream, StreamStatus};
pub use token::TokenRef;

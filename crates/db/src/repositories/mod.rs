//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod feedback_repo;
pub mod qr_token_repo;
pub mod reward_repo;
pub mod sku_repo;

pub use feedback_repo::FeedbackRepo;
pub use qr_token_repo::QrTokenRepo;
pub use reward_repo::RewardRepo;
pub use sku_repo::SkuRepo;

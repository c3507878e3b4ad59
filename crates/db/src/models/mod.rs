//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations the repositories expose

pub mod feedback;
pub mod qr_token;
pub mod reward;
pub mod sku;
pub mod status;

pub mod feedback;
pub mod qr;
pub mod rewards;
pub mod skus;
pub mod webhooks;

pub mod context;
pub mod email;
pub mod export;
pub mod record;

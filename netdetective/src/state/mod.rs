pub mod histogram;
pub mod store;

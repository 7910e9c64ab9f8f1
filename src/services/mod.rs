pub mod advisory;
pub mod catalog;
pub mod group_buy;
pub mod identity;
pub mod market;
pub mod notify;
pub mod orders;
pub mod reviews;

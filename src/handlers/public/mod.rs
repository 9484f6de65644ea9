pub mod businesses;
pub mod photos;
pub mod reviews;
pub mod users;

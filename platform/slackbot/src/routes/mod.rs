pub mod health;
pub mod home;
pub mod price;
pub mod watchlist;

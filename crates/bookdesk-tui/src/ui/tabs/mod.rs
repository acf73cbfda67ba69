pub mod audiobooks;
pub mod authors;
pub mod categories;
pub mod home;
pub mod list;
pub mod statistics;
pub mod users;

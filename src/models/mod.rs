pub mod book;
pub mod library_transaction;

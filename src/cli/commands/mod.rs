pub mod db;
pub mod drinks;
pub mod token;

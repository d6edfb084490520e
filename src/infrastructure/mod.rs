pub mod config;
pub mod credentials;
pub mod db;
pub mod http;
pub mod repositories;

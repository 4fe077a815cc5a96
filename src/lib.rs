pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod scorer;
pub mod service;
pub mod store;

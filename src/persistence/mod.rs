//! Flat-file JSON persistence shared by the cache and the tracker

pub mod json_file;

pub use json_file::{read_json, write_json};

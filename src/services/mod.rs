pub mod local_store;
pub mod memory_store;
pub mod s3_store;
pub mod store;
pub mod upload_service;

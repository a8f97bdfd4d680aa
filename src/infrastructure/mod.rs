pub mod customers;
pub mod in_memory;
pub mod resilience;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

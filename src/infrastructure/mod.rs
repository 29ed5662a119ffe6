pub mod db;
pub mod memory;
pub mod postgrest;
pub mod storage;

mod upload_store_fs;

pub use upload_store_fs::*;

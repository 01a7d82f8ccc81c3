pub mod sanitize;
pub mod storage;

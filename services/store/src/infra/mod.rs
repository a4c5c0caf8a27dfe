pub mod cache;
pub mod db;
pub mod llm;
pub mod password;
pub mod storage;

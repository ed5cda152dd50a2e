pub mod kv;

pub use kv::{DbKvRecord, KvQueries};

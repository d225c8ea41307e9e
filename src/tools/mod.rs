//! 工具层：搜索执行器与结构化输出 Schema

pub mod schema;
pub mod search;

pub use schema::{queries_schema, Queries, QUERIES_SCHEMA_NAME};
pub use search::{search_or_empty, NoopSearch, SearchError, SearchProvider, TavilySearch};

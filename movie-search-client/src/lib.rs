pub mod cache;
mod client;
pub mod deduplication;
mod error;
pub mod pager;
mod session;


pub use cache::{CacheConfig, CacheEntry, CacheStats, EntryStatus, QueryCache};
pub use client::{MovieApi, ProxyClient};
pub use deduplication::{FetchResult, Lookup, SharedFetch};
pub use error::ClientError;
pub use pager::{paginate, total_pages, Page, PageWindow, PAGE_SIZE};
pub use session::{DetailView, SearchSession, SearchView};

// Re-export the data model shared with the proxy
pub use movie_info::{ItemDetail, Rating, SearchResponse, SearchResultItem};

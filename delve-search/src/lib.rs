//! Delve Search - web search capability
//!
//! Talks to the Tavily search API and hands back raw hits; filtering and
//! deduplication happen in the research loop.

mod http;
pub mod tavily;

pub use tavily::{TavilyClient, TavilyConfig};

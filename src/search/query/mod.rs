//! Read path: query the search server and rehydrate hits
//!
//! ```ignore
//! let mut facade = QueryFacade::new(transport, &config);
//! facade.register("Question", questions)?;
//! facade.register("Topic", topics)?;
//!
//! let results = facade.query("rust ownership").await?;
//! for question in results.collection("questions").unwrap_or_default() { .. }
//! ```

mod facade;
mod parsing;
mod results;
mod store;

pub use crate::config::UnknownEntryPolicy;
pub use facade::QueryFacade;
pub use parsing::{RawHit, group_hits, parse_select_response};
pub use results::{SearchResultSet, collection_key};
pub use store::EntityStore;

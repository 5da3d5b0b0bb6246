//! Work statistics collection: enumeration, detail fetching and the
//! snapshot history.

pub mod account;
pub mod detail_source;
pub mod enumerator;
pub mod normalize;
pub mod runner;
pub mod store;
pub mod summary;
pub mod types;

pub use detail_source::{BatchDetailSource, DetailSource, IndividualDetailSource, ThreadPacer};
pub use runner::{run_fetch, FetchContext, RunEvent, RunOutcome, RunReport};
pub use store::{SaveOutcome, SnapshotStore};
pub use summary::summarize;

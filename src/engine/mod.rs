//! The refresh engine: fetching with fallback, alert evaluation, the
//! sort/filter view and the polling timers.

pub mod alerts;
pub mod fetcher;
pub mod scheduler;
pub mod sort;

pub use alerts::{Evaluation, evaluate};
pub use fetcher::{FetchTicket, SnapshotFetcher, apply_category_order};
pub use scheduler::{PollingScheduler, SchedulerEvent};
pub use sort::{Comparator, SortValue, compare_records, sort_and_filter, sort_records};

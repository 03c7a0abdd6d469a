// ── Reactive data store ──
//
// Cached backend state with push-based change notification.

mod data_store;
mod merge;

pub use data_store::DataStore;
pub use merge::MetricsByDevice;
pub(crate) use merge::{group_by_device, merge_latest, merge_metrics};

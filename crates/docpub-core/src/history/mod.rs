//! Publish history
//!
//! One [`PublishRecord`] per (local document, target), persisted in the
//! `publishHistory` section of the state file under the key
//! `"{localPath}:{target}"`.

mod record;
mod store;

pub use record::{PublishRecord, PublishStatus, record_key};
pub use store::{PublishHistory, PublishRecordStore};

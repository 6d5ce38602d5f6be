//! Configuration: publish targets and the path-mapping policy
//!
//! Settings are persisted in the `settings` section of the shared
//! [`StateFile`](crate::state::StateFile). They can also be imported from or
//! exported to a standalone `.toml` / `.json` file.
//!
//! Operations read settings once, at their start; a change made while an
//! operation is in flight does not affect it.

mod settings;
mod store;

pub use settings::{
    FORBIDDEN_CHARACTERS, PathMappingPolicy, Platform, REQUIRED_EXTENSION, Settings, Target,
};
pub use store::SettingsStore;

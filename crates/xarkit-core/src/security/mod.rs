//! Safety checks applied while extracting.

pub mod path;
pub mod permissions;
pub mod quota;
pub mod symlink;

pub use path::validate_entry_name;
pub use permissions::sanitize_mode;
pub use quota::QuotaTracker;
pub use symlink::symlink_resolves_inside;
pub use symlink::symlink_stays_inside;
pub use symlink::verify_no_symlink_ancestors;

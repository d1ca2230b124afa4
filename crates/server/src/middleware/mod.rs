pub mod roles;

pub use roles::{require_admin, require_client, require_staff, require_super_admin};

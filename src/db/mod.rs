pub mod pool;
pub mod profiles;

pub use pool::create_pool;
pub use profiles::{ensure_profile, fetch_profile, ProfileAccess, PROFILE_COLUMNS};

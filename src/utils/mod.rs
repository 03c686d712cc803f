pub mod errors;
pub mod links;
pub mod ratelimit;
pub mod table;

pub use ratelimit::{check_cooldown, check_global_rate_limit, configure_cooldown, get_cooldown_seconds};
pub use table::Table;

pub mod app_state;
pub mod janitor;

pub use app_state::AppState;
pub use janitor::spawn_eviction;

pub mod leaderboard;
pub mod user_profile;
pub mod vocabulary;

pub use leaderboard::*;
pub use user_profile::*;
pub use vocabulary::*;

pub mod admin_service;
pub mod dictionary_service;
pub mod health_service;
pub mod leaderboard_service;
pub mod profile_service;
pub mod quiz_service;
pub mod vocabulary_service;

pub use admin_service::AdminService;
pub use dictionary_service::DictionaryService;
pub use health_service::HealthService;
pub use leaderboard_service::LeaderboardService;
pub use profile_service::ProfileService;
pub use quiz_service::QuizService;
pub use vocabulary_service::VocabularyService;

pub mod document_registry;
pub mod job_poller;
pub mod output_parsing;
pub mod quiz_grading_service;
pub mod session_service;

pub use document_registry::{DocumentRegistry, RemovalOutcome};
pub use job_poller::JobPoller;
pub use quiz_grading_service::QuizGradingService;
pub use session_service::{SessionService, SessionState};

pub mod entry_service;
pub mod user_service;

pub use entry_service::{EntryService, EntryServiceError, EntryValidationError};
pub use user_service::{UserService, UserServiceError};

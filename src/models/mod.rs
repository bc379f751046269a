pub mod entry;
pub mod user;

pub use entry::{
    BalanceResponse, EntryFilter, EntryPayload, EntrySearchParams, EntryStatus, EntryType,
    FinancialEntry, NewEntry, ParseEnumError, StatusPayload,
};
pub use user::{AuthenticateRequest, NewUser, RegisterUserRequest, User, UserResponse};

pub mod entry_handlers;
pub mod user_handlers;

pub use entry_handlers::{
    create_entry_handler, delete_entry_handler, get_entry_handler, search_entries_handler,
    update_entry_handler, update_status_handler,
};
pub use user_handlers::{authenticate_handler, balance_handler, register_handler};

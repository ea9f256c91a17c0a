//! Command handlers, one module per command group.

mod backup;
mod credentials;
mod init;
mod misc;
mod notes;
mod remote;
mod vault;

pub use backup::{handle_export, handle_import};
pub use credentials::handle_credential;
pub use init::handle_init;
pub use misc::handle_completions;
pub use notes::{handle_add, handle_delete, handle_edit, handle_list, handle_show};
pub use remote::{handle_authenticator, handle_respond, handle_unlock_remote};
pub use vault::handle_passwd;

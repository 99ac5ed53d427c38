mod errors;
mod store;
mod types;

pub use errors::SessionError;
pub use store::{SessionStore, get_session_id_from_headers};
pub use types::{SessionUser, StoredSession};

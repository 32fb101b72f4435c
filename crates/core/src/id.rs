//! Document id generation

use uuid::Uuid;

/// Length of generated document ids
pub const ID_LEN: usize = 32;

/// Fresh random document id: a v4 UUID as 32 lowercase hex characters
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

//! Notes: body encryption and the encrypted note collection.

pub mod book;
pub mod cipher;
mod types;

pub use book::NoteBook;
pub use cipher::{decrypt, encrypt, EncryptedBody};
pub use types::{DecryptedNote, Note};

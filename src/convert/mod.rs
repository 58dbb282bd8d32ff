//! Conversion from other phonetic alphabets and from orthography into IPA.

pub mod arpa;
pub mod g2p;
pub mod timit;

pub use arpa::ArpaConverter;
pub use g2p::G2pTable;
pub use timit::TimitConverter;

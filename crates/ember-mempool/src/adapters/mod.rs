pub mod journal;
pub mod state_reader;

pub use journal::TxJournal;
pub use state_reader::TrieAccountReader;

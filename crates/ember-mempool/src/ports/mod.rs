pub mod outbound;

pub use outbound::AccountReader;

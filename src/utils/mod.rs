pub mod consttime;
pub mod serde;

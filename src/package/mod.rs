pub mod cache;
pub mod error;
pub mod git;
pub mod graph;
pub mod index;
pub mod layout;
pub mod manifest;
pub mod resolve;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

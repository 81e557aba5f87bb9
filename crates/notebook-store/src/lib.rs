//! Flat-file persistence for notebook records.
//!
//! Every operation reads the whole backing file, works on the records in
//! memory and, for mutations, writes the whole file back.

mod error;
mod lenient;
mod mapper;
mod repository;

pub use error::{ParseError, Result, StoreError};
pub use lenient::LenientRepository;
pub use mapper::{UserMapper, DELIMITER};
pub use repository::{Repository, UserRepository};

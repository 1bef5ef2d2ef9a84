//! Error types for the arxnote binary.

use thiserror::Error;

use super::*;

/// Error type alias used for the binary.
pub type Result<T> = core::result::Result<T, ArxnotedError>;

/// Errors raised by the command line and terminal front-ends.
#[derive(Error, Debug)]
pub enum ArxnotedError {
  /// Error from the library
  #[error(transparent)]
  Arxnote(#[from] ArxnoteError),

  /// Terminal or file system failure
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Interactive prompt failure
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),
}

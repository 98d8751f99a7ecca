//! Command-line Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("metadata cache error")]
    Cache,
    #[display("could not set up the Steam clients")]
    Steam,
    #[display("export failed")]
    Export,
    #[display("could not write {_0}")]
    Output(#[error(not(source))] String),
    #[display("interrupted")]
    Interrupted,
}

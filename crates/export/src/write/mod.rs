//! One writer per container. Each takes the header and rows and returns the
//! encoded file.

mod delimited;
mod ods;
mod xlsx;

pub(crate) use self::delimited::write_delimited;
pub(crate) use self::ods::write_ods;
pub(crate) use self::xlsx::write_xlsx;

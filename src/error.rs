//! Application errors are `anyhow` errors carrying context. The pure model types have their own
//! `thiserror` enums, which convert into `Error` with `?`.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

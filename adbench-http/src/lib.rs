#![forbid(unsafe_code)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, HttpClient};
pub use error::{Error, HttpTransportErrorKind, Result};
pub use types::{HttpResponse, Target};

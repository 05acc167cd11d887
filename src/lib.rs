//! Client for the MediaWiki action API.
//!
//! A [`Session`] keeps the cookies of one connection, normalizes request
//! parameters, turns `error` responses into [`Error::Api`] and follows
//! `continue` fields as a lazy [`Continuation`] stream.

mod error;
pub use error::{Error, Result, DECODE_EXCERPT_LEN};

#[macro_use]
pub mod params;
pub use params::{Normalized, ParamValue, Params};

pub mod config;
pub use config::{Config, LoginFlow};

pub mod api;
pub use api::{Attachment, Auth, Continuation, ContinueToken, Document, Method, Request, Session};

mod login;
pub use login::*;

pub mod blocking;

pub mod cli;

pub mod logger;

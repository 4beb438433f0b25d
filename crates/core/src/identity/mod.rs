//! GitHub login handling for free-text agreement records.
//!
//! Signers type whatever they like into the sheet: a bare login, an
//! `@mention`, or a profile URL. [`normalize_login`] reduces each of those to
//! a lowercase login, and [`collect_logins`] builds the signer set from a
//! column of cells, discarding anything that is not a valid login.

pub mod normalize;

pub use normalize::{collect_logins, is_valid_login, normalize_login};

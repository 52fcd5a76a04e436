//! Core domain entities.
//!
//! Entities are plain data structures. Records to be inserted have their own
//! `New*` structs; read models used by listings end in `Summary`.
//!
//! - [`ShortLink`] - A short id mapped to an original URL, with its clicks
//! - [`Click`] - One resolution of a short link
//! - [`User`] - A registered account and its session fields

pub mod click;
pub mod link;
pub mod user;

pub use click::{Click, DIRECT_REFERRER, NewClick};
pub use link::{LinkSummary, NewShortLink, OwnedLinkSummary, Resolution, ShortLink};
pub use user::{NewUser, SessionState, User, UserSummary, normalize_email};

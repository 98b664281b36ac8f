#![doc = "site-push-core: core logic library for site-push."]

//! This crate contains the domain logic for notifying a search-engine index of new blog posts.
//! The HTTP client lives in the `site-push` CLI crate; everything here talks to the network
//! only through the [`contract::Pusher`] trait.
//!
//! # Usage
//! Resolve the site URL, load the push history, generate candidates and hand them to a
//! [`contract::Pusher`], or let [`synchronise::synchronise`] drive the whole run.

pub mod contract;
pub mod error;
pub mod generate;
pub mod history;
pub mod response;
pub mod site_url;
pub mod synchronise;

pub use error::SitePushError;

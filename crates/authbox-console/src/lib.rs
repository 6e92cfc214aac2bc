#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Terminal administration console for the Auth Box OAuth2 server.
//!
//! Layout:
//! - `gateway.rs`: HTTP calls and response classification
//! - `context.rs`: per-session state (notices, busy controls, navigation)
//! - `pager.rs`, `confirm.rs`, `busy.rs`, `validate.rs`: list windows,
//!   confirm-before-mutate, submit controls and pre-submit checks
//! - `views/`: one view model per console screen
//! - `cli.rs`, `client.rs`, `commands/`, `output.rs`: the `authbox` binary's
//!   argument parsing, session bootstrap, handlers and renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub mod busy;
pub mod confirm;
pub mod context;
pub mod error;
pub mod gateway;
pub mod notice;
pub mod pager;
pub mod validate;
pub mod views;

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;

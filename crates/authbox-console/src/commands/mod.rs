//! Command handlers grouped by concern. Each drives one or more views and
//! renders what they loaded.

pub(crate) mod accounts;
pub(crate) mod clients;
pub(crate) mod directory;
pub(crate) mod session;
pub(crate) mod tokens;

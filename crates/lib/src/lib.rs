//! Shared library for the Bihua admin console: REST client, auth, config and the UI-agnostic
//! state behind the list, detail and chat views.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod detail;
pub mod i18n;
pub mod layout;
pub mod list;
pub mod model;
pub mod pagination;
pub mod route;

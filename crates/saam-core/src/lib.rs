//! Core saam library (session store, attachments, provider, dispatch).

pub mod attachments;
pub mod config;
pub mod dispatch;
pub mod providers;
pub mod session;

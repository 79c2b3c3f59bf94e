//! Download orchestration for a remote YouTube conversion service.
//!
//! Turns comma separated source URLs into one single or batch request,
//! estimates progress while the service works, and hands the returned
//! payload to a [`application::FileDelivery`].

pub mod api;
pub mod application;
pub mod domain;
pub mod utils;

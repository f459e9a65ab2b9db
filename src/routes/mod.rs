pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod calls;
pub(crate) mod payments;
pub(crate) mod router;
pub(crate) mod wallet;
pub(crate) mod webhook;

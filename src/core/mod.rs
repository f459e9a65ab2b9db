pub(crate) mod airtime;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod paystack;
pub(crate) mod push;
pub(crate) mod state;

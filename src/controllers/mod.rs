pub(crate) mod admin;
pub(crate) mod call;
pub(crate) mod reports;
pub(crate) mod session;
pub(crate) mod user;
pub(crate) mod wallet;

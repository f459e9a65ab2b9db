pub(crate) mod auth;
pub(crate) mod de;
pub(crate) mod extract;
pub(crate) mod params;

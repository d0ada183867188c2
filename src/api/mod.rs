pub(crate) mod attendance;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod progress;
pub(crate) mod reports;
pub(crate) mod router;

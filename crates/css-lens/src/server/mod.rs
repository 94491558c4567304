pub(crate) mod handler;
pub(crate) mod host;
pub(crate) mod lens;
pub(crate) mod settings;
pub(crate) mod state;

pub use state::CssLensServer;

//! Domain values and the lookup workflow shared by the CLI and HTTP server.

pub mod alternatives;
pub mod drug;
pub mod lookup;

// Handlers are split by access tier:
// public (no token) and protected (bearer token + owner check).
pub mod protected;
pub mod public;
pub mod utils;

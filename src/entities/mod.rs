pub mod prelude;
pub mod types;

pub mod api_keys;
pub mod brands;
pub mod briefs;
pub mod creatives;
pub mod portfolios;
pub mod reactions;
pub mod refresh_tokens;
pub mod submissions;
pub mod tags;
pub mod users;

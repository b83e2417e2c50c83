pub use super::api_keys::Entity as ApiKeys;
pub use super::brands::Entity as Brands;
pub use super::briefs::Entity as Briefs;
pub use super::creatives::Entity as Creatives;
pub use super::portfolios::Entity as Portfolios;
pub use super::reactions::Entity as Reactions;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::submissions::Entity as Submissions;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;

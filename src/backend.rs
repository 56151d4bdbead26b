use async_trait::async_trait;

use crate::connection::CursorConnection;
use crate::error::Result;
use crate::profile::Profile;

/// The REST service profiles and their collections are read from.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Base URL every resource URL is built on.
    fn endpoint(&self) -> &str;

    /// `GET {endpoint}/profile/{login}`. Unknown logins are `Profile::NotFound`.
    async fn profile(&self, login: &str) -> Result<Profile>;

    /// `GET {endpoint}/user/{login}/organizations`.
    async fn organizations(&self, login: &str) -> Result<CursorConnection>;

    /// Fetch one page of a collection from a fully built URL.
    async fn page(&self, url: &str) -> Result<CursorConnection>;
}

//! User operations over REST.

use serde_json::Value;
use tracing::info;

use jiralink_core::{JiraUser, JiraUserCreationInfo, JiraUserStatus};

use crate::client::JiraClient;
use crate::error::Result;
use crate::transport::{RestRequest, Transport};

const USER_RESOURCE: &str = "rest/api/2/user";
const USER_SEARCH_RESOURCE: &str = "rest/api/2/user/search";
const MYSELF_RESOURCE: &str = "rest/api/2/myself";

/// Default page size of a user search.
pub const DEFAULT_USER_SEARCH_MAX: u32 = 50;

/// User operations of a [`JiraClient`].
///
/// Users are identified by account id in user privacy mode and by username otherwise.
pub struct UserService<'a, T: Transport> {
    client: &'a JiraClient<T>,
}

impl<'a, T: Transport> UserService<'a, T> {
    pub(crate) const fn new(client: &'a JiraClient<T>) -> Self {
        Self { client }
    }

    /// Create a user.
    ///
    /// # Errors
    /// Returns error if the server rejects the user.
    pub fn create_user(&self, info: &JiraUserCreationInfo) -> Result<JiraUser> {
        let body = serde_json::to_value(info)?;
        let value = self.client.rest(RestRequest::post(USER_RESOURCE, body))?;
        let user = self.client.user_codec().decode_value(value)?;
        info!(username = %info.username, "Created user");
        Ok(user)
    }

    /// Delete a user by username or account id.
    ///
    /// # Errors
    /// Returns error if the user cannot be deleted.
    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.client.rest(self.identified(RestRequest::delete(USER_RESOURCE), id))?;
        info!(user = id, "Deleted user");
        Ok(())
    }

    /// Fetch a user by username or account id.
    ///
    /// # Errors
    /// Returns error if the user cannot be retrieved.
    pub fn get_user(&self, id: &str) -> Result<JiraUser> {
        let value = self.client.rest(self.identified(RestRequest::get(USER_RESOURCE), id))?;
        Ok(self.client.user_codec().decode_value(value)?)
    }

    /// Search users matching `query`.
    ///
    /// # Errors
    /// Returns error if the search fails.
    pub fn search_users(
        &self,
        query: &str,
        status: JiraUserStatus,
        max_results: u32,
        start_at: u32,
    ) -> Result<Vec<JiraUser>> {
        let codec = self.client.user_codec();
        let request = RestRequest::get(USER_SEARCH_RESOURCE)
            .with_query(codec.search_param(), query)
            .with_query("includeActive", status.includes_active().to_string())
            .with_query("includeInactive", status.includes_inactive().to_string())
            .with_query("startAt", start_at.to_string())
            .with_query("maxResults", max_results.to_string());

        let value = self.client.rest(request)?;
        let users = match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| codec.decode_value(item))
                .collect::<jiralink_core::Result<Vec<_>>>()?,
            Value::Null => Vec::new(),
            other => vec![codec.decode_value(other)?],
        };
        Ok(users)
    }

    /// Search active users, first page.
    ///
    /// # Errors
    /// Returns error if the search fails.
    pub fn search_users_default(&self, query: &str) -> Result<Vec<JiraUser>> {
        self.search_users(query, JiraUserStatus::Active, DEFAULT_USER_SEARCH_MAX, 0)
    }

    /// The user the client is authenticated as.
    ///
    /// # Errors
    /// Returns error if the user cannot be retrieved.
    pub fn myself(&self) -> Result<JiraUser> {
        let value = self.client.rest(RestRequest::get(MYSELF_RESOURCE))?;
        Ok(self.client.user_codec().decode_value(value)?)
    }

    fn identified(&self, request: RestRequest, id: &str) -> RestRequest {
        request.with_query(self.client.user_codec().identifier_param(), id)
    }
}

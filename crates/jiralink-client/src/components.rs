//! Project components over REST, cached per project.

use serde_json::Value;
use tracing::{debug, info};

use jiralink_core::{ProjectComponent, ProjectComponentCreationInfo, RemoteComponent};

use crate::client::JiraClient;
use crate::error::{ClientError, Result};
use crate::transport::{RestRequest, Transport};

const COMPONENT_RESOURCE: &str = "rest/api/2/component";

/// Components of one project.
pub struct ProjectComponents<'a, T: Transport> {
    client: &'a JiraClient<T>,
    project: String,
}

impl<'a, T: Transport> ProjectComponents<'a, T> {
    pub(crate) const fn new(client: &'a JiraClient<T>, project: String) -> Self {
        Self { client, project }
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Components of the project, fetched once and then served from the cache.
    ///
    /// # Errors
    /// Returns error if the components cannot be retrieved.
    pub fn get(&self) -> Result<Vec<ProjectComponent>> {
        if let Some(components) = self.client.component_cache.get(&self.project) {
            debug!(project = %self.project, "Components served from cache");
            return Ok(components);
        }

        let resource = format!("rest/api/2/project/{}/components", self.project);
        let value = self.client.rest(RestRequest::get(resource))?;
        let remote: Vec<RemoteComponent> = serde_json::from_value(value)?;

        let entries = remote
            .into_iter()
            .map(ProjectComponent::from)
            .map(|component| (component.id.clone(), component))
            .collect();
        Ok(self.client.component_cache.add_if_missing(&self.project, entries))
    }

    /// Create a component in the project.
    ///
    /// # Errors
    /// Returns error if the server rejects the component.
    pub fn add(&self, info: &ProjectComponentCreationInfo) -> Result<ProjectComponent> {
        let mut body = serde_json::to_value(info)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("project".to_string(), Value::from(self.project.as_str()));
        }

        let value = self.client.rest(RestRequest::post(COMPONENT_RESOURCE, body))?;
        let component = ProjectComponent::from(serde_json::from_value::<RemoteComponent>(value)?);
        self.client
            .component_cache
            .insert(&self.project, component.id.clone(), component.clone());

        info!(project = %self.project, component = %component.name, "Added component");
        Ok(component)
    }

    /// Delete a component by name, ignoring case.
    ///
    /// Issues using it are moved to `move_issues_to` when given.
    ///
    /// # Errors
    /// Returns `ClientError::ComponentNotFound` if the project has no such component.
    pub fn delete(&self, name: &str, move_issues_to: Option<&str>) -> Result<()> {
        let component = self
            .get()?
            .into_iter()
            .find(|component| component.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ClientError::ComponentNotFound {
                project: self.project.clone(),
                name: name.to_string(),
            })?;

        let mut request = RestRequest::delete(format!("{COMPONENT_RESOURCE}/{}", component.id));
        if let Some(target) = move_issues_to.filter(|target| !target.is_empty()) {
            request = request.with_query("moveIssuesTo", target);
        }
        self.client.rest(request)?;
        self.client.component_cache.remove(&self.project, &component.id);

        info!(project = %self.project, component = %component.name, "Deleted component");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::mock::MockTransport;
    use crate::transport::Method;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client() -> JiraClient<MockTransport> {
        let config = ClientConfig::new("https://jira.example.com").with_credentials("user", "pass");
        JiraClient::new(MockTransport::new(), &config).unwrap()
    }

    fn names(components: &[ProjectComponent]) -> Vec<&str> {
        components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_get_fetches_once_then_uses_cache() {
        let client = client();
        client.transport().reply_rest(json!([
            {"id": "1", "name": "Core", "project": "TST"},
            {"id": "2", "name": "UI", "project": "TST"}
        ]));

        let first = client.components("TST").get().unwrap();
        let second = client.components("TST").get().unwrap();

        assert_eq!(names(&first), vec!["Core", "UI"]);
        assert_eq!(second, first);
        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].resource, "rest/api/2/project/TST/components");
    }

    #[test]
    fn test_add_injects_project_and_updates_cache() {
        let client = client();
        client.transport().reply_rest(json!([{"id": "1", "name": "Core"}]));
        client.transport().reply_rest(json!({"id": "3", "name": "Docs", "project": "TST"}));
        let components = client.components("TST");
        components.get().unwrap();

        let added = components
            .add(&ProjectComponentCreationInfo::new("Docs").with_description("Manuals"))
            .unwrap();

        assert_eq!(added.id, "3");
        let request = &client.transport().requests()[1];
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.body,
            Some(json!({"name": "Docs", "description": "Manuals", "project": "TST"}))
        );
        assert_eq!(names(&components.get().unwrap()), vec!["Core", "Docs"]);
    }

    #[test]
    fn test_delete_by_name_ignoring_case() {
        let client = client();
        client.transport().reply_rest(json!([
            {"id": "1", "name": "Core"},
            {"id": "2", "name": "UI"}
        ]));
        client.transport().reply_rest(Value::Null);
        let components = client.components("TST");

        components.delete("core", Some("2")).unwrap();

        let request = &client.transport().requests()[1];
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.resource, "rest/api/2/component/1");
        assert_eq!(request.query_value("moveIssuesTo"), Some("2"));
        assert_eq!(names(&components.get().unwrap()), vec!["UI"]);
    }

    #[test]
    fn test_delete_unknown_component() {
        let client = client();
        client.transport().reply_rest(json!([{"id": "1", "name": "Core"}]));

        let result = client.components("TST").delete("Docs", None);

        assert!(matches!(
            result,
            Err(ClientError::ComponentNotFound { ref name, .. }) if name == "Docs"
        ));
        assert_eq!(client.transport().requests().len(), 1);
    }
}

//! Issue tracker client.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use jiralink_core::{
    CoreError, FieldContext, FieldResolver, Issue, ProjectComponent, RemoteAttachment,
    RemoteField, RemoteFilter, RemoteIssue, UserCodec,
};

use crate::cache::ProjectCache;
use crate::components::ProjectComponents;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::fs::{FileSystem, StdFileSystem};
use crate::http::HttpTransport;
use crate::session::Session;
use crate::transport::{RestRequest, Transport};
use crate::users::UserService;

/// Client for one server and one set of credentials.
///
/// RPC calls run through the [`Session`], which supplies the token and
/// handles re-login. REST requests are authenticated by the transport.
pub struct JiraClient<T: Transport = HttpTransport> {
    transport: T,
    session: Session,
    user_codec: UserCodec,
    max_issues_per_request: u32,
    file_system: Box<dyn FileSystem + Send + Sync>,
    pub(crate) component_cache: ProjectCache<ProjectComponent>,
}

impl JiraClient<HttpTransport> {
    /// Connect to the configured server over HTTP.
    ///
    /// No request is made until the first operation.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        Self::new(HttpTransport::new(config)?, config)
    }
}

impl<T: Transport> JiraClient<T> {
    /// Create a client over the given transport.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid.
    pub fn new(transport: T, config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            transport,
            session: Session::new(config.credentials()?),
            user_codec: UserCodec::new(config.user_privacy),
            max_issues_per_request: config.max_issues_per_request,
            file_system: Box::new(StdFileSystem),
            component_cache: ProjectCache::new(),
        })
    }

    /// Read attachment files through another file system.
    #[must_use]
    pub fn with_file_system(mut self, file_system: impl FileSystem + Send + Sync + 'static) -> Self {
        self.file_system = Box::new(file_system);
        self
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn user_codec(&self) -> UserCodec {
        self.user_codec
    }

    /// Run `operation` with a valid session token.
    ///
    /// # Errors
    /// See [`Session::with_token`].
    pub fn with_token<R, F>(&self, operation: F) -> Result<R>
    where
        F: FnMut(&str) -> Result<R>,
    {
        self.session.with_token(&self.transport, operation)
    }

    /// Invoke a named RPC call and decode its result.
    fn call<R: DeserializeOwned>(&self, operation: &str, params: Vec<Value>) -> Result<R> {
        debug!(operation, "Calling remote");
        self.with_token(|token| {
            let value = self.transport.call(token, operation, params.clone())?;
            Ok(serde_json::from_value(value)?)
        })
    }

    /// Execute a REST request.
    pub(crate) fn rest(&self, request: RestRequest) -> Result<Value> {
        debug!(method = %request.method, resource = %request.resource, "Sending request");
        Ok(self.transport.request(request)?)
    }

    /// Fetch an issue by key.
    ///
    /// # Errors
    /// Returns error if the issue cannot be retrieved.
    pub fn get_issue(&self, key: &str) -> Result<Issue> {
        let remote: RemoteIssue = self.call("getIssue", vec![Value::from(key)])?;
        info!(key, "Fetched issue");
        Ok(Issue::from_remote(remote))
    }

    /// Create an issue on the server and return it as stored.
    ///
    /// # Errors
    /// Returns error if the server rejects the issue.
    pub fn create_issue(&self, issue: &Issue) -> Result<Issue> {
        let remote = serde_json::to_value(issue.to_remote())?;
        let created: RemoteIssue = self.call("createIssue", vec![remote])?;
        let issue = Issue::from_remote(created);
        info!(key = issue.key().map(|k| k.value()), "Created issue");
        Ok(issue)
    }

    /// Send the fields changed since the baseline and return the updated issue.
    ///
    /// With no changes, nothing is sent and a copy of `issue` is returned.
    ///
    /// # Errors
    /// Returns a precondition error if the issue has not been created, or the
    /// remote error if the update fails.
    pub fn update_issue(&self, issue: &Issue) -> Result<Issue> {
        let key = issue.require_key("update issue")?;
        let changes = issue.updated_fields();
        if changes.is_empty() {
            debug!(key, "No changes to send");
            return Ok(issue.clone());
        }

        let fields = changes.len();
        let updated: RemoteIssue =
            self.call("updateIssue", vec![Value::from(key), serde_json::to_value(changes)?])?;
        info!(key, fields, "Updated issue");
        Ok(Issue::from_remote(updated))
    }

    /// Issues matched by one of the user's favourite filters.
    ///
    /// # Errors
    /// Returns `ClientError::FilterNotFound` if no favourite filter has that name.
    pub fn issues_from_filter(&self, name: &str, start: u32, max: u32) -> Result<Vec<Issue>> {
        let filters: Vec<RemoteFilter> = self.call("getFavouriteFilters", Vec::new())?;
        let filter = filters
            .into_iter()
            .find(|filter| filter.name == name)
            .ok_or_else(|| ClientError::FilterNotFound(name.to_string()))?;

        let issues: Vec<RemoteIssue> = self.call(
            "getIssuesFromFilterWithLimit",
            vec![Value::from(filter.id), Value::from(start), Value::from(max)],
        )?;
        info!(filter = name, count = issues.len(), "Fetched issues from filter");
        Ok(issues.into_iter().map(Issue::from_remote).collect())
    }

    /// First page of a favourite filter, sized by `max_issues_per_request`.
    ///
    /// # Errors
    /// See [`JiraClient::issues_from_filter`].
    pub fn issues_from_filter_default(&self, name: &str) -> Result<Vec<Issue>> {
        self.issues_from_filter(name, 0, self.max_issues_per_request)
    }

    /// Attachments of an issue.
    ///
    /// # Errors
    /// Returns a precondition error if the issue has not been created.
    pub fn attachments(&self, issue: &Issue) -> Result<Vec<RemoteAttachment>> {
        let key = issue.require_key("retrieve attachments")?;
        self.call("getAttachmentsFromIssue", vec![Value::from(key)])
    }

    /// Upload files as attachments of an issue.
    ///
    /// # Errors
    /// Returns a precondition error if the issue has not been created, or an
    /// IO error if a file cannot be read.
    pub fn upload_attachments<P: AsRef<Path>>(&self, issue: &Issue, paths: &[P]) -> Result<()> {
        let key = issue.require_key("upload attachments")?;
        if paths.is_empty() {
            debug!(key, "No attachments to upload");
            return Ok(());
        }

        let mut names = Vec::with_capacity(paths.len());
        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let bytes = self.file_system.read(path)?;
            let name = path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
            names.push(Value::from(name.into_owned()));
            contents.push(Value::from(STANDARD.encode(bytes)));
        }

        let count = names.len();
        let _: Value = self.call(
            "addBase64EncodedAttachmentsToIssue",
            vec![Value::from(key), Value::Array(names), Value::Array(contents)],
        )?;
        info!(key, count, "Uploaded attachments");
        Ok(())
    }

    /// Fields that can be set when editing an issue.
    ///
    /// # Errors
    /// Returns a precondition error if the issue has not been created.
    pub fn fields_for_edit(&self, issue: &Issue) -> Result<Vec<RemoteField>> {
        let key = issue.require_key("retrieve fields for edit")?;
        self.call("getFieldsForEdit", vec![Value::from(key)])
    }

    /// Fields that can be set by a workflow action on an issue.
    ///
    /// # Errors
    /// Returns a precondition error if the issue has not been created.
    pub fn fields_for_action(&self, issue: &Issue, action_id: &str) -> Result<Vec<RemoteField>> {
        let key = issue.require_key("retrieve fields for action")?;
        self.call("getFieldsForAction", vec![Value::from(key), Value::from(action_id)])
    }

    /// Resolver for custom field names on an issue.
    #[must_use]
    pub fn field_resolver(&self, issue: &Issue) -> IssueFieldResolver<'_, T> {
        IssueFieldResolver {
            client: self,
            key: issue.key().map(|key| key.value().to_string()),
        }
    }

    /// User operations.
    #[must_use]
    pub const fn users(&self) -> UserService<'_, T> {
        UserService::new(self)
    }

    /// Component operations for a project.
    #[must_use]
    pub fn components(&self, project: impl Into<String>) -> ProjectComponents<'_, T> {
        ProjectComponents::new(self, project.into())
    }
}

/// Resolves custom field names against the fields the server offers for an issue.
pub struct IssueFieldResolver<'a, T: Transport> {
    client: &'a JiraClient<T>,
    key: Option<String>,
}

impl<T: Transport> FieldResolver for IssueFieldResolver<'_, T> {
    type Error = ClientError;

    fn available_fields(&self, context: &FieldContext) -> Result<Vec<RemoteField>> {
        let Some(key) = &self.key else {
            return Err(CoreError::Precondition(
                "unable to retrieve custom fields: issue has not been created".to_string(),
            )
            .into());
        };

        match context {
            FieldContext::Edit => self.client.call("getFieldsForEdit", vec![Value::from(key.as_str())]),
            FieldContext::Action(action_id) => self.client.call(
                "getFieldsForAction",
                vec![Value::from(key.as_str()), Value::from(action_id.as_str())],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::RemoteFault;
    use crate::mock::MockTransport;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    fn config() -> ClientConfig {
        ClientConfig::new("https://jira.example.com").with_credentials("user", "pass")
    }

    fn client(transport: MockTransport) -> JiraClient<MockTransport> {
        JiraClient::new(transport, &config()).unwrap()
    }

    fn remote_issue(key: &str) -> Value {
        json!({
            "key": key,
            "summary": "Crash on save",
            "project": "TST",
            "type": "1",
            "priority": "High",
            "duedate": "2011-10-10T00:00:00Z"
        })
    }

    fn auth_fault() -> RemoteFault {
        RemoteFault::classified(
            None,
            "com.atlassian.jira.rpc.exception.RemoteAuthenticationException: Invalid username or password.",
        )
    }

    struct MemoryFileSystem(HashMap<PathBuf, Vec<u8>>);

    impl FileSystem for MemoryFileSystem {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
        }
    }

    #[test]
    fn test_get_issue_logs_in_once_and_hydrates() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        transport.reply("getIssue", remote_issue("TST-2"));
        let client = client(transport);

        let first = client.get_issue("TST-1").unwrap();
        let second = client.get_issue("TST-2").unwrap();

        assert_eq!(first.key().unwrap().value(), "TST-1");
        assert_eq!(second.key().unwrap().value(), "TST-2");
        assert!(first.updated_fields().is_empty());
        assert_eq!(client.transport().login_count(), 1);

        let calls = client.transport().calls();
        assert_eq!(calls[0].token, "token");
        assert_eq!(calls[0].params, vec![json!("TST-1")]);
    }

    #[test]
    fn test_rejected_token_is_replaced_and_call_retried() {
        let transport = MockTransport::new().with_logins(&["token1", "token2"]);
        transport.fail("getIssue", auth_fault());
        transport.reply("getIssue", remote_issue("TST-1"));
        let client = client(transport);

        let issue = client.get_issue("TST-1").unwrap();

        assert_eq!(issue.key().unwrap().value(), "TST-1");
        let tokens: Vec<String> = client.transport().calls().into_iter().map(|c| c.token).collect();
        assert_eq!(tokens, vec!["token1", "token2"]);
        assert_eq!(client.session().cached_token().as_deref(), Some("token2"));
    }

    #[test]
    fn test_repeated_auth_fault_is_fatal() {
        let transport = MockTransport::new().with_logins(&["token1", "token2"]);
        transport.fail("getIssue", auth_fault());
        transport.fail("getIssue", auth_fault());
        let client = client(transport);

        let result = client.get_issue("TST-1");

        assert!(matches!(result, Err(ClientError::FatalAuth(_))));
        assert_eq!(client.transport().login_count(), 2);
    }

    #[test]
    fn test_anonymous_client_never_logs_in() {
        let transport = MockTransport::new();
        transport.reply("getIssue", remote_issue("TST-1"));
        let client = JiraClient::new(transport, &ClientConfig::new("https://jira.example.com")).unwrap();

        client.get_issue("TST-1").unwrap();

        assert_eq!(client.transport().login_count(), 0);
        assert_eq!(client.transport().calls()[0].token, "");
    }

    #[test]
    fn test_update_sends_only_changed_fields() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        transport.reply("updateIssue", remote_issue("TST-1"));
        let client = client(transport);

        let mut issue = client.get_issue("TST-1").unwrap();
        issue.fields.summary = Some("Crash on load".to_string());
        issue.fields.due_date = Some(Utc.with_ymd_and_hms(2011, 11, 11, 0, 0, 0).unwrap().fixed_offset());
        client.update_issue(&issue).unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls[1].operation, "updateIssue");
        assert_eq!(
            calls[1].params,
            vec![
                json!("TST-1"),
                json!([
                    {"id": "summary", "values": ["Crash on load"]},
                    {"id": "duedate", "values": ["11/Nov/11"]}
                ])
            ]
        );
    }

    #[test]
    fn test_update_without_changes_makes_no_call() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        let client = client(transport);

        let issue = client.get_issue("TST-1").unwrap();
        let unchanged = client.update_issue(&issue).unwrap();

        assert_eq!(unchanged, issue);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[test]
    fn test_issue_scoped_calls_require_created_issue() {
        let client = client(MockTransport::new());
        let issue = Issue::in_project("TST", "1", "New");

        assert!(client.update_issue(&issue).unwrap_err().is_precondition());
        assert!(client.attachments(&issue).unwrap_err().is_precondition());
        assert!(client.upload_attachments(&issue, &["a.txt"]).unwrap_err().is_precondition());
        assert!(client.fields_for_edit(&issue).unwrap_err().is_precondition());
        assert!(client.fields_for_action(&issue, "5").unwrap_err().is_precondition());
        assert!(client.transport().calls().is_empty());
        assert_eq!(client.transport().login_count(), 0);
    }

    #[test]
    fn test_create_issue_sends_editable_fields() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("createIssue", remote_issue("TST-9"));
        let client = client(transport);

        let issue = Issue::in_project("TST", "1", "Crash on save");
        let created = client.create_issue(&issue).unwrap();

        assert_eq!(created.key().unwrap().value(), "TST-9");
        let params = &client.transport().calls()[0].params;
        assert_eq!(params[0]["project"], json!("TST"));
        assert_eq!(params[0]["summary"], json!("Crash on save"));
    }

    #[test]
    fn test_issues_from_filter_uses_filter_id_and_window() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getFavouriteFilters", json!([{"id": "123", "name": "thefilter"}]));
        transport.reply("getIssuesFromFilterWithLimit", json!([remote_issue("TST-1")]));
        let client = client(transport);

        let issues = client.issues_from_filter("thefilter", 100, 200).unwrap();

        assert_eq!(issues.len(), 1);
        let calls = client.transport().calls();
        assert_eq!(calls[1].params, vec![json!("123"), json!(100), json!(200)]);
    }

    #[test]
    fn test_issues_from_filter_default_window() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getFavouriteFilters", json!([{"id": "123", "name": "thefilter"}]));
        transport.reply("getIssuesFromFilterWithLimit", json!([]));
        let client = client(transport);

        client.issues_from_filter_default("thefilter").unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls[1].params, vec![json!("123"), json!(0), json!(20)]);
    }

    #[test]
    fn test_issues_from_unknown_filter() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getFavouriteFilters", json!([]));
        let client = client(transport);

        let result = client.issues_from_filter_default("foo");

        assert!(matches!(result, Err(ClientError::FilterNotFound(name)) if name == "foo"));
    }

    #[test]
    fn test_upload_attachments_base64_encodes_contents() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        transport.reply("addBase64EncodedAttachmentsToIssue", json!(true));
        let files = HashMap::from([(PathBuf::from("/tmp/foo.txt"), vec![1u8, 2, 3])]);
        let client = client(transport).with_file_system(MemoryFileSystem(files));

        let issue = client.get_issue("TST-1").unwrap();
        client.upload_attachments(&issue, &["/tmp/foo.txt"]).unwrap();

        let calls = client.transport().calls();
        assert_eq!(
            calls[1].params,
            vec![json!("TST-1"), json!(["foo.txt"]), json!(["AQID"])]
        );
    }

    #[test]
    fn test_upload_without_paths_skips_remote_call() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        let client = client(transport);

        let issue = client.get_issue("TST-1").unwrap();
        client.upload_attachments(&issue, &[] as &[PathBuf]).unwrap();

        let operations: Vec<String> = client
            .transport()
            .calls()
            .into_iter()
            .map(|c| c.operation)
            .collect();
        assert_eq!(operations, vec!["getIssue"]);
    }

    #[test]
    fn test_custom_fields_resolve_through_edit_and_action_fields() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.reply("getIssue", remote_issue("TST-1"));
        transport.reply("getFieldsForEdit", json!([{"id": "customfield_10000", "name": "Custom Field"}]));
        transport.reply("getFieldsForAction", json!([{"id": "customfield_20000", "name": "Action Field"}]));
        let client = client(transport);

        let mut issue = client.get_issue("TST-1").unwrap();
        let resolver = client.field_resolver(&issue);
        issue.custom_fields.add(&resolver, "custom field", "foo").unwrap();
        issue
            .custom_fields
            .for_action("5")
            .add(&resolver, "Action Field", "bar")
            .unwrap();

        let ids: Vec<String> = issue.updated_fields().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["customfield_10000", "customfield_20000"]);

        let calls = client.transport().calls();
        assert_eq!(calls[2].params, vec![json!("TST-1"), json!("5")]);
    }

    #[test]
    fn test_remote_operation_fault_is_returned() {
        let transport = MockTransport::new().with_logins(&["token"]);
        transport.fail("getIssue", RemoteFault::operation("Issue Does Not Exist"));
        let client = client(transport);

        let err = client.get_issue("TST-404").unwrap_err();

        assert!(matches!(err, ClientError::Fault(ref f) if !f.is_auth()));
        assert_eq!(client.session().cached_token().as_deref(), Some("token"));
    }
}

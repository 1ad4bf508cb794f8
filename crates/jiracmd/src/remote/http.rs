//! HTTP backend speaking the JIRA REST v2 API.
//!
//! One blocking `ureq` agent is created per session and carries the basic
//! authentication header on every request, including attachment uploads.
//! Each call reads its response body to the end before returning, so no
//! connection outlives the call that opened it.

use crate::config::JiraConfig;
use crate::domain::{
    Component, Filter, Issue, IssueLink, IssueType, LinkDirection, NewIssue, Project,
    SearchResult, Status, Transition, TransitionId,
};
use crate::errors::{ErrorCollection, JiraError, Result};
use crate::remote::IssueService;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use ureq::http::Response;
use ureq::unversioned::multipart::{Form, Part};
use ureq::{Agent, Body};

const API: &str = "/rest/api/2";

/// Fields requested for issues returned by search.
const SEARCH_FIELDS: &str = "summary,description,status,issuelinks";

/// JIRA REST client implementing [`IssueService`].
pub struct HttpIssueService {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl HttpIssueService {
    /// Build a client from validated configuration.
    pub fn new(config: &JiraConfig) -> Self {
        Self::with_credentials(
            &config.url,
            &config.username,
            &config.password,
            config.timeout,
        )
    }

    pub fn with_credentials(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let credentials = STANDARD.encode(format!("{}:{}", username, password));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", credentials),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API, path)
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response<Body>> {
        debug!(method = "GET", %url, "remote call");
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", self.auth_header.as_str())
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        request.call().map_err(|e| transport(url, e))
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response<Body>> {
        debug!(method = "POST", %url, "remote call");
        self.agent
            .post(url)
            .header("Authorization", self.auth_header.as_str())
            .header("Accept", "application/json")
            .send_json(body)
            .map_err(|e| transport(url, e))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        let response = self.get(&url, query)?;
        decode(&url, response)
    }
}

impl IssueService for HttpIssueService {
    fn get_project(&self, key: &str) -> Result<Project> {
        let url = self.url(&format!("/project/{}", key));
        let response = self.get(&url, &[])?;
        if response.status().as_u16() == 404 {
            return Err(JiraError::ProjectNotFound {
                key: key.to_string(),
            });
        }
        let project: ProjectJson = decode(&url, response)?;
        Ok(project.into())
    }

    fn get_all_projects(&self) -> Result<Vec<Project>> {
        let projects: Vec<ProjectJson> = self.get_json("/project", &[])?;
        Ok(projects.into_iter().map(Project::from).collect())
    }

    fn get_issue(&self, key: &str) -> Result<Issue> {
        let issue: IssueJson = self.get_json(&format!("/issue/{}", key), &[])?;
        Ok(issue.into())
    }

    fn search(&self, jql: &str) -> Result<SearchResult> {
        let result: SearchJson =
            self.get_json("/search", &[("jql", jql), ("fields", SEARCH_FIELDS)])?;
        Ok(SearchResult {
            total: result.total,
            issues: result.issues.into_iter().map(Issue::from).collect(),
        })
    }

    fn get_filter(&self, id: u64) -> Result<Filter> {
        let url = self.url(&format!("/filter/{}", id));
        let filter: FilterJson = decode(&url, self.get(&url, &[])?)?;
        Ok(Filter {
            id: parse_id(&url, &filter.id)?,
            name: filter.name,
            jql: filter.jql,
        })
    }

    fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let url = self.url(&format!("/issue/{}/transitions", issue_key));
        let listing: TransitionsJson = decode(&url, self.get(&url, &[])?)?;
        listing
            .transitions
            .into_iter()
            .map(|t| {
                Ok(Transition {
                    id: parse_id(&url, &t.id)?,
                    name: t.name,
                    to: t.to.map(|s| Status::new(s.id, s.name)),
                })
            })
            .collect()
    }

    fn apply_transition(&self, issue_key: &str, transition_id: TransitionId) -> Result<()> {
        let url = self.url(&format!("/issue/{}/transitions", issue_key));
        let body = json!({ "transition": { "id": transition_id.to_string() } });
        ensure_success(self.post_json(&url, &body)?)
    }

    fn create_issue(&self, input: &NewIssue) -> Result<String> {
        let url = self.url("/issue");
        let body = json!({
            "fields": {
                "project": { "key": input.project_key },
                "issuetype": { "id": input.issue_type_id },
                "components": [ { "id": input.component_id } ],
                "summary": input.summary,
                "description": input.description,
            }
        });
        let created: CreatedJson = decode(&url, self.post_json(&url, &body)?)?;
        Ok(created.key)
    }

    fn create_link(&self, source_key: &str, target_key: &str, link_type: &str) -> Result<()> {
        let url = self.url("/issueLink");
        let body = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": source_key },
            "outwardIssue": { "key": target_key },
        });
        ensure_success(self.post_json(&url, &body)?)
    }

    fn get_link_types(&self) -> Result<Vec<String>> {
        let listing: LinkTypesJson = self.get_json("/issueLinkType", &[])?;
        Ok(listing
            .issue_link_types
            .into_iter()
            .map(|t| t.name)
            .collect())
    }

    fn upload_attachment(&self, issue_key: &str, file: &Path) -> Result<()> {
        let url = self.url(&format!("/issue/{}/attachments", issue_key));
        let file_name = attachment_file_name(file);
        let part = Part::file(file)
            .map_err(|source| JiraError::Io {
                path: file.to_path_buf(),
                source,
            })?
            .file_name(&file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| transport(&url, e))?;
        let form = Form::new().part("file", part);

        debug!(method = "POST", %url, file = %file_name, "attachment upload");
        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth_header.as_str())
            .header("X-Atlassian-Token", "nocheck")
            .send(form)
            .map_err(|e| transport(&url, e))?;
        ensure_success(response)
    }
}

/// File name announced in the upload's `Content-Disposition`. Quotes and
/// control characters cannot appear inside the quoted header value.
fn attachment_file_name(file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

fn transport(url: &str, error: ureq::Error) -> JiraError {
    JiraError::Transport {
        url: url.to_string(),
        message: error.to_string(),
    }
}

fn is_success(response: &Response<Body>) -> bool {
    response.status().is_success()
}

fn ensure_success(response: Response<Body>) -> Result<()> {
    if is_success(&response) {
        Ok(())
    } else {
        Err(remote_error(response))
    }
}

fn decode<T: DeserializeOwned>(url: &str, mut response: Response<Body>) -> Result<T> {
    if !is_success(&response) {
        return Err(remote_error(response));
    }
    response
        .body_mut()
        .read_json::<T>()
        .map_err(|e| JiraError::UnexpectedResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
}

/// Convert a non-2xx response into a remote error carrying its status and
/// every message of the JIRA error body. Bodies that are not JIRA error JSON
/// are kept verbatim.
fn remote_error(mut response: Response<Body>) -> JiraError {
    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();

    let mut collection = serde_json::from_str::<ErrorCollection>(&text)
        .ok()
        .filter(|c| !c.messages().is_empty())
        .unwrap_or_else(|| {
            let message = match text.trim() {
                "" => format!("HTTP {}", status),
                body => body.to_string(),
            };
            ErrorCollection::new(status, message)
        });
    collection.status = Some(status);
    JiraError::Remote(collection.into())
}

fn parse_id(url: &str, id: &str) -> Result<u64> {
    id.parse().map_err(|_| JiraError::UnexpectedResponse {
        url: url.to_string(),
        message: format!("non-numeric id '{}'", id),
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct NamedJson {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectJson {
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "issueTypes")]
    issue_types: Vec<NamedJson>,
    #[serde(default)]
    components: Vec<NamedJson>,
}

impl From<ProjectJson> for Project {
    fn from(json: ProjectJson) -> Self {
        Project {
            key: json.key,
            name: json.name,
            issue_types: json
                .issue_types
                .into_iter()
                .map(|t| IssueType {
                    id: t.id,
                    name: t.name,
                })
                .collect(),
            components: json
                .components
                .into_iter()
                .map(|c| Component {
                    id: c.id,
                    name: c.name,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeyJson {
    key: String,
}

#[derive(Debug, Deserialize)]
struct LinkTypeJson {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueLinkJson {
    #[serde(rename = "type")]
    link_type: LinkTypeJson,
    #[serde(rename = "outwardIssue")]
    outward_issue: Option<KeyJson>,
    #[serde(rename = "inwardIssue")]
    inward_issue: Option<KeyJson>,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFieldsJson {
    summary: Option<String>,
    description: Option<String>,
    status: Option<NamedJson>,
    #[serde(default)]
    issuelinks: Vec<IssueLinkJson>,
}

#[derive(Debug, Deserialize)]
struct IssueJson {
    key: String,
    #[serde(default)]
    fields: IssueFieldsJson,
}

impl From<IssueJson> for Issue {
    fn from(json: IssueJson) -> Self {
        let fields = json.fields;
        let links = fields
            .issuelinks
            .into_iter()
            .filter_map(|link| {
                let name = link.link_type.name;
                match (link.outward_issue, link.inward_issue) {
                    (Some(out), _) => Some(IssueLink {
                        target_key: out.key,
                        link_type: name,
                        direction: LinkDirection::Outbound,
                    }),
                    (None, Some(inward)) => Some(IssueLink {
                        target_key: inward.key,
                        link_type: name,
                        direction: LinkDirection::Inbound,
                    }),
                    (None, None) => None,
                }
            })
            .collect();

        Issue {
            key: json.key,
            summary: fields.summary.unwrap_or_default(),
            description: fields.description,
            status: fields
                .status
                .map(|s| Status::new(s.id, s.name))
                .unwrap_or_else(|| Status::new("", "Unknown")),
            links,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchJson {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    issues: Vec<IssueJson>,
}

#[derive(Debug, Deserialize)]
struct FilterJson {
    id: String,
    #[serde(default)]
    name: String,
    jql: String,
}

#[derive(Debug, Deserialize)]
struct TransitionJson {
    id: String,
    name: String,
    to: Option<NamedJson>,
}

#[derive(Debug, Deserialize)]
struct TransitionsJson {
    #[serde(default)]
    transitions: Vec<TransitionJson>,
}

#[derive(Debug, Deserialize)]
struct CreatedJson {
    key: String,
}

#[derive(Debug, Deserialize)]
struct LinkTypesJson {
    #[serde(default, rename = "issueLinkTypes")]
    issue_link_types: Vec<LinkTypeJson>,
}

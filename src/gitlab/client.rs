//! [`GitLabApi`] over the GitLab REST API v4, using a blocking `ureq` agent.
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use ureq::Agent;
use url::Url;

use super::{ApiError, Branch, GitLabApi, Group, PER_PAGE, Page, Project, ProtectedBranch};
use crate::config::branches::AccessLevel;
use crate::config::settings::{ApprovalSettings, GeneralSettings};

/// Upper bound for one request, connect to last body byte.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// Blocking GitLab API client authenticated with a private token.
pub struct HttpClient {
    agent: Agent,
    api_root: Url,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_root", &self.api_root.as_str())
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// A successful response plus the pagination headers that came with it.
#[derive(Debug, PartialEq, Eq)]
struct Reply {
    body: String,
    total_pages: Option<u32>,
    next_page: Option<u32>,
}

/// A completed HTTP exchange, before any status handling.
#[derive(Debug)]
struct RawResponse {
    status: u16,
    total_pages: Option<String>,
    next_page: Option<String>,
    body: String,
}

/// Map a completed response onto the transport contract: 404 is
/// [`ApiError::NotFound`], any other non-2xx is [`ApiError::Status`] carrying
/// the body, and pagination headers that are absent, empty or not numbers
/// become `None`.
fn interpret(endpoint: &str, raw: RawResponse) -> Result<Reply, ApiError> {
    match raw.status {
        404 => Err(ApiError::NotFound {
            endpoint: endpoint.to_string(),
        }),
        200..=299 => Ok(Reply {
            total_pages: page_header(raw.total_pages.as_deref()),
            next_page: page_header(raw.next_page.as_deref()),
            body: raw.body,
        }),
        status => Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            message: raw.body.trim().to_string(),
        }),
    }
}

/// GitLab sends `X-Next-Page: ` (empty) on the last page.
fn page_header(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

impl HttpClient {
    /// Create a client for `endpoint` (e.g. `https://gitlab.example.com`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if `endpoint` is not a URL.
    pub fn new(endpoint: &str, token: &str) -> Result<Self, ApiError> {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Ok(Self {
            agent: Agent::new_with_config(config),
            api_root: api_root(endpoint)?,
            token: token.to_string(),
        })
    }

    fn url(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .api_root
            .join(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<Reply, ApiError> {
        let url = self.url(endpoint, query)?;
        let uri = url.as_str();

        let payload = body.unwrap_or_default();
        let result = match method {
            Method::Get => self
                .agent
                .get(uri)
                .header(TOKEN_HEADER, self.token.as_str())
                .call(),
            Method::Delete => self
                .agent
                .delete(uri)
                .header(TOKEN_HEADER, self.token.as_str())
                .call(),
            Method::Post => self
                .agent
                .post(uri)
                .header(TOKEN_HEADER, self.token.as_str())
                .header("Content-Type", "application/json")
                .send(payload.as_str()),
            Method::Put => self
                .agent
                .put(uri)
                .header(TOKEN_HEADER, self.token.as_str())
                .header("Content-Type", "application/json")
                .send(payload.as_str()),
        };

        let mut response = result.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        tracing::debug!(target: "gitlab_enforcer::http", status, "{method} {endpoint}");
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let total_pages = header("x-total-pages");
        let next_page = header("x-next-page");

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        interpret(
            endpoint,
            RawResponse {
                status,
                total_pages,
                next_page,
                body,
            },
        )
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let reply = self.execute(Method::Get, endpoint, &[], None)?;
        decode(endpoint, &reply.body)
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        page: u32,
        extra: &[(&str, String)],
    ) -> Result<Page<T>, ApiError> {
        let mut query = vec![
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        query.extend(extra.iter().cloned());
        let reply = self.execute(Method::Get, endpoint, &query, None)?;
        Ok(Page {
            items: decode(endpoint, &reply.body)?,
            page,
            total_pages: reply.total_pages,
            next_page: reply.next_page,
        })
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let reply = self.execute(method, endpoint, &[], Some(body.to_string()))?;
        decode(endpoint, &reply.body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn to_json<T: serde::Serialize>(endpoint: &str, value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|source| ApiError::Encode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Build the API root (`<endpoint>/api/v4/`) from a configured endpoint.
fn api_root(endpoint: &str) -> Result<Url, ApiError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let root = if trimmed.ends_with("/api/v4") {
        format!("{trimmed}/")
    } else {
        format!("{trimmed}/api/v4/")
    };
    Url::parse(&root).map_err(|e| ApiError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// Percent-encode one path segment (slashes included).
fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Encode a group path for lookup. Dots are escaped too: some GitLab
/// versions treat a trailing `.xyz` as a response format and 404.
fn encode_group_key(name: &str) -> String {
    encode_segment(name).replace('.', "%2E")
}

#[derive(Deserialize)]
struct RawAccess {
    access_level: u32,
}

#[derive(Deserialize)]
struct RawProtectedBranch {
    name: String,
    #[serde(default)]
    push_access_levels: Vec<RawAccess>,
    #[serde(default)]
    merge_access_levels: Vec<RawAccess>,
}

/// Collapse GitLab's access-level lists into the single level we configure.
fn strongest(levels: &[RawAccess]) -> AccessLevel {
    let max = levels.iter().map(|l| l.access_level).max().unwrap_or(0);
    if max >= AccessLevel::Maintainer.value() {
        AccessLevel::Maintainer
    } else if max >= AccessLevel::Developer.value() {
        AccessLevel::Developer
    } else {
        AccessLevel::None
    }
}

impl GitLabApi for HttpClient {
    fn get_group(&self, name: &str) -> Result<Group, ApiError> {
        let endpoint = format!("groups/{}", encode_group_key(name));
        let reply = self.execute(
            Method::Get,
            &endpoint,
            &[("with_projects", "false".to_string())],
            None,
        )?;
        decode(&endpoint, &reply.body)
    }

    fn list_subgroups(&self, group_id: u64, page: u32) -> Result<Page<Group>, ApiError> {
        self.get_page(&format!("groups/{group_id}/subgroups"), page, &[])
    }

    fn list_group_projects(
        &self,
        group_id: u64,
        page: u32,
        include_subgroups: bool,
    ) -> Result<Page<Project>, ApiError> {
        self.get_page(
            &format!("groups/{group_id}/projects"),
            page,
            &[("include_subgroups", include_subgroups.to_string())],
        )
    }

    fn get_project(&self, project_id: u64) -> Result<GeneralSettings, ApiError> {
        self.get(&format!("projects/{project_id}"))
    }

    fn edit_project(
        &self,
        project_id: u64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings, ApiError> {
        let endpoint = format!("projects/{project_id}");
        let body = to_json(&endpoint, settings)?;
        self.send(Method::Put, &endpoint, &body)
    }

    fn get_approval_configuration(&self, project_id: u64) -> Result<ApprovalSettings, ApiError> {
        self.get(&format!("projects/{project_id}/approvals"))
    }

    fn change_approval_configuration(
        &self,
        project_id: u64,
        settings: &ApprovalSettings,
    ) -> Result<ApprovalSettings, ApiError> {
        let endpoint = format!("projects/{project_id}/approvals");
        let body = to_json(&endpoint, settings)?;
        self.send(Method::Post, &endpoint, &body)
    }

    fn get_branch(&self, project_id: u64, name: &str) -> Result<Branch, ApiError> {
        self.get(&format!(
            "projects/{project_id}/repository/branches/{}",
            encode_segment(name)
        ))
    }

    fn create_branch(
        &self,
        project_id: u64,
        name: &str,
        git_ref: &str,
    ) -> Result<Branch, ApiError> {
        let body = serde_json::json!({ "branch": name, "ref": git_ref });
        self.send(
            Method::Post,
            &format!("projects/{project_id}/repository/branches"),
            &body,
        )
    }

    fn protect_branch(
        &self,
        project_id: u64,
        name: &str,
        push: AccessLevel,
        merge: AccessLevel,
    ) -> Result<ProtectedBranch, ApiError> {
        let body = serde_json::json!({
            "name": name,
            "push_access_level": push.value(),
            "merge_access_level": merge.value(),
        });
        let raw: RawProtectedBranch = self.send(
            Method::Post,
            &format!("projects/{project_id}/protected_branches"),
            &body,
        )?;
        Ok(ProtectedBranch {
            push_access_level: strongest(&raw.push_access_levels),
            merge_access_level: strongest(&raw.merge_access_levels),
            name: raw.name,
        })
    }

    fn unprotect_branch(&self, project_id: u64, name: &str) -> Result<(), ApiError> {
        self.execute(
            Method::Delete,
            &format!(
                "projects/{project_id}/protected_branches/{}",
                encode_segment(name)
            ),
            &[],
            None,
        )
        .map(|_| ())
    }
}

//! GitLab v4 REST implementation of `ChangesClient`
//!
//! `ureq` is blocking, so every request runs on tokio's blocking pool.

use crate::client::ChangesClient;
use crate::types::{Commit, CompareResult};
use anyhow::Context;
use async_trait::async_trait;
use diff_tree::RawChange;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use ureq::http::Response;
use ureq::{Agent, Body};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PER_PAGE: usize = 100;
/// Upper bound on pages fetched for one listing
const MAX_PAGES: usize = 20;

/// Direct GitLab API client
#[derive(Debug, Clone)]
pub struct GitLabClient {
    /// Web root of the host, e.g. `https://gitlab.com`
    base_url: Url,
    token: Option<String>,
    agent: Agent,
}

/// Body of the web `diff_for_path` endpoint
#[derive(Debug, Deserialize)]
struct DiffHtmlResponse {
    html: String,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid host URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Host URL '{}' cannot carry a path", base_url);
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Ok(Self {
            base_url,
            token,
            agent,
        })
    }

    /// Host URL extended by `segments`, each percent-encoded as one segment
    fn url_with_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    /// REST endpoint of a project; the project path is a single encoded segment
    fn api_url(&self, project: &str, endpoint: &[&str]) -> String {
        self.url_with_segments(
            ["api", "v4", "projects", project]
                .into_iter()
                .chain(endpoint.iter().copied()),
        )
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> anyhow::Result<Response<Body>> {
        debug!("GET {} {:?}", url, query);

        let mut request = self.agent.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("PRIVATE-TOKEN", token.as_str());
        }
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        request
            .call()
            .with_context(|| format!("HTTP request failed for {}", url))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> anyhow::Result<T> {
        self.get(url, query)?
            .into_body()
            .read_json::<T>()
            .with_context(|| format!("Failed to parse JSON from {}", url))
    }

    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> anyhow::Result<String> {
        self.get(url, query)?
            .into_body()
            .read_to_string()
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    /// Fetch every page of a listing endpoint
    fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let page = page.to_string();
            let mut params = query.to_vec();
            params.push(("per_page", per_page.as_str()));
            params.push(("page", page.as_str()));

            let batch: Vec<T> = self.get_json(url, &params)?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
        }

        log::warn!(
            "Stopped after {} pages of {}; listing truncated",
            MAX_PAGES,
            url
        );
        Ok(items)
    }

    fn commit_changes_blocking(&self, project: &str, sha: &str) -> anyhow::Result<Vec<RawChange>> {
        let url = self.api_url(project, &["repository", "commits", sha, "diff"]);
        self.get_paginated(&url, &[])
    }

    fn compare_blocking(&self, project: &str, from: &str, to: &str) -> anyhow::Result<CompareResult> {
        let url = self.api_url(project, &["repository", "compare"]);
        self.get_json(&url, &[("from", from), ("to", to)])
    }

    fn commits_blocking(&self, project: &str, ref_name: &str) -> anyhow::Result<Vec<Commit>> {
        let url = self.api_url(project, &["repository", "commits"]);
        self.get_paginated(&url, &[("ref_name", ref_name)])
    }

    fn diff_html_blocking(
        &self,
        project: &str,
        path: &str,
        old_path: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<String> {
        let url = self.url_with_segments(
            project
                .split('/')
                .chain(["-", "compare", "diff_for_path"]),
        );
        let body = self.get_text(
            &url,
            &[
                ("from", from),
                ("to", to),
                ("old_path", old_path),
                ("new_path", path),
            ],
        )?;
        Ok(html_from_body(body))
    }

    fn file_raw_blocking(&self, project: &str, path: &str, git_ref: &str) -> anyhow::Result<String> {
        let url = self.api_url(project, &["repository", "files", path, "raw"]);
        self.get_text(&url, &[("ref", git_ref)])
    }
}

/// The web endpoint answers `{"html": "..."}`; older hosts send the fragment as is.
fn html_from_body(body: String) -> String {
    match serde_json::from_str::<DiffHtmlResponse>(&body) {
        Ok(response) => response.html,
        Err(_) => body,
    }
}

/// Run a blocking request on the blocking pool
async fn blocking<T, F>(task: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .context("Blocking request task panicked")?
}

#[async_trait]
impl ChangesClient for GitLabClient {
    async fn fetch_commit_changes(
        &self,
        project: &str,
        sha: &str,
    ) -> anyhow::Result<Vec<RawChange>> {
        let (client, project, sha) = (self.clone(), project.to_string(), sha.to_string());
        blocking(move || client.commit_changes_blocking(&project, &sha)).await
    }

    async fn fetch_compare(
        &self,
        project: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<CompareResult> {
        let client = self.clone();
        let (project, from, to) = (project.to_string(), from.to_string(), to.to_string());
        blocking(move || client.compare_blocking(&project, &from, &to)).await
    }

    async fn fetch_commits(&self, project: &str, ref_name: &str) -> anyhow::Result<Vec<Commit>> {
        let (client, project, ref_name) =
            (self.clone(), project.to_string(), ref_name.to_string());
        blocking(move || client.commits_blocking(&project, &ref_name)).await
    }

    async fn fetch_diff_html(
        &self,
        project: &str,
        path: &str,
        old_path: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<String> {
        let client = self.clone();
        let (project, path, old_path) =
            (project.to_string(), path.to_string(), old_path.to_string());
        let (from, to) = (from.to_string(), to.to_string());
        blocking(move || client.diff_html_blocking(&project, &path, &old_path, &from, &to)).await
    }

    async fn fetch_file_raw(
        &self,
        project: &str,
        path: &str,
        git_ref: &str,
    ) -> anyhow::Result<String> {
        let client = self.clone();
        let (project, path, git_ref) =
            (project.to_string(), path.to_string(), git_ref.to_string());
        blocking(move || client.file_raw_blocking(&project, &path, &git_ref)).await
    }
}

//! Test doubles shared by the session and navigation tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use docnav_fetch::{FetchMode, FetchRequest, FetchResponse, PageFetcher};
use docnav_shared::{DocNavError, Result};

pub(crate) const ORIGIN: &str = "https://docs.example.com";

pub(crate) fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    body: String,
    delay: Duration,
}

/// Serves canned pages by path and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    pages: HashMap<String, Scripted>,
    unreachable: HashSet<String>,
    log: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, path: &str, body: String) -> Self {
        self.status(path, 200, body)
    }

    pub(crate) fn status(mut self, path: &str, status: u16, body: String) -> Self {
        self.pages.insert(
            path.to_string(),
            Scripted {
                status,
                body,
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub(crate) fn delayed(mut self, path: &str, millis: u64) -> Self {
        if let Some(page) = self.pages.get_mut(path) {
            page.delay = Duration::from_millis(millis);
        }
        self
    }

    /// Requests for `path` fail before any response arrives.
    pub(crate) fn unreachable(mut self, path: &str) -> Self {
        self.unreachable.insert(path.to_string());
        self
    }

    pub(crate) fn soft_requests(&self, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.mode == FetchMode::Soft && r.url.path() == path)
            .count()
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.log.lock().clone()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.log.lock().push(request.clone());
        if self.unreachable.contains(request.url.path()) {
            return Err(DocNavError::Network(format!("{}: connection refused", request.url)));
        }
        let scripted = self.pages.get(request.url.path()).cloned().unwrap_or(Scripted {
            status: 404,
            body: "<html><body><p>Not found</p></body></html>".into(),
            delay: Duration::ZERO,
        });
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        Ok(FetchResponse {
            url: request.url.clone(),
            status: scripted.status,
            body: scripted.body,
        })
    }
}

/// A docs page with the full site chrome around `main`.
pub(crate) fn site_page(path: &str, title: &str, main: &str) -> String {
    let links = [("/guide", "Guide"), ("/guide/setup", "Setup"), ("/reference", "Reference")]
        .iter()
        .map(|(href, label)| {
            let class = if *href == path { "nav-link active" } else { "nav-link" };
            format!("<a class=\"{class}\" href=\"{href}\">{label}</a>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<html><head><title>{title}</title><meta name="description" content="About {title}"></head>
<body>
<header>
<button id="mobile-toggle">Menu</button>
<button id="theme-toggle"><i data-lucide="moon" class="theme-icon-moon"></i><i data-lucide="sun" class="theme-icon-sun"></i></button>
</header>
<nav id="sidebar">
{links}
</nav>
<main class="main">{main}</main>
<aside class="toc"><ul id="toc-list"></ul></aside>
</body></html>"#
    )
}

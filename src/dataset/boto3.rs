//! AWS Python SDK (boto3) client and paginator method reference.

use crate::dataset::fetch::HttpCache;
use crate::dataset::{DAY, Dataset, DownloadContext, html};
use crate::index::{Document, Field, Schema};
use crate::item::Item;
use crate::utils::progress::spinner;
use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ID: &str = "boto3";

const SERVICES_URL: &str = "https://boto3.amazonaws.com/v1/documentation/api/latest/reference/services/";

static CLIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"client\s*=\s*boto3\.client\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid client regex")
});

/// A service page linked from the documentation sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Sidebar text, e.g. `IAM`
    pub name: String,
    /// Page name, e.g. `iam.html`
    pub href: String,
}

impl Service {
    pub fn url(&self) -> String {
        format!("{SERVICES_URL}{}", self.href)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Client,
    Paginator,
}

impl MethodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Client => "client",
            MethodKind::Paginator => "pagi",
        }
    }

    fn section_id(self) -> &'static str {
        match self {
            MethodKind::Client => "client",
            MethodKind::Paginator => "paginators",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub kind: MethodKind,
    /// Argument of `boto3.client(..)`, e.g. `iam`
    pub service_id: String,
    pub service_name: String,
    pub method: String,
    pub url: String,
}

impl Method {
    fn into_document(self) -> Document {
        Document::new()
            .with("type", self.kind.as_str())
            .with("srv", self.service_name.clone())
            .with("srv_ng", self.service_name)
            .with("srv_id", self.service_id.clone())
            .with("srv_id_ng", self.service_id)
            .with("meth", self.method.clone())
            .with("meth_ng", self.method)
            .with("url", self.url)
    }
}

/// Services listed in the sidebar of the services index page
pub fn parse_service_list(index_html: &str) -> Vec<Service> {
    let Some(sidebar) = html::element_by_class(index_html, "ul", "current") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    html::anchors(sidebar)
        .into_iter()
        .filter(|a| a.has_classes("reference internal"))
        .filter_map(|a| {
            let href = a.href()?;
            if href.contains('#') || !seen.insert(href.to_string()) {
                return None;
            }
            Some(Service {
                name: a.text.clone(),
                href: href.to_string(),
            })
        })
        .collect()
}

/// The id passed to `boto3.client(..)` in the page's usage sample,
/// falling back to the page name
pub fn parse_service_id(page_html: &str, service: &Service) -> String {
    let text = html::text_lines(page_html);
    CLIENT_RE
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| service.href.trim_end_matches(".html").to_string())
}

/// Client and paginator methods documented on one service page
pub fn parse_service_page(page_html: &str, service: &Service) -> Vec<Method> {
    let service_id = parse_service_id(page_html, service);
    let mut seen = HashSet::new();
    let mut methods = Vec::new();

    for kind in [MethodKind::Client, MethodKind::Paginator] {
        let Some(section) = html::element_by_id(page_html, "section", kind.section_id()) else {
            continue;
        };

        for anchor in html::anchors(section) {
            if !anchor.has_classes("reference internal") {
                continue;
            }
            let Some(href) = anchor.href() else { continue };
            if href.starts_with('#') || anchor.text.is_empty() {
                continue;
            }

            let url = format!("{SERVICES_URL}{href}");
            if !seen.insert(url.clone()) {
                continue;
            }

            methods.push(Method {
                kind,
                service_id: service_id.clone(),
                service_name: service.name.clone(),
                method: anchor.text.clone(),
                url,
            });
        }
    }

    methods
}

pub struct Boto3 {
    http: HttpCache,
    threads: usize,
    schema: Schema,
}

impl Boto3 {
    pub fn new(http: HttpCache, threads: usize) -> Self {
        Self {
            http,
            threads: threads.max(1),
            schema: Schema::new(vec![
                Field::keyword("type").boost(3.0),
                Field::text("srv").boost(2.0),
                Field::text("srv_id").boost(2.0),
                Field::text("meth"),
                Field::ngram_words("srv_ng", 2, 6).boost(2.0),
                Field::ngram_words("srv_id_ng", 2, 6).boost(2.0),
                Field::ngram_words("meth_ng", 2, 6),
                Field::stored("url"),
            ]),
        }
    }
}

impl Dataset for Boto3 {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "AWS Python SDK client and paginator methods"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn expire(&self) -> Duration {
        Duration::from_secs(30 * DAY)
    }

    fn download(&self, ctx: &DownloadContext) -> Result<Vec<Document>> {
        let index_html = self.http.get(&format!("{SERVICES_URL}index.html"), ctx.refresh)?;
        let services = parse_service_list(&index_html);
        if services.is_empty() {
            anyhow::bail!("No services found on the boto3 services page");
        }
        info!(services = services.len(), "downloading boto3 service pages");

        let progress = spinner(format!("Fetching {} boto3 service pages...", services.len()), ctx.silent);
        let done = AtomicUsize::new(0);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .context("Failed to create fetch thread pool")?;

        let pages: Vec<Vec<Method>> = pool.install(|| {
            services
                .par_iter()
                .map(|service| {
                    let page = self
                        .http
                        .get(&service.url(), ctx.refresh)
                        .with_context(|| format!("Failed to download {} reference", service.name))?;
                    let methods = parse_service_page(&page, service);
                    if methods.is_empty() {
                        warn!(service = %service.name, "no methods found");
                    }
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.set_message(format!("Fetched {n}/{} boto3 service pages", services.len()));
                    debug!(service = %service.name, methods = methods.len(), "parsed service page");
                    Ok(methods)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let docs: Vec<Document> = pages
            .into_iter()
            .flatten()
            .map(Method::into_document)
            .collect();
        progress.finish_with_message(format!("Found {} boto3 methods", docs.len()));
        Ok(docs)
    }

    fn to_item(&self, doc: &Document) -> Item {
        let url = doc.field("url");
        let srv_id = doc.field("srv_id").to_lowercase();
        let kind = doc.field("type");
        let meth = doc.field("meth");

        Item::reference(
            url,
            format!("{kind} | {srv_id}.{meth}"),
            url,
            url,
            format!("{kind} {srv_id} {meth}"),
        )
    }
}

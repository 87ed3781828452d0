//! AWS CDK v2 Python API reference: constructs, structs and interfaces per module.

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
use std::time::Duration;
use tracing::{debug, info};

pub const ID: &str = "cdk_python";

const DOCS_URL: &str = "https://docs.aws.amazon.com/cdk/api/v2/python/";

static MODULE_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(aws_cdk(?:\.[a-z0-9_]+)*)\.html$").expect("valid module regex")
});

/// A construct library link found on a module page
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub module: String,
    pub name: String,
    pub url: String,
}

/// `aws_cdk.aws_lambda` -> `lambda`, `aws_cdk` -> `core`
pub fn short_module(module: &str) -> &str {
    let rest = match module.strip_prefix("aws_cdk.") {
        Some(rest) => rest,
        None if module == "aws_cdk" => return "core",
        None => module,
    };
    rest.strip_prefix("aws_").unwrap_or(rest)
}

/// Module names linked from the API reference home page, in page order
pub fn parse_module_list(index_html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    html::anchors(index_html)
        .iter()
        .filter_map(|a| a.href())
        .filter_map(|href| MODULE_HREF_RE.captures(href).map(|c| c[1].to_string()))
        .filter(|module| seen.insert(module.clone()))
        .collect()
}

/// Classes documented under `module`, one per page
pub fn parse_module_page(module: &str, page_html: &str) -> Vec<Construct> {
    let prefix = format!("{module}/");
    let mut seen = HashSet::new();

    html::anchors(page_html)
        .into_iter()
        .filter_map(|a| {
            let href = a.href()?;
            let page = href.split('#').next()?;
            if !page.starts_with(&prefix) || !page.ends_with(".html") {
                return None;
            }
            let name = page[prefix.len()..].trim_end_matches(".html");
            if name.is_empty() || name.contains('/') || !seen.insert(name.to_string()) {
                return None;
            }
            Some(Construct {
                module: module.to_string(),
                name: name.to_string(),
                url: format!("{DOCS_URL}{page}"),
            })
        })
        .collect()
}

pub struct CdkPython {
    http: HttpCache,
    threads: usize,
    schema: Schema,
}

impl CdkPython {
    pub fn new(http: HttpCache, threads: usize) -> Self {
        Self {
            http,
            threads: threads.max(1),
            schema: Schema::new(vec![
                Field::text("mod").boost(2.0),
                Field::ngram_words("mod_ng", 2, 6).boost(2.0),
                Field::text("name"),
                Field::ngram_words("name_ng", 2, 6),
                Field::stored("url"),
            ]),
        }
    }
}

impl Dataset for CdkPython {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "AWS CDK v2 Python API reference"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn expire(&self) -> Duration {
        Duration::from_secs(30 * DAY)
    }

    fn download(&self, ctx: &DownloadContext) -> Result<Vec<Document>> {
        let index_html = self.http.get(&format!("{DOCS_URL}index.html"), ctx.refresh)?;
        let modules = parse_module_list(&index_html);
        if modules.is_empty() {
            anyhow::bail!("No modules found on the CDK API reference home page");
        }
        info!(modules = modules.len(), "downloading CDK module pages");
        let progress = spinner(format!("Fetching {} CDK module pages...", modules.len()), ctx.silent);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .context("Failed to create fetch thread pool")?;

        let pages: Vec<Vec<Construct>> = pool.install(|| {
            modules
                .par_iter()
                .map(|module| {
                    let page = self
                        .http
                        .get(&format!("{DOCS_URL}{module}.html"), ctx.refresh)
                        .with_context(|| format!("Failed to download {module} reference"))?;
                    let constructs = parse_module_page(module, &page);
                    debug!(module, constructs = constructs.len(), "parsed module page");
                    Ok(constructs)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let docs: Vec<Document> = pages
            .into_iter()
            .flatten()
            .map(|c| {
                Document::new()
                    .with("mod", c.module.clone())
                    .with("mod_ng", short_module(&c.module))
                    .with("name", c.name.clone())
                    .with("name_ng", c.name)
                    .with("url", c.url)
            })
            .collect();
        progress.finish_with_message(format!("Found {} CDK classes", docs.len()));
        Ok(docs)
    }

    fn to_item(&self, doc: &Document) -> Item {
        let url = doc.field("url");
        let module = doc.field("mod");
        let name = doc.field("name");

        Item::reference(
            url,
            format!("{module} | {name}"),
            url,
            url,
            format!("{} {name}", short_module(module)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AppConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_module() {
        assert_eq!(short_module("aws_cdk.aws_lambda"), "lambda");
        assert_eq!(short_module("aws_cdk.pipelines"), "pipelines");
        assert_eq!(short_module("aws_cdk"), "core");
        assert_eq!(short_module("constructs"), "constructs");
    }

    #[test]
    fn test_parse_module_list() {
        let html = r#"
            <a class="reference internal" href="aws_cdk.html">aws_cdk</a>
            <a class="reference internal" href="aws_cdk.aws_lambda.html">aws_cdk.aws_lambda</a>
            <a class="reference internal" href="aws_cdk.aws_lambda.html#module">again</a>
            <a class="reference internal" href="aws_cdk.aws_lambda.html">dup</a>
            <a class="reference internal" href="genindex.html">Index</a>"#;
        assert_eq!(parse_module_list(html), vec!["aws_cdk", "aws_cdk.aws_lambda"]);
    }

    #[test]
    fn test_parse_module_page() {
        let html = r##"
            <a class="reference internal" href="aws_cdk.aws_lambda/Function.html#aws_cdk.aws_lambda.Function">Function</a>
            <a class="reference internal" href="aws_cdk.aws_lambda/Function.html">Function</a>
            <a class="reference internal" href="aws_cdk.aws_lambda/CfnFunction.html">CfnFunction</a>
            <a class="reference internal" href="aws_cdk.aws_s3/Bucket.html">Bucket</a>
            <a class="headerlink" href="#overview">¶</a>"##;
        let constructs = parse_module_page("aws_cdk.aws_lambda", html);

        let names: Vec<_> = constructs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Function", "CfnFunction"]);
        assert_eq!(
            constructs[0].url,
            "https://docs.aws.amazon.com/cdk/api/v2/python/aws_cdk.aws_lambda/Function.html"
        );
    }

    #[test]
    fn test_display_mapper() {
        let tmp = tempfile::tempdir().unwrap();
        let http = HttpCache::new(tmp.path().to_path_buf(), &AppConfig::default()).unwrap();
        let dataset = CdkPython::new(http, 1);

        let doc = Document::new()
            .with("mod", "aws_cdk.aws_lambda")
            .with("name", "Function")
            .with("url", "https://docs.aws.amazon.com/cdk/api/v2/python/aws_cdk.aws_lambda/Function.html");
        let item = dataset.to_item(&doc);

        assert_eq!(item.title, "aws_cdk.aws_lambda | Function");
        assert_eq!(item.uid, doc.field("url"));
        assert_eq!(item.url(), Some(doc.field("url")));
        assert_eq!(item.autocomplete.as_deref(), Some("lambda Function"));
    }
}

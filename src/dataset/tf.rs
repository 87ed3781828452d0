//! Terraform resources and data sources of the major cloud providers,
//! read from the provider repositories' website docs.

use crate::dataset::fetch::git_clone_shallow;
use crate::dataset::{DAY, Dataset, DownloadContext};
use crate::index::{Document, Field, Schema};
use crate::item::Item;
use crate::utils::progress::spinner;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ID: &str = "tf";

pub struct Provider {
    /// What the user types, e.g. `gcp`
    pub short_name: &'static str,
    /// Name in the registry URL, e.g. `google`
    pub registry_name: &'static str,
    pub repo: &'static str,
}

pub const PROVIDERS: &[Provider] = &[
    Provider { short_name: "aws", registry_name: "aws", repo: "terraform-provider-aws" },
    Provider { short_name: "az", registry_name: "azurerm", repo: "terraform-provider-azurerm" },
    Provider { short_name: "gcp", registry_name: "google", repo: "terraform-provider-google" },
];

pub struct ItemType {
    pub name: &'static str,
    /// Directory under `website/docs`
    pub folder: &'static str,
    /// Path segment in the registry URL
    pub url_key: &'static str,
}

pub const ITEM_TYPES: &[ItemType] = &[
    ItemType { name: "Res", folder: "r", url_key: "resources" },
    ItemType { name: "DS", folder: "d", url_key: "data-sources" },
];

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Metadata of one resource or data source page
#[derive(Debug, Clone, PartialEq)]
pub struct DocPage {
    pub subcategory: String,
    pub description: String,
}

/// Parse the YAML front matter at the top of a provider doc page
pub fn parse_front_matter(content: &str) -> Result<DocPage> {
    let content = content.trim_start_matches('\u{feff}');
    let body = content
        .strip_prefix("---")
        .context("Page has no front matter")?;
    let end = body.find("\n---").context("Front matter is not terminated")?;

    let meta: FrontMatter = serde_yaml::from_str(&body[..end]).context("Invalid front matter")?;
    let description = meta
        .description
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(DocPage {
        subcategory: meta.subcategory.unwrap_or_default().trim().to_string(),
        description,
    })
}

/// `s3_bucket.html.markdown` -> `s3_bucket`
fn item_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.split('.').next()?;
    (!name.is_empty()).then(|| name.to_string())
}

fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "markdown"))
        .collect()
}

/// Documents for every page of one provider checkout
pub fn extract_provider(provider: &Provider, repo_dir: &Path) -> Result<Vec<Document>> {
    let docs_dir = repo_dir.join("website").join("docs");
    if !docs_dir.is_dir() {
        anyhow::bail!("{} has no website/docs directory", repo_dir.display());
    }

    let skipped = AtomicUsize::new(0);
    let mut documents = Vec::new();

    for item_type in ITEM_TYPES {
        let mut files = markdown_files(&docs_dir.join(item_type.folder));
        files.sort();

        let parsed: Vec<Document> = files
            .par_iter()
            .filter_map(|path| {
                let name = item_name(path)?;
                let page = fs::read_to_string(path)
                    .map_err(anyhow::Error::from)
                    .and_then(|content| parse_front_matter(&content));
                match page {
                    Ok(page) => Some(
                        Document::new()
                            .with("provider", provider.short_name)
                            .with("type", item_type.name)
                            .with("cate", page.subcategory.clone())
                            .with("cate_ng", page.subcategory)
                            .with("item", name.clone())
                            .with("item_ng", name)
                            .with("desc", page.description),
                    ),
                    Err(e) => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                        debug!(path = %path.display(), error = %e, "skipping page");
                        None
                    }
                }
            })
            .collect();
        documents.extend(parsed);
    }

    let skipped = skipped.load(Ordering::Relaxed);
    if skipped > 0 {
        warn!(provider = provider.short_name, skipped, "pages without usable front matter");
    }
    Ok(documents)
}

fn provider_by_short_name(short_name: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.short_name == short_name)
}

fn url_key(item_type: &str) -> &'static str {
    ITEM_TYPES
        .iter()
        .find(|t| t.name == item_type)
        .map(|t| t.url_key)
        .unwrap_or("resources")
}

pub struct Terraform {
    repos_dir: PathBuf,
    threads: usize,
    schema: Schema,
}

impl Terraform {
    pub fn new(repos_dir: PathBuf, threads: usize) -> Self {
        Self {
            repos_dir,
            threads: threads.max(1),
            schema: Schema::new(vec![
                Field::keyword("provider").boost(10.0),
                Field::keyword("type").boost(5.0),
                Field::text("cate").boost(2.0),
                Field::text("item"),
                Field::ngram_words("cate_ng", 2, 6).boost(2.0),
                Field::ngram_words("item_ng", 2, 6),
                Field::stored("desc"),
            ]),
        }
    }
}

impl Dataset for Terraform {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Terraform resources and data sources for AWS, Azure and GCP"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn expire(&self) -> Duration {
        Duration::from_secs(365 * DAY)
    }

    fn download(&self, ctx: &DownloadContext) -> Result<Vec<Document>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .context("Failed to create parse thread pool")?;

        let mut documents = Vec::new();
        for provider in PROVIDERS {
            let repo_dir = self.repos_dir.join(provider.repo);
            let progress = spinner(format!("Cloning {}...", provider.repo), ctx.silent);
            git_clone_shallow(
                &format!("https://github.com/hashicorp/{}", provider.repo),
                &repo_dir,
                ctx.refresh,
            )?;

            progress.set_message(format!("Reading {} docs...", provider.short_name));
            let docs = pool.install(|| extract_provider(provider, &repo_dir))?;
            info!(provider = provider.short_name, docs = docs.len(), "extracted provider docs");
            progress.finish_with_message(format!("{}: {} pages", provider.short_name, docs.len()));
            documents.extend(docs);
        }
        Ok(documents)
    }

    fn to_item(&self, doc: &Document) -> Item {
        let provider = doc.field("provider");
        let item_type = doc.field("type");
        let cate = doc.field("cate");
        let item = doc.field("item");

        let registry_name = provider_by_short_name(provider)
            .map(|p| p.registry_name)
            .unwrap_or(provider);
        let title = format!("{provider} {item_type}: {cate} | {item}");
        let url = format!(
            "https://registry.terraform.io/providers/hashicorp/{registry_name}/latest/docs/{}/{item}",
            url_key(item_type)
        );

        Item::reference(
            title.clone(),
            title,
            doc.field("desc"),
            url,
            format!("{provider} {item_type} {cate} {item}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BUCKET_PAGE: &str = "---
subcategory: \"S3 (Simple Storage)\"
layout: \"aws\"
page_title: \"AWS: aws_s3_bucket\"
description: |-
  Provides a S3 bucket resource.
  Bucket names are global.
---

# Resource: aws_s3_bucket
";

    #[test]
    fn test_parse_front_matter() {
        let page = parse_front_matter(BUCKET_PAGE).unwrap();
        assert_eq!(page.subcategory, "S3 (Simple Storage)");
        assert_eq!(page.description, "Provides a S3 bucket resource. Bucket names are global.");
    }

    #[test]
    fn test_front_matter_missing_keys() {
        let page = parse_front_matter("---\nlayout: aws\n---\nbody").unwrap();
        assert_eq!(page, DocPage { subcategory: String::new(), description: String::new() });
        assert!(parse_front_matter("# no front matter").is_err());
    }

    #[test]
    fn test_extract_provider_from_checkout() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("website").join("docs");
        fs::create_dir_all(docs.join("r")).unwrap();
        fs::create_dir_all(docs.join("d")).unwrap();
        fs::write(docs.join("r").join("s3_bucket.html.markdown"), BUCKET_PAGE).unwrap();
        fs::write(docs.join("r").join("broken.html.markdown"), "no front matter").unwrap();
        fs::write(docs.join("r").join("notes.md"), BUCKET_PAGE).unwrap();
        fs::write(
            docs.join("d").join("iam_role.html.markdown"),
            "---\nsubcategory: IAM\ndescription: Get an IAM role\n---\n",
        )
        .unwrap();

        let documents = extract_provider(&PROVIDERS[0], tmp.path()).unwrap();
        let summary: Vec<_> = documents
            .iter()
            .map(|d| (d.field("type"), d.field("item"), d.field("cate")))
            .collect();
        assert_eq!(
            summary,
            vec![("Res", "s3_bucket", "S3 (Simple Storage)"), ("DS", "iam_role", "IAM")]
        );
    }

    #[test]
    fn test_missing_docs_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract_provider(&PROVIDERS[0], tmp.path()).is_err());
    }

    #[test]
    fn test_display_mapper() {
        let dataset = Terraform::new(PathBuf::from("/nonexistent"), 1);
        let doc = Document::new()
            .with("provider", "gcp")
            .with("type", "DS")
            .with("cate", "Cloud Storage")
            .with("item", "storage_bucket")
            .with("desc", "Gets a bucket");
        let item = dataset.to_item(&doc);

        assert_eq!(item.uid, "gcp DS: Cloud Storage | storage_bucket");
        assert_eq!(item.title, item.uid);
        assert_eq!(item.subtitle, "Gets a bucket");
        assert_eq!(
            item.url(),
            Some("https://registry.terraform.io/providers/hashicorp/google/latest/docs/data-sources/storage_bucket")
        );
        assert_eq!(item.autocomplete.as_deref(), Some("gcp DS Cloud Storage storage_bucket"));
    }
}

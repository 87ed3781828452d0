use serde::Serialize;

/// What a row stands for, which decides the actions the UI binds to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A dataset to search; selecting it primes the input for in-dataset search
    Dataset,
    /// A documentation page
    Reference,
    /// Shown while an index is being built
    Placeholder,
    /// A build or search failure
    Error,
}

/// Uniform display/action row handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Stable identity, same for the same underlying record across builds
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    /// Primary action argument, usually a URL
    pub arg: Option<String>,
    /// Text put into the input box when the item is completed
    pub autocomplete: Option<String>,
    pub kind: ItemKind,
}

impl Item {
    pub fn reference(
        uid: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        url: impl Into<String>,
        autocomplete: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            arg: Some(url.into()),
            autocomplete: Some(autocomplete.into()),
            kind: ItemKind::Reference,
        }
    }

    pub fn dataset(id: &str, description: &str) -> Self {
        Self {
            uid: id.to_string(),
            title: format!("🔍 {id:?} dataset"),
            subtitle: format!("{description}. Hit 'Tab' to search this dataset."),
            arg: Some(id.to_string()),
            autocomplete: Some(format!("{id} ")),
            kind: ItemKind::Dataset,
        }
    }

    /// The "building index" row shown before a blocking build
    pub fn building_index(dataset: &str) -> Self {
        Self {
            uid: format!("{dataset}-building-index"),
            title: "Creating index, it may take 5-30 seconds ...".to_string(),
            subtitle: "please wait, don't press any key".to_string(),
            arg: None,
            autocomplete: None,
            kind: ItemKind::Placeholder,
        }
    }

    pub fn error(uid: impl Into<String>, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            arg: None,
            autocomplete: None,
            kind: ItemKind::Error,
        }
    }

    /// The URL to open or copy, if this row has one
    pub fn url(&self) -> Option<&str> {
        match self.kind {
            ItemKind::Reference => self.arg.as_deref(),
            _ => None,
        }
    }
}

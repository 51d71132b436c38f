//! Node configuration, populated from environment variables.

use std::net::SocketAddr;

/// Author entry of the base document meta.
///
/// A single author is emitted under `meta.author`, a list under
/// `meta.authors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaAuthor {
    One(String),
    Many(Vec<String>),
}

/// Settings consumed by the JSON:API response middleware.
///
/// Documents are pretty-printed unless turned off.
#[derive(Debug, Clone)]
pub struct JsonApiConfig {
    pub meta_author: Option<MetaAuthor>,
    pub meta_copyright: Option<String>,
    /// Prepended to every sub-URL link a schema produces.
    pub url_prefix: String,
    pub pretty_print: bool,
}

impl Default for JsonApiConfig {
    fn default() -> Self {
        Self {
            meta_author: None,
            meta_copyright: None,
            url_prefix: String::new(),
            pretty_print: true,
        }
    }
}

impl JsonApiConfig {
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.meta_author = Some(MetaAuthor::One(author.into()));
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_author = Some(MetaAuthor::Many(authors.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.meta_copyright = Some(copyright.into());
        self
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}

/// Runtime configuration for a JSON:API node.
///
/// All fields are populated from environment variables with sensible
/// defaults, so a node can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `JSONAPI_BIND` | `0.0.0.0:3000` | TCP socket address to listen on |
/// | `JSONAPI_BASE_PATH` | (empty) | Path prefix every route is mounted under, e.g. `/api` |
/// | `JSONAPI_META_AUTHOR` | (absent) | Single author placed in `meta.author` |
/// | `JSONAPI_META_AUTHORS` | (absent) | Comma-separated authors for `meta.authors`; wins over `JSONAPI_META_AUTHOR` |
/// | `JSONAPI_META_COPYRIGHT` | (absent) | Copyright string placed in `meta.copyright` |
/// | `JSONAPI_PRETTY` | `true` | Pretty-print response documents |
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Normalised mount prefix: empty, or `/segment` without a trailing slash.
    pub base_path: String,

    pub jsonapi: JsonApiConfig,
}

impl NodeConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = std::env::var("JSONAPI_BIND")
            .unwrap_or_else(|_| "0.0.0.0:3000".into())
            .parse()
            .expect("JSONAPI_BIND must be a valid socket address (e.g. 0.0.0.0:3000)");

        let base_path = normalize_base_path(&std::env::var("JSONAPI_BASE_PATH").unwrap_or_default());

        let meta_author = match std::env::var("JSONAPI_META_AUTHORS") {
            Ok(list) => Some(MetaAuthor::Many(
                list.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            Err(_) => std::env::var("JSONAPI_META_AUTHOR").ok().map(MetaAuthor::One),
        };

        let pretty_print = std::env::var("JSONAPI_PRETTY")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            bind_addr,
            jsonapi: JsonApiConfig {
                meta_author,
                meta_copyright: std::env::var("JSONAPI_META_COPYRIGHT").ok(),
                url_prefix: base_path.clone(),
                pretty_print,
            },
            base_path,
        }
    }
}

/// `""`, `"/"` and `"api/"` become `""`, `""` and `"/api"`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

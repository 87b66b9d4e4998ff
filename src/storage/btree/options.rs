use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::storage::btree::layout::LeafLayout;
use crate::storage::btree::leaf::LeafPage;
use crate::types::page::{DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::types::{PageError, PageId};

/// Sizing knobs shared by every leaf page of one index.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeafOptions {
    /// Size of one page buffer in bytes.
    pub page_size: usize,
    /// Width of one encoded key in bytes.
    pub key_size: usize,
    /// Optional cap on pairs per page; defaults to what fits in `page_size`.
    pub max_size: Option<usize>,
}

impl Default for LeafOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            key_size: 8,
            max_size: None,
        }
    }
}

/// Errors raised while loading or validating [`LeafOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for these options.
    #[error("failed to parse leaf options: {source}")]
    Parse {
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// The options describe a page that cannot exist.
    #[error("invalid leaf options: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    leaf: LeafOptions,
}

impl LeafOptions {
    /// Options for `key_size`-byte keys on default-sized pages.
    pub fn with_key_size(key_size: usize) -> Self {
        Self {
            key_size,
            ..Self::default()
        }
    }

    /// Parses the `[leaf]` table of a TOML document and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(contents).map_err(|source| ConfigError::Parse { source })?;
        raw.leaf.validate()?;
        Ok(raw.leaf)
    }

    /// Reads and validates options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Layout shared by pages built from these options.
    pub fn layout(&self) -> LeafLayout {
        LeafLayout::new(self.key_size)
    }

    /// Pair capacity: the explicit cap if set, otherwise what fits in a page.
    pub fn effective_max_size(&self) -> usize {
        let capacity = self.layout().capacity(self.page_size);
        self.max_size.unwrap_or(capacity)
    }

    /// Checks that the options describe a page that can hold and split pairs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < MIN_PAGE_SIZE {
            return Err(ConfigError::Invalid("page size below minimum"));
        }
        if self.key_size == 0 || self.key_size > u16::MAX as usize {
            return Err(ConfigError::Invalid("key size must be in 1..=65535"));
        }
        let capacity = self.layout().capacity(self.page_size);
        if let Some(max) = self.max_size {
            if max > capacity {
                return Err(ConfigError::Invalid("max size exceeds page capacity"));
            }
        }
        let effective = self.effective_max_size();
        if effective < 2 {
            return Err(ConfigError::Invalid("page must hold at least two pairs"));
        }
        if effective > u16::MAX as usize {
            return Err(ConfigError::Invalid("max size does not fit the header field"));
        }
        Ok(())
    }

    /// Formats `buf` as an empty leaf using these options.
    pub fn init_page<B>(
        &self,
        buf: B,
        page_id: PageId,
        parent: Option<PageId>,
    ) -> crate::types::Result<LeafPage<B>>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        if buf.as_ref().len() != self.page_size {
            return Err(PageError::Invalid("page buffer length differs from page size"));
        }
        LeafPage::init(
            buf,
            page_id,
            parent,
            self.key_size,
            self.effective_max_size(),
        )
    }

    /// Allocates a zeroed `page_size` buffer and formats it as an empty leaf.
    pub fn new_page(
        &self,
        page_id: PageId,
        parent: Option<PageId>,
    ) -> crate::types::Result<LeafPage<Vec<u8>>> {
        self.init_page(vec![0u8; self.page_size], page_id, parent)
    }
}

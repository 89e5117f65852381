//! Pool persistence as one `url,timestamp` CSV file per pool.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::entities::{CacheEntry, CachePool, PoolKind};
use crate::domain::ports::{PoolStoreError, PoolStorePort};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Stores `unused.csv`, `used.csv` and `bad.csv` in one directory.
#[derive(Debug, Clone)]
pub struct CsvPoolStore {
    dir: PathBuf,
}

impl CsvPoolStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the pool files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Backing file of a pool.
    #[must_use]
    pub fn path(&self, kind: PoolKind) -> PathBuf {
        self.dir.join(format!("{}.csv", kind.as_str()))
    }

    fn io_error(&self, kind: PoolKind, source: std::io::Error) -> PoolStoreError {
        PoolStoreError::Io {
            kind,
            path: self.path(kind),
            source,
        }
    }
}

#[async_trait]
impl PoolStorePort for CsvPoolStore {
    async fn load(&self, kind: PoolKind) -> Result<CachePool, PoolStoreError> {
        let path = self.path(kind);

        if !tokio::fs::try_exists(&path).await.map_err(|e| self.io_error(kind, e))? {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| self.io_error(kind, e))?;
            tokio::fs::write(&path, b"")
                .await
                .map_err(|e| self.io_error(kind, e))?;
            debug!(pool = %kind, path = %path.display(), "Created empty pool file");
            return Ok(CachePool::new());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| self.io_error(kind, e))?;
        let pool = parse_pool(&content, kind);

        debug!(pool = %kind, entries = pool.len(), "Loaded pool");
        Ok(pool)
    }

    async fn save(&self, kind: PoolKind, pool: &CachePool) -> Result<(), PoolStoreError> {
        let path = self.path(kind);
        let dir = self.dir.clone();
        let content = render_pool(pool);

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut temp_file = tempfile::NamedTempFile::new_in(&dir)?;
            temp_file.write_all(content.as_bytes())?;
            temp_file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| self.io_error(kind, std::io::Error::other(e)))?
        .map_err(|e| self.io_error(kind, e))?;

        debug!(pool = %kind, entries = pool.len(), "Saved pool");
        Ok(())
    }
}

/// Parses pool rows. When a URL repeats, the row whose timestamp text sorts
/// last wins; timestamps are compared as text, not as numbers.
fn parse_pool(content: &str, kind: PoolKind) -> CachePool {
    let mut latest: HashMap<String, String> = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = split_row(line).into_iter();
        let (Some(url), Some(timestamp)) = (fields.next(), fields.next()) else {
            warn!(pool = %kind, line = line_no + 1, "Skipping malformed pool row");
            continue;
        };

        match latest.entry(url) {
            Entry::Occupied(mut existing) => {
                if timestamp > *existing.get() {
                    existing.insert(timestamp);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(timestamp);
            }
        }
    }

    latest
        .into_iter()
        .map(|(url, timestamp)| {
            let parsed = timestamp.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!(pool = %kind, url = %url, timestamp = %timestamp, "Unparseable timestamp, using 0");
                0
            });
            CacheEntry::new(url, parsed)
        })
        .collect()
}

fn render_pool(pool: &CachePool) -> String {
    let mut out = String::new();
    for entry in pool.iter() {
        out.push_str(&quote_field(&entry.url));
        out.push(DELIMITER);
        out.push_str(&entry.timestamp.to_string());
        out.push_str("\r\n");
    }
    out
}

fn quote_field(field: &str) -> String {
    if field.contains([DELIMITER, QUOTE, '\n', '\r']) {
        format!("{QUOTE}{}{QUOTE}", field.replace(QUOTE, "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one CSV line, honouring double-quoted fields with `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            (QUOTE, true) if chars.peek() == Some(&QUOTE) => {
                field.push(QUOTE);
                chars.next();
            }
            (QUOTE, true) => in_quotes = false,
            (QUOTE, false) if field.is_empty() => in_quotes = true,
            (DELIMITER, false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

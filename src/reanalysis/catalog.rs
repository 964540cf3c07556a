use chrono::{DateTime, Datelike, Duration, Utc};
use std::path::{Path, PathBuf};
use url::Url;

use crate::reanalysis::Reanalysis;
use crate::utils::error::{IbError, Result};

/// Fields are stored at six-hour cadence at most; padding the granule span
/// by one level spacing guarantees bracketing levels near month edges.
const LEVEL_PAD_SECONDS: i64 = 6 * 3600;

/// Resolves the monthly pressure files covering a granule's time span,
/// fetching missing files from a remote endpoint when one is configured.
pub struct FieldCatalog {
    product: Reanalysis,
    data_dir: PathBuf,
    endpoint: Option<String>,
}

impl FieldCatalog {
    pub fn new(product: Reanalysis, data_dir: impl AsRef<Path>, endpoint: Option<String>) -> Self {
        Self {
            product,
            data_dir: data_dir.as_ref().to_path_buf(),
            endpoint,
        }
    }

    /// Year/month pairs whose files are needed to bracket `[start, end]`.
    pub fn months_covering(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<(i32, u32)> {
        let start = start - Duration::seconds(LEVEL_PAD_SECONDS);
        let end = end + Duration::seconds(LEVEL_PAD_SECONDS);

        let mut months = Vec::new();
        let (mut year, mut month) = (start.year(), start.month());
        loop {
            months.push((year, month));
            if year > end.year() || (year == end.year() && month >= end.month()) {
                break;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        months
    }

    /// Filenames required for the span, in chronological order.
    pub fn required_files(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
        Self::months_covering(start, end)
            .into_iter()
            .map(|(y, m)| self.product.monthly_file(y, m))
            .collect()
    }

    /// Local paths of all required monthly files, fetching any that are
    /// missing. Errors on the first file that cannot be resolved.
    pub async fn resolve(
        &self,
        client: &reqwest::Client,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for name in self.required_files(start, end) {
            paths.push(self.ensure_local(client, &name).await?);
        }
        Ok(paths)
    }

    /// Local path of the long-term mean file, fetched if missing. `None`
    /// when the file does not exist anywhere (callers fall back to a
    /// series mean); a failed fetch from a configured endpoint is still
    /// an error.
    pub async fn resolve_mean(
        &self,
        client: &reqwest::Client,
        first: i32,
        last: i32,
    ) -> Result<Option<PathBuf>> {
        match self
            .ensure_local(client, &self.product.mean_file(first, last))
            .await
        {
            Ok(path) => Ok(Some(path)),
            Err(IbError::MissingFieldError { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn ensure_local(&self, client: &reqwest::Client, name: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(name);
        if path.exists() {
            return Ok(path);
        }

        let Some(endpoint) = &self.endpoint else {
            return Err(IbError::MissingFieldError {
                file: name.to_string(),
            });
        };

        tracing::info!("Fetching {} from {}", name, endpoint);
        let base = if endpoint.ends_with('/') {
            Url::parse(endpoint)?
        } else {
            Url::parse(&format!("{}/", endpoint))?
        };
        let url = base.join(name)?;

        let response = client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(&path, &body)?;
        tracing::debug!("Cached {} ({} bytes)", path.display(), body.len());
        Ok(path)
    }
}

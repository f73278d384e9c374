//! Invoice documents keyed by the listing's `fileName`.

use std::path::{Component, Path, PathBuf};

use billing_core::error::{BillingError, Result};
use billing_core::models::InvoiceRecord;

/// Read-only store of invoice documents in a single directory.
#[derive(Debug, Clone)]
pub struct InvoiceFiles {
    dir: PathBuf,
}

impl InvoiceFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document for `file_name`, which must be a bare file name.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == file_name => Ok(self.dir.join(name)),
            _ => Err(BillingError::InvalidFileName(file_name.to_string())),
        }
    }

    /// Read the document bytes for `file_name`.
    pub async fn fetch(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(file_name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| BillingError::FileRead { path, source })
    }

    /// Copy the document for `file_name` into `out_dir`, returning the new path.
    pub async fn save_to(&self, file_name: &str, out_dir: &Path) -> Result<PathBuf> {
        let bytes = self.fetch(file_name).await?;
        tokio::fs::create_dir_all(out_dir).await?;
        let target = out_dir.join(file_name);
        tokio::fs::write(&target, &bytes).await?;
        tracing::info!(
            bytes = bytes.len(),
            "downloaded {} to {}",
            file_name,
            target.display()
        );
        Ok(target)
    }
}

/// The listed invoice whose download key is `file_name`.
pub fn find_by_file_name<'a, I>(invoices: I, file_name: &str) -> Option<&'a InvoiceRecord>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    invoices
        .into_iter()
        .find(|invoice| !invoice.file_name.is_empty() && invoice.file_name == file_name)
}

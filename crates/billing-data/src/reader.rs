//! Invoice listing discovery and loading.
//!
//! The listing is either one `.json` file holding an array of invoices, or a
//! directory scanned recursively for `.json` files, each holding an array or
//! a single invoice object.

use std::path::{Path, PathBuf};

use billing_core::error::{BillingError, Result};
use billing_core::models::InvoiceRecord;
use serde::de::Error as _;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Invoice directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Parse listing text: a JSON array of invoices or a single invoice object.
pub fn parse_listing(text: &str) -> Result<Vec<InvoiceRecord>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        other => Err(BillingError::JsonParse(serde_json::Error::custom(format!(
            "expected an invoice array or object, found {}",
            json_kind(&other)
        )))),
    }
}

/// Load the invoice listing at `path`.
///
/// A file must parse cleanly; any error is returned. In a directory, files
/// that cannot be read or parsed are logged and skipped, and invoices from
/// the remaining files are concatenated in path order. A directory where
/// every file fails is an error.
pub fn load_invoices(path: &Path) -> Result<Vec<InvoiceRecord>> {
    if !path.exists() {
        return Err(BillingError::SourceNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        let invoices = load_file(path)?;
        debug!("Loaded {} invoices from {}", invoices.len(), path.display());
        return Ok(invoices);
    }

    let files = find_json_files(path);
    if files.is_empty() {
        return Err(BillingError::NoInvoiceFiles(path.to_path_buf()));
    }

    let mut invoices = Vec::new();
    let mut skipped_files = 0usize;
    for file in &files {
        match load_file(file) {
            Ok(batch) => invoices.extend(batch),
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                skipped_files += 1;
            }
        }
    }

    if skipped_files == files.len() {
        return Err(BillingError::NoReadableInvoiceFiles {
            dir: path.to_path_buf(),
            files: files.len(),
        });
    }

    debug!(
        "Loaded {} invoices from {} files ({} skipped) under {}",
        invoices.len(),
        files.len(),
        skipped_files,
        path.display()
    );

    Ok(invoices)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn load_file(path: &Path) -> Result<Vec<InvoiceRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| BillingError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listing(&text)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    fn invoice_json(date: &str, client: &str) -> serde_json::Value {
        serde_json::json!({
            "data": date,
            "valoresFaturados": [
                {"tipo": "Energia Elétrica", "quantidade": "100", "valorTotal": "50"},
                {"tipo": "Energia SCEE s/ ICMS", "quantidade": "20", "valorTotal": "10"}
            ],
            "energiaCompensada": {"quantidade": "15", "valorTotal": "7.5"},
            "contribuicaoIlumPublica": {"valorTotal": "2"},
            "clientNumber": client,
            "clientName": "Cliente",
            "fileName": format!("{}-{}.pdf", client, date)
        })
    }

    // ── parse_listing ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_listing_array() {
        let text = serde_json::json!([
            invoice_json("2024-01-01", "1"),
            invoice_json("2024-02-01", "2")
        ])
        .to_string();
        let invoices = parse_listing(&text).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[1].client_number, "2");
    }

    #[test]
    fn test_parse_listing_single_object() {
        let text = invoice_json("2024-01-01", "1").to_string();
        let invoices = parse_listing(&text).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].date, "2024-01-01");
    }

    #[test]
    fn test_parse_listing_empty_array() {
        assert!(parse_listing("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_scalar() {
        let err = parse_listing("42").unwrap_err();
        assert!(err.to_string().contains("found a number"));
    }

    #[test]
    fn test_parse_listing_null_figure_on_other_item() {
        let mut fined = invoice_json("2024-02-01", "2");
        fined["valoresFaturados"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"tipo": "Multa", "quantidade": null, "valorTotal": "3.10"}));
        let text = serde_json::json!([invoice_json("2024-01-01", "1"), fined]).to_string();

        let invoices = parse_listing(&text).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[1].billed_values[2].quantity.as_str(), "null");
    }

    #[test]
    fn test_parse_listing_rejects_malformed() {
        assert!(matches!(
            parse_listing("[{bad"),
            Err(BillingError::JsonParse(_))
        ));
    }

    // ── find_json_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_json_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2024");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "b.json", "[]");
        write_file(dir.path(), "a.json", "[]");
        write_file(&sub, "c.json", "[]");
        write_file(dir.path(), "notes.txt", "ignored");

        let files = find_json_files(dir.path());
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("2024/c.json"));
        assert!(files[1].ends_with("a.json"));
        assert!(files[2].ends_with("b.json"));
    }

    #[test]
    fn test_find_json_files_nonexistent_path() {
        let files = find_json_files(Path::new("/tmp/does-not-exist-energy-dashboard-xyz"));
        assert!(files.is_empty());
    }

    // ── load_invoices ─────────────────────────────────────────────────────────

    #[test]
    fn test_load_invoices_from_file() {
        let dir = TempDir::new().unwrap();
        let text = serde_json::json!([invoice_json("2024-01-01", "7202")]).to_string();
        let path = write_file(dir.path(), "invoices.json", &text);

        let invoices = load_invoices(&path).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].client_number, "7202");
    }

    #[test]
    fn test_load_invoices_file_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "invoices.json", "{not json");
        assert!(load_invoices(&path).is_err());
    }

    #[test]
    fn test_load_invoices_missing_source() {
        let err = load_invoices(Path::new("/tmp/energy-dashboard-missing.json")).unwrap_err();
        assert!(matches!(err, BillingError::SourceNotFound(_)));
    }

    #[test]
    fn test_load_invoices_from_directory() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "a.json",
            &serde_json::json!([
                invoice_json("2024-01-01", "1"),
                invoice_json("2024-02-01", "1")
            ])
            .to_string(),
        );
        write_file(
            dir.path(),
            "b.json",
            &invoice_json("2024-03-01", "2").to_string(),
        );

        let invoices = load_invoices(dir.path()).unwrap();
        let dates: Vec<&str> = invoices.iter().map(|i| i.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn test_load_invoices_directory_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.json", "{broken");
        write_file(
            dir.path(),
            "b.json",
            &invoice_json("2024-03-01", "2").to_string(),
        );

        let invoices = load_invoices(dir.path()).unwrap();
        assert_eq!(invoices.len(), 1);
    }

    #[test]
    fn test_load_invoices_directory_all_files_bad() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.json", "{broken");
        write_file(dir.path(), "b.json", "42");

        let err = load_invoices(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BillingError::NoReadableInvoiceFiles { files: 2, .. }
        ));
    }

    #[test]
    fn test_load_invoices_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = load_invoices(dir.path()).unwrap_err();
        assert!(matches!(err, BillingError::NoInvoiceFiles(_)));
    }
}

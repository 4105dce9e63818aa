use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// Write a whole table to `path`, replacing any previous file.
///
/// Rows go to a sibling `.tmp` file first and are renamed into place, so a
/// failed run never leaves a half-written table behind.
pub fn write_csv<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    let written = {
        let mut wtr = csv::Writer::from_path(&tmp)?;
        let mut n = 0usize;
        for row in rows {
            wtr.serialize(row)?;
            n += 1;
        }
        wtr.flush()?;
        n
    };
    fs::rename(&tmp, path)?;

    debug!("[TABLE] wrote {written} rows to {}", path.display());
    Ok(written)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        a: u32,
        b: &'static str,
    }

    #[test]
    fn replaces_existing_file_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale contents that are longer than the new table\n").unwrap();

        let n = write_csv(&path, [Row { a: 1, b: "x" }, Row { a: 2, b: "y" }]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,x\n2,y\n");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");
        write_csv(&path, [Row { a: 7, b: "z" }]).unwrap();
        assert!(path.exists());
    }
}

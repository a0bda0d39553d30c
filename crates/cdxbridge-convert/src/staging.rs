use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

/// CDXML markup written to a temporary `.cdxml` file.
///
/// The file exists for as long as this value does. Dropping it deletes the
/// file, whether conversion succeeded, failed, or unwound.
#[derive(Debug)]
pub struct StagedMarkup {
    markup: String,
    path: TempPath,
}

impl StagedMarkup {
    /// Write `markup` to a fresh temporary file in `dir`, or in the OS
    /// temporary directory when `dir` is `None`.
    pub fn stage(markup: &str, dir: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("cdxbridge-").suffix(".cdxml");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(markup.as_bytes())?;
        file.flush()?;

        // Close our handle so converters on any platform can open the file.
        let path = file.into_temp_path();
        tracing::trace!(path = %path.display(), bytes = markup.len(), "staged markup");

        Ok(Self {
            markup: markup.to_string(),
            path,
        })
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The staged markup text.
    pub fn markup(&self) -> &str {
        &self.markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_holds_markup() {
        let staged = StagedMarkup::stage("<CDXML></CDXML>", None).unwrap();
        assert_eq!(
            std::fs::read_to_string(staged.path()).unwrap(),
            "<CDXML></CDXML>"
        );
        assert_eq!(
            staged.path().extension().and_then(|e| e.to_str()),
            Some("cdxml")
        );
        assert_eq!(staged.markup(), "<CDXML></CDXML>");
    }

    #[test]
    fn drop_removes_file() {
        let staged = StagedMarkup::stage("<CDXML/>", None).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn stages_into_requested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedMarkup::stage("<CDXML/>", Some(dir.path())).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));
    }

    #[test]
    fn missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(StagedMarkup::stage("<CDXML/>", Some(&missing)).is_err());
    }
}

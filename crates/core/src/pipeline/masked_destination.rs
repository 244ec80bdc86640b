use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

const ORIGINALS_DIR: &str = "originals";
const MASKED_DIR: &str = "masked";

/// Where the redacted copy of `source` is stored.
///
/// The last `originals` directory component is swapped for `masked`
/// (`uploads/originals/x.jpg` → `uploads/masked/x.jpg`). Sources outside an
/// `originals` tree go to a `masked` directory beside them.
pub fn masked_destination(source: &Path) -> PathBuf {
    let components: Vec<Component<'_>> = source.components().collect();
    let dir_count = components.len().saturating_sub(1);
    let originals = components[..dir_count]
        .iter()
        .rposition(|c| c.as_os_str() == OsStr::new(ORIGINALS_DIR));

    match originals {
        Some(idx) => components
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == idx {
                    OsStr::new(MASKED_DIR)
                } else {
                    c.as_os_str()
                }
            })
            .collect(),
        None => {
            let parent = source.parent().unwrap_or_else(|| Path::new(""));
            let name = source.file_name().unwrap_or_else(|| OsStr::new(""));
            parent.join(MASKED_DIR).join(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::relative("uploads/originals/wallet.jpg", "uploads/masked/wallet.jpg")]
    #[case::absolute("/srv/data/originals/a/b.png", "/srv/data/masked/a/b.png")]
    #[case::last_originals_wins("originals/x/originals/y.jpg", "originals/x/masked/y.jpg")]
    #[case::no_originals("photos/wallet.jpg", "photos/masked/wallet.jpg")]
    #[case::bare_file("wallet.jpg", "masked/wallet.jpg")]
    #[case::file_named_originals("photos/originals", "photos/masked/originals")]
    fn test_masked_destination(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(masked_destination(Path::new(source)), PathBuf::from(expected));
    }
}

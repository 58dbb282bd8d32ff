//! File access shared by the loaders.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{PhoneticError, Result};

/// Read a whole file, mapping a missing file to `ResourceUnavailable`.
pub(crate) fn read_resource(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PhoneticError::ResourceUnavailable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        },
        _ => PhoneticError::io(path, e),
    })
}

//! Template file loading.

use std::collections::HashMap;
use std::path::Path;

use crate::error::TemplateError;
use crate::expand::expand_macros;

/// Read a template file, join `\`-newline line continuations, and expand
/// `@KEY@` macros.
///
/// # Errors
///
/// [`TemplateError::ReadFile`] if the file cannot be read — unlike
/// settings candidates, a missing template is fatal: there is nothing to
/// build a graph from.
pub fn read_template(
    path: impl AsRef<Path>,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let path = path.as_ref();
    let raw =
        std::fs::read_to_string(path).map_err(|e| TemplateError::read_file(path, e))?;
    let joined = raw.replace("\\\n", "");
    Ok(expand_macros(&joined, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn joins_continuations_and_expands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.pipe");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "@SRC@ ! \\").unwrap();
        writeln!(f, "sink").unwrap();

        let values = HashMap::from([("SRC".to_string(), "testsrc".to_string())]);
        let text = read_template(&path, &values).unwrap();
        assert_eq!(text, "testsrc ! sink\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_template("/nonexistent/live.pipe", &HashMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::ReadFile { .. }));
    }
}

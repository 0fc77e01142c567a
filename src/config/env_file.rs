//! `.env` style files and the process environment
//!
//! File syntax is whatever `dotenvy` accepts: `KEY=VALUE` lines, `#`
//! comments, `export ` prefixes and quoted values. Variables are not exported
//! into the process; they are returned as a map and merged by the caller.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::cli::{CliError, CliResult};

fn env_file_error(path: &Path, e: dotenvy::Error) -> CliError {
    CliError::config_error(format!("Failed to read env file {}: {}", path.display(), e))
}

/// Read an env file, later lines winning
///
/// A missing file is an error only when `required`; otherwise it reads as empty.
pub fn read_env_file(path: &Path, required: bool) -> CliResult<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() && !required => return Ok(HashMap::new()),
        Err(e) => return Err(env_file_error(path, e)),
    };

    let mut vars = HashMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(|e| env_file_error(path, e))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Process environment entries that are valid UTF-8
///
/// Entries with a non-UTF-8 key or value are skipped. None of them can be a
/// setting the bot reads.
pub fn process_vars() -> impl Iterator<Item = (String, String)> {
    env::vars_os().filter_map(|(key, value)| {
        Some((key.into_string().ok()?, value.into_string().ok()?))
    })
}

/// Overlay `process` on top of `file`; process values win
pub fn merge_vars(
    file: HashMap<String, String>,
    process: impl IntoIterator<Item = (String, String)>,
) -> HashMap<String, String> {
    let mut vars = file;
    vars.extend(process);
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_basic() {
        let file = env_file(
            "# bot\nBOT_TOKEN=abc\n\nexport CHANNEL_ID=42\nSERVER_NAME=\"Kota RP\"\nLOGO_URL='x'\n",
        );
        let vars = read_env_file(file.path(), true).unwrap();

        assert_eq!(vars["BOT_TOKEN"], "abc");
        assert_eq!(vars["CHANNEL_ID"], "42");
        assert_eq!(vars["SERVER_NAME"], "Kota RP");
        assert_eq!(vars["LOGO_URL"], "x");
    }

    #[test]
    fn test_empty_value_and_quoted_hash() {
        let file = env_file("WEBHOOK_URL=\nSERVER_NAME=\"A # B\"\n");
        let vars = read_env_file(file.path(), true).unwrap();

        assert_eq!(vars["WEBHOOK_URL"], "");
        assert_eq!(vars["SERVER_NAME"], "A # B");
    }

    #[test]
    fn test_malformed_line_is_config_error() {
        let file = env_file("BOT_TOKEN=a\nnot a pair\n");
        let err = read_env_file(file.path(), true).unwrap_err();
        assert_eq!(err.code_str(), "BOT_CLI_CONFIG_ERROR");
        assert!(err.message().contains("env file"));
    }

    #[test]
    fn test_read_missing_file() {
        let path = Path::new("/nonexistent/statusbot.env");
        assert!(read_env_file(path, false).unwrap().is_empty());
        assert!(read_env_file(path, true).is_err());
    }

    #[test]
    fn test_read_file_and_merge() {
        let file = env_file("BOT_TOKEN=from-file\nCHANNEL_ID=1\n");

        let from_file = read_env_file(file.path(), true).unwrap();
        let merged = merge_vars(
            from_file,
            vec![("BOT_TOKEN".to_string(), "from-env".to_string())],
        );

        assert_eq!(merged["BOT_TOKEN"], "from-env");
        assert_eq!(merged["CHANNEL_ID"], "1");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_vars_skips_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("STATUSBOT_TEST_NON_UTF8", OsStr::from_bytes(&[0xFF, 0xFE]));
        env::set_var("STATUSBOT_TEST_PLAIN", "ok");

        let vars: HashMap<String, String> = process_vars().collect();
        env::remove_var("STATUSBOT_TEST_NON_UTF8");
        env::remove_var("STATUSBOT_TEST_PLAIN");

        assert!(!vars.contains_key("STATUSBOT_TEST_NON_UTF8"));
        assert_eq!(vars["STATUSBOT_TEST_PLAIN"], "ok");
    }
}

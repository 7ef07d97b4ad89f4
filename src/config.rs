//! @dose
//! purpose: Configuration file parsing for pxdgen.toml. Holds input/output locations,
//!     the aggregate header settings, unit filters, and the normalizer tables.
//!
//! when-editing:
//!     - !Config is loaded once at startup and passed through the call chain
//!     - !NormalizeConfig is injected into the Normalizer; never hardcode its tables elsewhere
//!     - CLI directory flags override the values loaded here (see cli::args)
//!
//! invariants:
//!     - Config::load returns default config if pxdgen.toml doesn't exist
//!     - Every table uses serde(default) so partial files are valid
//!     - Reserved identifier tables iterate in sorted key order (BTreeMap) for reproducible logs
//!
//! gotchas:
//!     - Paths are relative to the project root unless absolute
//!     - An explicitly passed --config must exist and parse; the implicit file only warns

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the implicit configuration file in the project root
pub const CONFIG_FILE_NAME: &str = "pxdgen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },
    #[error("Reserved identifier '{0}' is not a valid C identifier")]
    ReservedIdentifier(String),
}

/// Main configuration structure matching pxdgen.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the .rst documentation units
    pub doc_dir: PathBuf,

    /// Directory holding the native headers matched against units
    pub include_dir: PathBuf,

    /// Directory the generated files are written to
    pub output_dir: PathBuf,

    /// Directory with hand-written `<unit>_macros.pxd` fragments
    pub fragments_dir: PathBuf,

    /// Library name used in distutils lines and include paths
    pub library: String,

    /// File name of the umbrella aggregate header
    pub wrap_header: String,

    /// Headers always appended to the aggregate list
    pub extra_headers: Vec<String>,

    /// Glob patterns over unit file names to skip
    pub exclude: Vec<String>,

    /// Lines emitted after the generated-file banner of every .pxd
    pub preamble_imports: Vec<String>,

    pub templates: TemplateConfig,

    /// Additional headers some units need before they can be emitted
    pub requires: Vec<Requirement>,

    pub normalize: NormalizeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_dir: PathBuf::from("doc/source"),
            include_dir: PathBuf::from("include"),
            output_dir: PathBuf::from("pxd_headers"),
            fragments_dir: PathBuf::from("macros"),
            library: "flint".to_string(),
            wrap_header: "flint_wrap.h".to_string(),
            extra_headers: vec!["nmod_types.h".to_string()],
            exclude: Vec::new(),
            preamble_imports: vec![
                "from libc.stdio cimport FILE".to_string(),
                "from sage.libs.gmp.types cimport *".to_string(),
                "from sage.libs.mpfr.types cimport *".to_string(),
                "from sage.libs.flint.types cimport *".to_string(),
            ],
            templates: TemplateConfig::default(),
            requires: Vec::new(),
            normalize: NormalizeConfig::default(),
        }
    }
}

/// Template files for the two aggregate outputs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template of the umbrella header
    pub wrap: PathBuf,
    /// Template of types.pxd
    pub types: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            wrap: PathBuf::from("flint_wrap.h.template"),
            types: PathBuf::from("types.pxd.template"),
        }
    }
}

/// A unit that may only be emitted if another header is installed
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Unit name (file stem of the .rst)
    pub unit: String,
    /// Header that must exist in include_dir
    pub header: String,
}

/// Tables driving signature and documentation cleanup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Plain textual replacements applied to every signature line, in order
    pub signature_replacements: Vec<(String, String)>,

    /// Parameter names that collide with target-language keywords
    pub reserved: BTreeMap<String, String>,

    /// Plain textual replacements applied to every documentation line, in order
    pub doc_escapes: Vec<(String, String)>,

    /// Substrings marking a signature as variadic
    pub variadic_markers: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            signature_replacements: vec![
                ("(void)".to_string(), "()".to_string()),
                (" enum ".to_string(), " ".to_string()),
            ],
            reserved: BTreeMap::from([
                ("in".to_string(), "input".to_string()),
                ("iter".to_string(), "it".to_string()),
                ("lambda".to_string(), "lmbda".to_string()),
            ]),
            doc_escapes: vec![("\\choose ".to_string(), "choose ".to_string())],
            variadic_markers: vec!["va_list ".to_string(), "...".to_string()],
        }
    }
}

impl NormalizeConfig {
    /// An empty configuration: no replacements, no reserved names, no variadic markers
    pub fn empty() -> Self {
        Self {
            signature_replacements: Vec::new(),
            reserved: BTreeMap::new(),
            doc_escapes: Vec::new(),
            variadic_markers: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from pxdgen.toml in the given root directory
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Self::default();
        }

        match Self::from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path. Missing or invalid files are errors.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve a configured path against the project root
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// Additional header a unit requires, if any
    pub fn requirement_for(&self, unit: &str) -> Option<&str> {
        self.requires
            .iter()
            .find(|r| r.unit == unit)
            .map(|r| r.header.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.library, "flint");
        assert_eq!(config.wrap_header, "flint_wrap.h");
        assert_eq!(config.extra_headers, vec!["nmod_types.h"]);
        assert_eq!(config.preamble_imports.len(), 4);
        assert!(config.exclude.is_empty());
        assert_eq!(config.normalize.reserved.get("in").unwrap(), "input");
        assert_eq!(
            config.normalize.signature_replacements[0],
            ("(void)".to_string(), "()".to_string())
        );
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path());
        assert_eq!(config.doc_dir, PathBuf::from("doc/source"));
        assert_eq!(config.output_dir, PathBuf::from("pxd_headers"));
    }

    #[test]
    fn test_load_basic_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"
doc_dir = "flint2/doc/source"
include_dir = "/usr/include/flint"
library = "arb"
extra_headers = []
exclude = ["*_internal.rst"]

[[requires]]
unit = "machine_vectors"
header = "fft_small.h"
"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let config = Config::load(temp_dir.path());
        assert_eq!(config.doc_dir, PathBuf::from("flint2/doc/source"));
        assert_eq!(config.include_dir, PathBuf::from("/usr/include/flint"));
        assert_eq!(config.library, "arb");
        assert!(config.extra_headers.is_empty());
        assert_eq!(config.exclude, vec!["*_internal.rst"]);
        assert_eq!(config.requirement_for("machine_vectors"), Some("fft_small.h"));
        assert_eq!(config.requirement_for("fmpz"), None);
        // Untouched tables keep their defaults
        assert_eq!(config.wrap_header, "flint_wrap.h");
        assert_eq!(config.normalize.reserved.len(), 3);
    }

    #[test]
    fn test_load_normalize_tables() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"
[normalize]
signature_replacements = [["(void)", "()"]]
doc_escapes = []
variadic_markers = ["va_list "]

[normalize.reserved]
in = "input_"
"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let config = Config::load(temp_dir.path());
        assert_eq!(config.normalize.signature_replacements.len(), 1);
        assert!(config.normalize.doc_escapes.is_empty());
        assert_eq!(config.normalize.variadic_markers, vec!["va_list "]);
        assert_eq!(config.normalize.reserved.len(), 1);
        assert_eq!(config.normalize.reserved["in"], "input_");
    }

    #[test]
    fn test_load_invalid_config_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "library = [").unwrap();
        let config = Config::load(temp_dir.path());
        assert_eq!(config.library, "flint");
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "library = [").unwrap();
        assert!(matches!(
            Config::from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("/project");
        assert_eq!(
            Config::resolve(root, Path::new("doc")),
            PathBuf::from("/project/doc")
        );
        assert_eq!(
            Config::resolve(root, Path::new("/usr/include")),
            PathBuf::from("/usr/include")
        );
    }
}

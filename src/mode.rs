use serde::Deserialize;

/// Output layout knobs for the reindenter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatOptions {
    /// One level of indentation.
    #[serde(default = "default_indent")]
    pub indent: String,

    #[serde(default = "default_newline")]
    pub newline: String,

    /// Separator between tokens on the same line.
    #[serde(default = "default_whitespace")]
    pub whitespace: String,

    /// Prefix written at the start of every line.
    #[serde(default)]
    pub padding: String,
}

fn default_indent() -> String {
    "  ".to_string()
}
fn default_newline() -> String {
    "\n".to_string()
}
fn default_whitespace() -> String {
    " ".to_string()
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            newline: default_newline(),
            whitespace: default_whitespace(),
            padding: String::new(),
        }
    }
}

/// Mode holds all run configuration: layout options plus file handling.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    #[serde(default)]
    pub options: FormatOptions,

    /// Write results back to the source files.
    #[serde(default)]
    pub write: bool,

    #[serde(default)]
    pub diff: bool,

    /// Only list files whose formatting would change.
    #[serde(default)]
    pub list: bool,

    #[serde(default)]
    pub check: bool,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Go method names whose raw-string SQL arguments are reindented.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_color: bool,
}

fn default_methods() -> Vec<String> {
    ["Exec", "Query", "QueryRow"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

impl Mode {
    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.no_color {
            return false;
        }
        std::env::var_os("NO_COLOR").is_none()
    }

    /// Whether formatted text goes to stdout rather than files or reports.
    pub fn prints_output(&self) -> bool {
        !self.write && !self.diff && !self.list && !self.check
    }

    /// File extensions holding whole SQL documents.
    pub fn sql_extensions(&self) -> &[&str] {
        &["sql"]
    }

    /// File extensions whose SQL lives in string literals.
    pub fn embedded_extensions(&self) -> &[&str] {
        &["go"]
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            options: FormatOptions::default(),
            write: false,
            diff: false,
            list: false,
            check: false,
            exclude: Vec::new(),
            methods: default_methods(),
            threads: 0,
            single_process: false,
            verbose: false,
            quiet: false,
            no_color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = FormatOptions::default();
        assert_eq!(options.indent, "  ");
        assert_eq!(options.newline, "\n");
        assert_eq!(options.whitespace, " ");
        assert_eq!(options.padding, "");
    }

    #[test]
    fn test_default_mode() {
        let mode = Mode::default();
        assert_eq!(mode.methods, vec!["Exec", "Query", "QueryRow"]);
        assert!(mode.prints_output());
        assert!(!mode.check);
    }

    #[test]
    fn test_prints_output() {
        let mut mode = Mode::default();
        mode.list = true;
        assert!(!mode.prints_output());
    }

    #[test]
    fn test_no_color() {
        let mut mode = Mode::default();
        mode.no_color = true;
        assert!(!mode.color());
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: FormatOptions = toml::from_str("indent = \"\\t\"").unwrap();
        assert_eq!(options.indent, "\t");
        assert_eq!(options.newline, "\n");
    }
}

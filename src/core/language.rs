//! Language detection for file rows in the dropdown.
//!
//! # Public API
//! - [`Language`]: Closed set of recognised languages plus `Unknown`
//! - [`Language::from_path`]: Detect from the file extension (or well-known name)
//! - [`Language::paint`]: Apply the language color to text

use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Java,
    Kotlin,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    Shell,
    Html,
    Xml,
    Css,
    Vue,
    Svelte,
    Dart,
    Json,
    Yaml,
    Toml,
    Markdown,
    Sql,
    Docker,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Self::Rust,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "py" | "pyi" => Self::Python,
            "go" => Self::Go,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "sh" | "bash" | "zsh" | "fish" => Self::Shell,
            "html" | "htm" => Self::Html,
            "xml" | "svg" => Self::Xml,
            "vue" => Self::Vue,
            "svelte" => Self::Svelte,
            "dart" => Self::Dart,
            "css" | "scss" | "sass" | "less" => Self::Css,
            "json" | "jsonc" => Self::Json,
            "yml" | "yaml" => Self::Yaml,
            "toml" => Self::Toml,
            "md" | "markdown" | "mdx" => Self::Markdown,
            "sql" => Self::Sql,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        if name.eq_ignore_ascii_case("dockerfile") {
            return Self::Docker;
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self::from_extension(ext),
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Python => "Python",
            Self::Go => "Go",
            Self::Java => "Java",
            Self::Kotlin => "Kotlin",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Swift => "Swift",
            Self::Shell => "Shell",
            Self::Html => "HTML",
            Self::Xml => "XML",
            Self::Vue => "Vue",
            Self::Svelte => "Svelte",
            Self::Dart => "Dart",
            Self::Css => "CSS",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Markdown => "Markdown",
            Self::Sql => "SQL",
            Self::Docker => "Dockerfile",
            Self::Unknown => "Text",
        }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::Rust => text.truecolor(222, 165, 132),
            Self::JavaScript => text.yellow(),
            Self::TypeScript | Self::Go => text.blue(),
            Self::Python => text.bright_blue(),
            Self::Java | Self::Swift => text.bright_red(),
            Self::Kotlin | Self::CSharp => text.magenta(),
            Self::C | Self::Cpp => text.bright_black(),
            Self::Ruby => text.red(),
            Self::Php => text.bright_magenta(),
            Self::Shell => text.green(),
            Self::Html | Self::Xml => text.bright_yellow(),
            Self::Vue => text.bright_green(),
            Self::Svelte => text.truecolor(255, 62, 0),
            Self::Dart => text.bright_cyan().bold(),
            Self::Css => text.purple(),
            Self::Json | Self::Yaml | Self::Toml => text.cyan(),
            Self::Markdown => text.white(),
            Self::Sql => text.bright_cyan(),
            Self::Docker => text.bright_blue().bold(),
            Self::Unknown => text.normal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("web/App.TSX"), Language::TypeScript);
        assert_eq!(Language::from_path("Dockerfile"), Language::Docker);
        assert_eq!(Language::from_path("ops/dockerfile"), Language::Docker);
        assert_eq!(Language::from_path("lib/include/x.hpp"), Language::Cpp);
    }

    #[test]
    fn test_unknown_and_dotfiles() {
        assert_eq!(Language::from_path("LICENSE"), Language::Unknown);
        assert_eq!(Language::from_path(".gitignore"), Language::Unknown);
        assert_eq!(Language::from_path("data.bin"), Language::Unknown);
        assert_eq!(Language::Unknown.name(), "Text");
    }
}

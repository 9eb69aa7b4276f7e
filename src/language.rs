use std::path::Path;

/// Kinds of files that carry topper headers
///
/// Each variant is identified by file extension only; the header itself is
/// found by text search, so no per-language comment syntax is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Shell,
    Markdown,
    /// Not a recognized source file
    Unknown,
}

const KNOWN: [Language; 10] = [
    Language::Rust,
    Language::C,
    Language::Cpp,
    Language::Java,
    Language::JavaScript,
    Language::TypeScript,
    Language::Python,
    Language::Go,
    Language::Shell,
    Language::Markdown,
];

impl Language {
    /// File extensions (without the dot)
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Rust => &["rs"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hxx", "hh"],
            Language::Java => &["java"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Python => &["py", "pyi"],
            Language::Go => &["go"],
            Language::Shell => &["sh", "bash", "zsh"],
            Language::Markdown => &["md", "markdown"],
            Language::Unknown => &[],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Language::Rust => "Rust",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Go => "Go",
            Language::Shell => "Shell",
            Language::Markdown => "Markdown",
            Language::Unknown => "Unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the language of a file from its extension
///
/// # Examples
/// ```
/// use topper_watcher::{Language, detect_language};
/// assert_eq!(detect_language("main.rs"), Language::Rust);
/// assert_eq!(detect_language("header.hpp"), Language::Cpp);
/// assert_eq!(detect_language("README"), Language::Unknown);
/// ```
pub fn detect_language<P: AsRef<Path>>(path: P) -> Language {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    KNOWN
        .iter()
        .copied()
        .find(|language| language.extensions().contains(&extension))
        .unwrap_or(Language::Unknown)
}

/// Decides which files the filesystem watcher treats as documents
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extra_extensions: Vec<String>,
}

impl FileFilter {
    /// Accept known languages plus `extra_extensions` (with or without the dot)
    pub fn new<I, S>(extra_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra_extensions: extra_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    pub fn accepts<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        if detect_language(path).is_supported() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extra_extensions.iter().any(|extra| extra == ext))
    }
}

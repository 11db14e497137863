//! Extension-to-handler classification.

use super::WorkItem;
use crate::errors::ClassificationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substring that makes a simulated handler report failure.
pub const DEFAULT_FAILURE_MARKER: &str = "Error";

/// Identifies the handler responsible for a kind of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerId {
    /// `.java`
    Java,
    /// `.py`
    Python,
    /// `.js`
    JavaScript,
    /// `.ts`
    TypeScript,
    /// `.c`
    C,
    /// `.cpp`
    Cpp,
    /// `.cs`
    CSharp,
    /// `.rb`
    Ruby,
    /// `.php`
    Php,
    /// `.swift`
    Swift,
    /// `.go`
    Go,
    /// `.kt`
    Kotlin,
    /// `.rs`
    Rust,
    /// `.sh`
    Bash,
    /// `.r`
    R,
    /// `.pl`
    Perl,
    /// `.scala`
    Scala,
    /// `.dart`
    Dart,
    /// `.hs`
    Haskell,
    /// `.ex`
    Elixir,
}

/// The closed extension table. Lookups are case-sensitive.
const EXTENSIONS: &[(&str, HandlerId)] = &[
    ("java", HandlerId::Java),
    ("py", HandlerId::Python),
    ("js", HandlerId::JavaScript),
    ("ts", HandlerId::TypeScript),
    ("c", HandlerId::C),
    ("cpp", HandlerId::Cpp),
    ("cs", HandlerId::CSharp),
    ("rb", HandlerId::Ruby),
    ("php", HandlerId::Php),
    ("swift", HandlerId::Swift),
    ("go", HandlerId::Go),
    ("kt", HandlerId::Kotlin),
    ("rs", HandlerId::Rust),
    ("sh", HandlerId::Bash),
    ("r", HandlerId::R),
    ("pl", HandlerId::Perl),
    ("scala", HandlerId::Scala),
    ("dart", HandlerId::Dart),
    ("hs", HandlerId::Haskell),
    ("ex", HandlerId::Elixir),
];

/// Returns the extension table.
#[must_use]
pub fn extensions() -> &'static [(&'static str, HandlerId)] {
    EXTENSIONS
}

/// Classifies a work item name by the suffix after its last `.`.
///
/// # Errors
///
/// Returns an `UnsupportedFileType` error for a missing or unknown extension.
pub fn classify(name: &str) -> Result<HandlerId, ClassificationError> {
    WorkItem::new(name)
        .extension()
        .and_then(HandlerId::for_extension)
        .ok_or_else(|| ClassificationError::unsupported(name))
}

impl HandlerId {
    /// Looks up the handler for an extension (without the dot).
    #[must_use]
    pub fn for_extension(extension: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, id)| *id)
    }

    /// Every handler id, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        EXTENSIONS.iter().map(|(_, id)| *id)
    }

    /// The language or tool name.
    #[must_use]
    pub fn language(&self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Swift => "Swift",
            Self::Go => "Go",
            Self::Kotlin => "Kotlin",
            Self::Rust => "Rust",
            Self::Bash => "Bash",
            Self::R => "R",
            Self::Perl => "Perl",
            Self::Scala => "Scala",
            Self::Dart => "Dart",
            Self::Haskell => "Haskell",
            Self::Elixir => "Elixir",
        }
    }

    /// Narration line for processing `file`, e.g. `Compiling Java file: A.java`.
    #[must_use]
    pub fn narration(&self, file: &str) -> String {
        let (verb, noun) = match self {
            Self::Java
            | Self::C
            | Self::Cpp
            | Self::CSharp
            | Self::Swift
            | Self::Go
            | Self::Kotlin
            | Self::Rust
            | Self::Scala
            | Self::Dart
            | Self::Haskell => ("Compiling", "file"),
            Self::TypeScript => ("Transpiling", "file"),
            Self::Bash | Self::R | Self::Perl => ("Running", "script"),
            Self::Python | Self::JavaScript | Self::Ruby | Self::Php | Self::Elixir => {
                ("Running", "file")
            }
        };
        format!("{verb} {} {noun}: {file}", self.language())
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language())
    }
}

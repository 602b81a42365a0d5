//! Scanning of the study library on disk.
//!
//! An exam is a directory of chapters, and a chapter is a directory whose
//! name starts with a digit holding `.md` notes. Two layouts are recognised
//! under the library root:
//!
//! * `<root>/<exam>/<chapter>/*.md`
//! * `<root>/conteudo/<exam>/<chapter>/*.md` (legacy)

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub const LOGS_DIR: &str = "logs";
pub const RESULTS_FILE: &str = "results.csv";
pub const LEGACY_DIR: &str = "conteudo";

/// Separator placed between files when a whole chapter is used
pub const CHAPTER_SEPARATOR: &str = "\n\n---\n\n";

const EXCLUDED: &[&str] = &[
    "__pycache__",
    "venv",
    "env",
    "nenv",
    "target",
    LOGS_DIR,
    LEGACY_DIR,
];

/// A chapter directory starts with a digit
pub fn is_chapter_dir(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Heuristic used to tell exam directories from unrelated folders
pub fn looks_like_exam(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    if path.join(RESULTS_FILE).exists() {
        return true;
    }

    let has_direct = subdirs(path)
        .iter()
        .any(|d| d != LOGS_DIR && is_chapter_dir(d));

    let has_legacy = subdirs(&path.join(LEGACY_DIR))
        .iter()
        .any(|d| is_chapter_dir(d));

    has_direct || has_legacy
}

/// Names of the immediate subdirectories, empty if unreadable
fn subdirs(path: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect()
}

fn leading_number(name: &str) -> Option<u64> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    name[..end].parse().ok()
}

/// Numeric prefix first, unnumbered names last, then case-insensitive name
fn chapter_order(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

/// Library of exams rooted at a directory
#[derive(Debug, Clone)]
pub struct Library {
    pub root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn legacy_dir(&self) -> PathBuf {
        self.root.join(LEGACY_DIR)
    }

    /// All exams from both layouts, including empty directories so new
    /// exams can be started
    pub fn list_exams(&self) -> Vec<String> {
        let mut exams: Vec<String> = subdirs(&self.root)
            .into_iter()
            .filter(|d| !d.starts_with('.') && !EXCLUDED.contains(&d.as_str()))
            .collect();

        for d in subdirs(&self.legacy_dir()) {
            if !EXCLUDED.contains(&d.as_str()) && !exams.contains(&d) {
                exams.push(d);
            }
        }

        exams.sort_by_key(|a| a.to_lowercase());
        exams
    }

    /// Exams that hold chapters or results, for a tidier listing
    pub fn detected_exams(&self) -> Vec<String> {
        self.list_exams()
            .into_iter()
            .filter(|name| {
                looks_like_exam(&self.root.join(name))
                    || looks_like_exam(&self.legacy_dir().join(name))
            })
            .collect()
    }

    /// Directory holding `results.csv` and `logs/`
    pub fn exam_root(&self, exam: &str) -> PathBuf {
        let current = self.root.join(exam);
        let legacy = self.legacy_dir().join(exam);
        if current.is_dir() {
            current
        } else if legacy.is_dir() {
            legacy
        } else {
            current
        }
    }

    /// Directory holding the chapters, legacy layout first
    pub fn chapter_base(&self, exam: &str) -> PathBuf {
        let legacy = self.legacy_dir().join(exam);
        if legacy.is_dir() {
            legacy
        } else {
            self.root.join(exam)
        }
    }

    pub fn results_path(&self, exam: &str) -> PathBuf {
        self.exam_root(exam).join(RESULTS_FILE)
    }

    /// Create `logs/` and an empty `results.csv` if missing
    pub fn ensure_structure(&self, exam: &str) -> Result<PathBuf> {
        let root = self.exam_root(exam);
        let logs = root.join(LOGS_DIR);
        std::fs::create_dir_all(&logs)
            .with_context(|| format!("Failed to create logs directory: {:?}", logs))?;

        let results = root.join(RESULTS_FILE);
        if !results.exists() {
            crate::storage::ResultsLog::create(&results)?;
            tracing::info!("Created {:?}", results);
        }

        Ok(root)
    }

    /// Scaffold a new exam in the current layout
    pub fn create_exam(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            anyhow::bail!("Invalid exam name: '{}'", name);
        }
        if EXCLUDED.contains(&name) {
            anyhow::bail!("'{}' is a reserved directory name", name);
        }

        let path = self.root.join(name);
        if path.exists() {
            anyhow::bail!("Exam '{}' already exists", name);
        }

        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create exam directory: {:?}", path))?;
        self.ensure_structure(name)
    }

    /// Chapter directories sorted by their numeric prefix
    pub fn chapters(&self, exam: &str) -> Vec<String> {
        let mut chapters: Vec<String> = subdirs(&self.chapter_base(exam))
            .into_iter()
            .filter(|d| d != LOGS_DIR && is_chapter_dir(d))
            .collect();
        chapters.sort_by(|a, b| chapter_order(a, b));
        chapters
    }

    pub fn chapter_dir(&self, exam: &str, chapter: &str) -> PathBuf {
        self.chapter_base(exam).join(chapter)
    }

    /// Markdown files of a chapter, sorted case-insensitively
    pub fn markdown_files(&self, exam: &str, chapter: &str) -> Vec<String> {
        let dir = self.chapter_dir(exam, chapter);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut files: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.to_lowercase().ends_with(".md"))
            .collect();

        files.sort_by_key(|a| a.to_lowercase());
        files
    }

    /// Content of one file, `None` if it does not exist
    pub fn read_file(&self, exam: &str, chapter: &str, file: &str) -> Result<Option<String>> {
        let path = self.chapter_dir(exam, chapter).join(file);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    /// All non-empty files of a chapter joined by a rule
    pub fn chapter_content(&self, exam: &str, chapter: &str) -> Result<String> {
        let mut parts = Vec::new();
        for file in self.markdown_files(exam, chapter) {
            if let Some(text) = self.read_file(exam, chapter, &file)?
                && !text.is_empty()
            {
                parts.push(text);
            }
        }
        Ok(parts.join(CHAPTER_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "simulado_library_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    fn touch(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_is_chapter_dir() {
        assert!(is_chapter_dir("1 - Intro"));
        assert!(is_chapter_dir("10_storage"));
        assert!(!is_chapter_dir("logs"));
        assert!(!is_chapter_dir(""));
    }

    #[test]
    fn test_list_exams_merges_layouts() {
        let root = scratch("list");
        std::fs::create_dir_all(root.join("dp900/1 - Core")).unwrap();
        std::fs::create_dir_all(root.join("Az104")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("logs")).unwrap();
        std::fs::create_dir_all(root.join("conteudo/ai900/1")).unwrap();
        std::fs::create_dir_all(root.join("conteudo/dp900")).unwrap();

        let lib = Library::new(&root);
        assert_eq!(lib.list_exams(), vec!["ai900", "Az104", "dp900"]);
        assert_eq!(lib.detected_exams(), vec!["ai900", "dp900"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_exam_with_nested_legacy_chapters_is_detected() {
        let root = scratch("nested");
        std::fs::create_dir_all(root.join("az104/conteudo/1 - Identity")).unwrap();
        std::fs::create_dir_all(root.join("az104/notes")).unwrap();
        std::fs::create_dir_all(root.join("misc/conteudo/drafts")).unwrap();

        assert!(looks_like_exam(&root.join("az104")));
        assert!(!looks_like_exam(&root.join("misc")));
        assert_eq!(Library::new(&root).detected_exams(), vec!["az104"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_legacy_layout_resolution() {
        let root = scratch("legacy");
        touch(&root.join("conteudo/ai900/2 - Vision/a.md"), "vision");
        let lib = Library::new(&root);

        assert_eq!(lib.chapter_base("ai900"), root.join("conteudo/ai900"));
        assert_eq!(lib.exam_root("ai900"), root.join("conteudo/ai900"));
        assert_eq!(lib.chapters("ai900"), vec!["2 - Vision"]);

        // A directory in the new layout takes over as exam root only
        std::fs::create_dir_all(root.join("ai900")).unwrap();
        assert_eq!(lib.exam_root("ai900"), root.join("ai900"));
        assert_eq!(lib.chapter_base("ai900"), root.join("conteudo/ai900"));

        // Unknown exams fall back to the new layout
        assert_eq!(lib.exam_root("nope"), root.join("nope"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_chapters_sorted_numerically() {
        let root = scratch("chapters");
        for name in ["10 - Ten", "2 - Two", "1 - One", "logs", "notes", "2 - abc"] {
            std::fs::create_dir_all(root.join("dp900").join(name)).unwrap();
        }
        let lib = Library::new(&root);
        assert_eq!(
            lib.chapters("dp900"),
            vec!["1 - One", "2 - abc", "2 - Two", "10 - Ten"]
        );
        assert!(lib.chapters("missing").is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_markdown_files_and_content() {
        let root = scratch("content");
        let chapter = root.join("dp900/1 - Core");
        touch(&chapter.join("b.md"), "Second");
        touch(&chapter.join("A.MD"), "First");
        touch(&chapter.join("empty.md"), "");
        touch(&chapter.join("image.png"), "x");
        std::fs::create_dir_all(chapter.join("sub.md")).unwrap();

        let lib = Library::new(&root);
        assert_eq!(
            lib.markdown_files("dp900", "1 - Core"),
            vec!["A.MD", "b.md", "empty.md"]
        );
        assert_eq!(
            lib.chapter_content("dp900", "1 - Core").unwrap(),
            "First\n\n---\n\nSecond"
        );
        assert_eq!(lib.read_file("dp900", "1 - Core", "gone.md").unwrap(), None);
        assert!(lib.markdown_files("dp900", "9 - Missing").is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_ensure_structure_is_idempotent() {
        let root = scratch("structure");
        let lib = Library::new(&root);
        lib.create_exam("dp900").unwrap();

        let results = root.join("dp900").join(RESULTS_FILE);
        std::fs::write(&results, "arquivo_md,data,hora,acertos,erros,total_perguntas\nx,2024-01-01,10:00:00,1,0,1\n").unwrap();
        lib.ensure_structure("dp900").unwrap();

        assert!(root.join("dp900/logs").is_dir());
        let text = std::fs::read_to_string(&results).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(looks_like_exam(&root.join("dp900")));
        assert!(lib.create_exam("dp900").is_err());
        assert!(lib.create_exam("../escape").is_err());

        let _ = std::fs::remove_dir_all(&root);
    }
}

//! Language hint resolution for file paths.

/// Well-known file names whose extension says nothing about their syntax.
/// Consulted before the extension.
const FILENAME_LANGUAGES: &[(&str, &str)] = &[
    (".gitignore", "ini"),
    (".gitattributes", "ini"),
    (".gitmodules", "ini"),
    (".editorconfig", "ini"),
    (".npmrc", "ini"),
    (".babelrc", "json"),
    (".eslintrc", "json"),
    (".prettierrc", "json"),
    (".bashrc", "bash"),
    (".zshrc", "bash"),
    (".profile", "bash"),
    ("Dockerfile", "dockerfile"),
    ("Containerfile", "dockerfile"),
    ("Makefile", "makefile"),
    ("GNUmakefile", "makefile"),
    ("CMakeLists.txt", "cmake"),
    ("Gemfile", "ruby"),
    ("Rakefile", "ruby"),
    ("Vagrantfile", "ruby"),
    ("Jenkinsfile", "groovy"),
    ("yarn.lock", "yaml"),
    ("pnpm-lock.yaml", "yaml"),
    ("package-lock.json", "json"),
    ("composer.lock", "json"),
    ("Cargo.lock", "toml"),
    ("Pipfile", "toml"),
    ("poetry.lock", "toml"),
];

/// Resolve the language hint for a path: the file-name table first, then
/// the lower-cased extension. `None` when neither applies.
pub fn language_for_path(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    if let Some((_, language)) = FILENAME_LANGUAGES
        .iter()
        .find(|(name, _)| *name == file_name)
    {
        return Some((*language).to_string());
    }

    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

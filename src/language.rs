/*!
 * Code fence labels for syntax highlighting
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

/// Label used when nothing better is known
pub const FALLBACK_LANGUAGE: &str = "plain text";

static EXTENSION_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Systems
        ("rs", "rust"),
        ("c", "c"),
        ("h", "c"),
        ("cc", "cpp"),
        ("cpp", "cpp"),
        ("cxx", "cpp"),
        ("hpp", "cpp"),
        ("hh", "cpp"),
        ("go", "go"),
        ("zig", "zig"),
        ("swift", "swift"),
        ("m", "objectivec"),
        // JVM / .NET
        ("java", "java"),
        ("kt", "kotlin"),
        ("kts", "kotlin"),
        ("scala", "scala"),
        ("groovy", "groovy"),
        ("gradle", "groovy"),
        ("cs", "csharp"),
        ("fs", "fsharp"),
        ("vb", "vbnet"),
        ("csproj", "xml"),
        // Scripting
        ("py", "python"),
        ("pyi", "python"),
        ("rb", "ruby"),
        ("php", "php"),
        ("pl", "perl"),
        ("lua", "lua"),
        ("r", "r"),
        ("jl", "julia"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("erl", "erlang"),
        ("hs", "haskell"),
        ("ml", "ocaml"),
        ("clj", "clojure"),
        ("dart", "dart"),
        // Shells
        ("sh", "bash"),
        ("bash", "bash"),
        ("zsh", "zsh"),
        ("fish", "fish"),
        ("ps1", "powershell"),
        ("bat", "batch"),
        ("cmd", "batch"),
        // Web
        ("js", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("jsx", "jsx"),
        ("ts", "typescript"),
        ("tsx", "tsx"),
        ("html", "html"),
        ("htm", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("sass", "sass"),
        ("less", "less"),
        ("vue", "vue"),
        ("svelte", "svelte"),
        // Data & config
        ("json", "json"),
        ("jsonc", "json"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("toml", "toml"),
        ("xml", "xml"),
        ("ini", "ini"),
        ("cfg", "ini"),
        ("env", "dotenv"),
        ("sql", "sql"),
        ("graphql", "graphql"),
        ("proto", "protobuf"),
        ("tf", "hcl"),
        ("hcl", "hcl"),
        ("nix", "nix"),
        // Docs
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("rst", "rst"),
        ("tex", "latex"),
        ("csv", "csv"),
        ("svg", "xml"),
        ("diff", "diff"),
        ("patch", "diff"),
    ])
});

static FILE_NAME_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Dockerfile", "dockerfile"),
        ("Makefile", "makefile"),
        ("CMakeLists.txt", "cmake"),
        ("Jenkinsfile", "groovy"),
        ("Gemfile", "ruby"),
        ("Rakefile", "ruby"),
    ])
});

/// Code fence label for a file, by name first and then by extension
pub fn codeblock_language(path: &Path) -> &'static str {
    if let Some(label) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| FILE_NAME_LANGUAGES.get(name).copied())
    {
        return label;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| EXTENSION_LANGUAGES.get(ext.as_str()).copied())
        .unwrap_or(FALLBACK_LANGUAGE)
}

/// Whether the file maps to a language other than the fallback
pub fn is_known_language(path: &Path) -> bool {
    codeblock_language(path) != FALLBACK_LANGUAGE
}

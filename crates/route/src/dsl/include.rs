//! `#include` expansion.
//!
//! Include targets are resolved against the directory of the including file unless they are
//! absolute. Each file's canonical path is pushed onto the ancestor chain before recursing, so a
//! file that reaches itself again fails with the whole chain in the error.

use crate::dsl::lines;
use crate::error::CompileError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const INCLUDE_KEYWORD: &str = "#include";

/// Expands every `#include "…"` line of `path` recursively and returns the flattened source.
///
/// `ancestors` holds the canonical paths of the files currently being expanded, outermost
/// first; pass an empty slice for the top-level file.
pub fn pre_process<P: AsRef<Path>>(path: P, ancestors: &[PathBuf]) -> Result<String, CompileError> {
    let path = path.as_ref();
    let canonical = fs::canonicalize(path).map_err(|e| CompileError::io(path, e))?;

    if ancestors.contains(&canonical) {
        let mut chain = ancestors.to_vec();
        chain.push(canonical);
        return Err(CompileError::circular_include(&chain));
    }

    let content = fs::read_to_string(&canonical).map_err(|e| CompileError::io(&canonical, e))?;

    let mut chain = ancestors.to_vec();
    chain.push(canonical.clone());

    let base_dir = canonical.parent().unwrap_or_else(|| Path::new(""));
    let mut expanded = Vec::new();

    for line in lines(&content) {
        let Some(target) = parse_include(line) else {
            expanded.push(line.to_string());
            continue;
        };

        let include = resolve_include(base_dir, target);
        if !include.exists() {
            return Err(CompileError::missing_include(include, &canonical));
        }

        debug!(file = %canonical.display(), include = %include.display(), "expanding include");
        expanded.push(pre_process(&include, &chain)?);
    }

    Ok(expanded.join("\n"))
}

/// Returns the quoted target of an `#include` line, or `None` if the line is not one.
///
/// The target is whatever sits between the first and the last quote; either `"` or `'` may be
/// used on each side.
fn parse_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(INCLUDE_KEYWORD)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let quoted = rest.trim();
    let inner = quoted.strip_prefix(['"', '\''])?.strip_suffix(['"', '\''])?;
    (!inner.is_empty()).then_some(inner)
}

fn resolve_include(base_dir: &Path, target: &str) -> PathBuf {
    if is_absolute(target) {
        PathBuf::from(target)
    } else {
        base_dir.join(target)
    }
}

/// A leading slash (or backslash) or a drive letter such as `C:`.
fn is_absolute(target: &str) -> bool {
    let bytes = target.as_bytes();
    match bytes {
        [b'/' | b'\\', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn include_line_syntax() {
        assert_eq!(parse_include(r#"#include "a.router""#), Some("a.router"));
        assert_eq!(parse_include(r"  #include   'dir/b.router'  "), Some("dir/b.router"));
        assert_eq!(parse_include(r#"#include "mixed.router'"#), Some("mixed.router"));

        assert_eq!(parse_include(r#"#include"a.router""#), None);
        assert_eq!(parse_include(r#"#include """#), None);
        assert_eq!(parse_include(r"#include a.router"), None);
        assert_eq!(parse_include(r#"path: "a.router""#), None);
        assert_eq!(parse_include("#route"), None);
    }

    #[test]
    fn absolute_targets() {
        assert!(is_absolute("/etc/routes.router"));
        assert!(is_absolute("C:/routes.router"));
        assert!(is_absolute("d:\\routes.router"));
        assert!(!is_absolute("routes.router"));
        assert!(!is_absolute("./routes.router"));
        assert!(!is_absolute("1:routes.router"));
    }

    #[test]
    fn expands_nested_includes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("blog")).unwrap();

        fs::write(
            dir.path().join("main.router"),
            indoc! {r#"
            <route>
            path: /
            entry: home
            </route>
            #include "blog/posts.router"
            "#},
        )
        .unwrap();
        fs::write(dir.path().join("blog/posts.router"), "#include 'shared.router'\r\n#route\r\npath: /posts\r\n#endroute").unwrap();
        fs::write(dir.path().join("blog/shared.router"), "<route>\rpath: /shared\r</route>").unwrap();

        let content = pre_process(dir.path().join("main.router"), &[]).unwrap();

        assert!(!content.contains("#include"));
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "<route>",
                "path: /",
                "entry: home",
                "</route>",
                "<route>",
                "path: /shared",
                "</route>",
                "#route",
                "path: /posts",
                "#endroute",
            ]
        );
    }

    #[test]
    fn absolute_include() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared.router");
        fs::write(&shared, "path: /abs").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/main.router"), format!("#include \"{}\"", shared.display())).unwrap();

        let content = pre_process(dir.path().join("nested/main.router"), &[]).unwrap();
        assert_eq!(content, "path: /abs");
    }

    #[test]
    fn detects_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.router"), "#include \"b.router\"").unwrap();
        fs::write(dir.path().join("b.router"), "#include \"a.router\"").unwrap();

        let err = pre_process(dir.path().join("a.router"), &[]).unwrap_err();

        let CompileError::CircularInclude { chain } = err else {
            panic!("expected a circular include error, got {err:?}");
        };
        let names = chain
            .split(" -> ")
            .map(|path| Path::new(path).file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.router", "b.router", "a.router"]);
    }

    #[test]
    fn detects_self_include() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("self.router"), "#include \"./self.router\"").unwrap();

        let err = pre_process(dir.path().join("self.router"), &[]).unwrap_err();
        assert!(matches!(err, CompileError::CircularInclude { .. }));
    }

    #[test]
    fn sibling_includes_are_not_cycles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.router"), "#include \"x.router\"\n#include \"x.router\"").unwrap();
        fs::write(dir.path().join("x.router"), "path: /x").unwrap();

        let content = pre_process(dir.path().join("main.router"), &[]).unwrap();
        assert_eq!(content, "path: /x\npath: /x");
    }

    #[test]
    fn missing_include_names_both_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.router"), "#include \"gone.router\"").unwrap();

        let err = pre_process(dir.path().join("main.router"), &[]).unwrap_err();
        let CompileError::MissingInclude { include, referenced_by } = err else {
            panic!("expected a missing include error, got {err:?}");
        };
        assert!(include.ends_with("gone.router"));
        assert!(referenced_by.ends_with("main.router"));
    }

    #[test]
    fn unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = pre_process(dir.path().join("none.router"), &[]).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}

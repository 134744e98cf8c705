//! Tokenizer for flattened `.router` content.
//!
//! The content is processed line by line:
//!
//! - `<assets>/path</assets>` declares the assets prefix; it must come before anything else
//!   and may appear only once
//! - `<route>` / `#route` opens a block, `</route>` / `#endroute` closes it
//! - inside a block, `key: value` lines set fields of the record
//!
//! Everything else is ignored.

use crate::dsl::lines;
use crate::error::CompileError;
use crate::table::{RouteRecord, RouteTable};
use tracing::warn;

const ASSETS_OPEN: &str = "<assets>";
const ASSETS_CLOSE: &str = "</assets>";

/// Options that shape the compiled table.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    not_found_entry: String,
}

impl CompilerOptions {
    pub fn new(not_found_entry: impl Into<String>) -> Self {
        Self { not_found_entry: not_found_entry.into() }
    }

    /// The entry identifier of the synthetic `/404` record.
    pub fn not_found_entry(&self) -> &str {
        &self.not_found_entry
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::new("404")
    }
}

/// The two route block delimiters, each accepted in an XML-ish and a hash spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockMarker {
    Open,
    Close,
}

impl BlockMarker {
    fn parse(line: &str) -> Option<Self> {
        match line {
            "<route>" | "#route" => Some(Self::Open),
            "</route>" | "#endroute" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Turns flattened DSL content into a route table, appending the synthetic `/404` record.
pub fn compile_from_content(content: &str, options: &CompilerOptions) -> Result<RouteTable, CompileError> {
    let mut assets: Option<String> = None;
    let mut saw_content = false;
    let mut current: Option<RouteRecord> = None;
    let mut routes = Vec::new();

    for (index, raw_line) in lines(content).enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if is_assets_directive(line) {
            if saw_content {
                return Err(CompileError::MisplacedAssets { line: line_no });
            }
            if assets.is_some() {
                return Err(CompileError::DuplicateAssets { line: line_no });
            }
            assets = Some(parse_assets(line, line_no)?);
            continue;
        }

        saw_content = true;

        match BlockMarker::parse(line) {
            Some(BlockMarker::Open) => {
                if current.is_some() {
                    warn!(line = line_no, "route block opened before the previous one was closed, discarding it");
                }
                current = Some(RouteRecord::default());
            }
            Some(BlockMarker::Close) => match current.take() {
                Some(record) => routes.push(record),
                None => warn!(line = line_no, "route block closed without being opened, ignoring"),
            },
            None => {
                let Some(record) = current.as_mut() else {
                    continue;
                };
                if let Some((key, value)) = line.split_once(':') {
                    let key = key.trim();
                    if !key.is_empty() {
                        record.set(key, value.trim());
                    }
                }
            }
        }
    }

    if current.is_some() {
        warn!("unterminated route block at end of input, discarding it");
    }

    routes.push(RouteRecord::not_found(options.not_found_entry()));

    Ok(RouteTable::new(assets, routes))
}

fn is_assets_directive(line: &str) -> bool {
    line.starts_with("<assets") || line.ends_with(ASSETS_CLOSE)
}

fn parse_assets(line: &str, line_no: usize) -> Result<String, CompileError> {
    let body = line
        .strip_prefix(ASSETS_OPEN)
        .ok_or_else(|| CompileError::malformed_assets(line_no, "expected an opening <assets> tag"))?
        .strip_suffix(ASSETS_CLOSE)
        .ok_or_else(|| CompileError::malformed_assets(line_no, "expected a closing </assets> tag"))?
        .trim();

    if body.is_empty() {
        return Err(CompileError::malformed_assets(line_no, "missing assets path"));
    }

    normalize_assets_path(body)
}

/// Forward slashes, one leading slash, no trailing slash, and never just `/`.
fn normalize_assets_path(raw: &str) -> Result<String, CompileError> {
    let path = raw.replace('\\', "/");
    let trimmed = path.trim_matches('/');

    if trimmed.is_empty() {
        return Err(CompileError::InvalidAssetsPath { path: raw.to_string() });
    }

    Ok(format!("/{trimmed}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn compile(content: &str) -> Result<RouteTable, CompileError> {
        compile_from_content(content, &CompilerOptions::default())
    }

    #[test]
    fn parses_route_blocks() {
        let content = indoc! {r"
            <route>
              path: /posts/$
              method: get
              name: posts.show
              entry: pages/post
              layout: wide
            </route>

            #route
            path: /about
            entry: pages/about
            #endroute
        "};

        let table = compile(content).unwrap();

        assert_eq!(table.assets_path(), None);
        assert_eq!(table.len(), 3);

        let post = &table.routes()[0];
        assert_eq!(post.path(), Some("/posts/$"));
        assert_eq!(post.method(), Some("GET"));
        assert_eq!(post.name(), Some("posts.show"));
        assert_eq!(post.entry(), Some("pages/post"));
        assert_eq!(post.extra("layout"), Some("wide"));

        let about = &table.routes()[1];
        assert_eq!(about.path(), Some("/about"));
        assert_eq!(about.method(), None);
    }

    #[test]
    fn appends_not_found_record() {
        let table = compile_from_content("", &CompilerOptions::new("errors/404")).unwrap();

        assert_eq!(table.len(), 1);
        let fallback = table.fallback().unwrap();
        assert_eq!(fallback.path(), Some("/404"));
        assert_eq!(fallback.method(), Some("GET"));
        assert_eq!(fallback.entry(), Some("errors/404"));
    }

    #[test]
    fn keeps_declaration_order() {
        let content = (0..5).map(|i| format!("<route>\npath: /r{i}\nentry: e{i}\n</route>\n")).collect::<String>();

        let table = compile(&content).unwrap();

        assert_eq!(table.len(), 6);
        let paths = table.routes().iter().map(|r| r.path().unwrap()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["/r0", "/r1", "/r2", "/r3", "/r4", "/404"]);
    }

    #[test]
    fn user_declared_not_found_is_kept() {
        let content = indoc! {r"
            <route>
            path: /404
            method: GET
            entry: custom-404
            </route>
        "};

        let table = compile(content).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.routes()[0].entry(), Some("custom-404"));
        assert_eq!(table.fallback().and_then(RouteRecord::entry), Some("404"));
    }

    #[test]
    fn value_keeps_colons_and_last_key_wins() {
        let content = indoc! {r"
            <route>
            path: /a
            entry: first
            entry: https://example.com:8080/x
            no colon here
            : orphan value
            </route>
        "};

        let table = compile(content).unwrap();
        let record = &table.routes()[0];
        assert_eq!(record.entry(), Some("https://example.com:8080/x"));
        assert!(record.extras().is_empty());
    }

    #[test]
    fn ignores_lines_outside_blocks() {
        let content = indoc! {r"
            path: /outside
            </route>
            <route>
            path: /inside
            </route>
            entry: stray
        "};

        let table = compile(content).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.routes()[0].path(), Some("/inside"));
        assert_eq!(table.routes()[0].entry(), None);
    }

    #[test]
    fn reopening_resets_the_buffer() {
        let content = "<route>\npath: /lost\nname: lost\n<route>\npath: /kept\n</route>\n<route>\npath: /unterminated";

        let table = compile(content).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.routes()[0].path(), Some("/kept"));
        assert_eq!(table.routes()[0].name(), None);
    }

    #[test]
    fn accepts_any_line_break() {
        let table = compile("<route>\r\npath: /crlf\r\n</route>\r<route>\rpath: /cr\r</route>").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.routes()[1].path(), Some("/cr"));
    }

    #[test]
    fn assets_declaration() {
        let table = compile("<assets>/static/</assets>\n<route>\npath: /\n</route>").unwrap();
        assert_eq!(table.assets_path(), Some("/static"));

        let table = compile("\n  <assets> public\\assets\\ </assets>").unwrap();
        assert_eq!(table.assets_path(), Some("/public/assets"));
    }

    #[test]
    fn assets_after_content_fails() {
        let err = compile("<route>\npath: /\n</route>\n<assets>/assets</assets>").unwrap_err();
        assert!(matches!(err, CompileError::MisplacedAssets { line: 4 }));

        let err = compile("some comment\n<assets>/assets</assets>").unwrap_err();
        assert!(matches!(err, CompileError::MisplacedAssets { .. }));
    }

    #[test]
    fn duplicate_assets_fails() {
        let err = compile("<assets>/a</assets>\n<assets>/b</assets>").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateAssets { line: 2 }));
    }

    #[test]
    fn root_assets_path_fails() {
        for content in ["<assets>/</assets>", "<assets>\\</assets>", "<assets>///</assets>"] {
            let err = compile(content).unwrap_err();
            assert!(matches!(err, CompileError::InvalidAssetsPath { .. }), "{content}: {err:?}");
        }
    }

    #[test]
    fn malformed_assets_fails() {
        for content in ["<assets></assets>", "<assets>   </assets>", "<assets>/a", "/a</assets>", "<assets/a</assets>"] {
            let err = compile(content).unwrap_err();
            assert!(matches!(err, CompileError::MalformedAssets { .. }), "{content}: {err:?}");
        }
    }
}

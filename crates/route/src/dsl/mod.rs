//! The `.router` source language.
//!
//! ```text
//! <assets>/assets</assets>
//! #include "blog/posts.router"
//! <route>
//!   path: /posts/$
//!   method: GET
//!   name: posts.show
//!   entry: pages/post
//! </route>
//! ```
//!
//! Compilation is two passes: [`pre_process`] inlines includes into one flat text, then
//! [`compile_from_content`] turns that text into a [`RouteTable`](crate::RouteTable).

mod include;
mod parser;

pub use include::pre_process;
pub use parser::compile_from_content;
pub use parser::CompilerOptions;

/// Splits on `\r\n`, `\n` and `\r` alike.
pub(crate) fn lines(content: &str) -> impl Iterator<Item = &str> {
    content.split("\r\n").flat_map(|line| line.split(['\n', '\r']))
}

#[cfg(test)]
mod tests {
    use super::lines;

    #[test]
    fn mixed_line_breaks() {
        let split = lines("a\r\nb\nc\rd").collect::<Vec<_>>();
        assert_eq!(split, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn keeps_blank_lines() {
        let split = lines("a\n\n\r\nb").collect::<Vec<_>>();
        assert_eq!(split, vec!["a", "", "", "b"]);
    }
}

//! Raw line metrics for Python sources.

use tokei::{Config, LanguageType};
use tree_sitter::Node;

/// Line counts used by the maintainability index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawMetrics {
    /// Total number of lines.
    pub loc: usize,
    /// Source lines of code (not blank, comment-only or docstring).
    pub sloc: usize,
    /// Logical lines: one per simple statement, compound header, clause or
    /// decorator.
    pub lloc: usize,
    /// Blank lines.
    pub blank: usize,
    /// Number of comment tokens, inline ones included.
    pub comments: usize,
    /// Lines spanned by string-only statements (docstrings).
    pub docstring_lines: usize,
}

impl RawMetrics {
    /// Measure `source`, using `root` for token-level counts.
    pub(crate) fn measure(source: &str, root: Node<'_>) -> Self {
        let config = Config {
            treat_doc_strings_as_comments: Some(true),
            ..Config::default()
        };
        let stats = LanguageType::Python.parse_from_str(source, &config);

        let mut comments = 0;
        let mut docstring_lines = 0;
        count_tokens(root, &mut comments, &mut docstring_lines);

        Self {
            loc: source.lines().count(),
            sloc: stats.code,
            lloc: count_logical_lines(root),
            blank: stats.blanks,
            comments,
            docstring_lines,
        }
    }

    /// Comment and docstring lines as a percentage of SLOC.
    pub fn comment_percent(&self) -> f64 {
        if self.sloc == 0 {
            return 0.0;
        }
        (self.comments + self.docstring_lines) as f64 / self.sloc as f64 * 100.0
    }
}

fn count_tokens(node: Node<'_>, comments: &mut usize, docstring_lines: &mut usize) {
    match node.kind() {
        "comment" => {
            *comments += 1;
            return;
        }
        "expression_statement" if is_string_statement(node) => {
            *docstring_lines += node.end_position().row - node.start_position().row + 1;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count_tokens(child, comments, docstring_lines);
    }
}

fn count_logical_lines(node: Node<'_>) -> usize {
    let own = usize::from(node.is_named() && is_logical_line(node));
    let mut cursor = node.walk();
    let nested: usize = node
        .children(&mut cursor)
        .map(count_logical_lines)
        .sum();
    own + nested
}

fn is_logical_line(node: Node<'_>) -> bool {
    if node.is_extra() {
        return false;
    }
    match node.kind() {
        "decorated_definition" => false,
        "decorator" | "elif_clause" | "else_clause" | "except_clause"
        | "except_group_clause" | "finally_clause" | "case_clause" => true,
        _ => node.parent().is_some_and(|parent| {
            matches!(parent.kind(), "module" | "block" | "decorated_definition")
        }),
    }
}

fn is_string_statement(node: Node<'_>) -> bool {
    node.named_child_count() == 1
        && node
            .named_child(0)
            .map(|child| matches!(child.kind(), "string" | "concatenated_string"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::RawMetrics;
    use tree_sitter::Parser;

    fn measure(source: &str) -> RawMetrics {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("python grammar");
        let tree = parser.parse(source, None).expect("tree");
        RawMetrics::measure(source, tree.root_node())
    }

    #[test]
    fn counts_code_and_comment_tokens() {
        let metrics = measure("# header\ndef f(x):\n    return x  # inline\n");

        assert_eq!(metrics.loc, 3);
        assert_eq!(metrics.sloc, 2);
        assert_eq!(metrics.lloc, 2);
        assert_eq!(metrics.comments, 2);
        assert_eq!(metrics.docstring_lines, 0);
    }

    #[test]
    fn counts_docstring_lines() {
        let source = "def f():\n    \"\"\"First.\n\n    More.\n    \"\"\"\n    return 1\n";
        let metrics = measure(source);

        assert_eq!(metrics.docstring_lines, 4);
        assert_eq!(metrics.comments, 0);
    }

    #[test]
    fn logical_lines_follow_statements_not_physical_lines() {
        let source = "\
@cache
def lookup(key, table={
    'a': 1,
    'b': 2,
}):
    if key: first = 1; second = 2
    try:
        return table[key]
    except KeyError:
        return None
    finally:
        pass
";
        let metrics = measure(source);

        assert_eq!(metrics.sloc, 12);
        assert_eq!(metrics.lloc, 11);
    }

    #[test]
    fn comment_percent_is_zero_without_code() {
        let metrics = RawMetrics::default();
        assert_eq!(metrics.comment_percent(), 0.0);

        let metrics = RawMetrics {
            sloc: 4,
            comments: 1,
            docstring_lines: 1,
            ..RawMetrics::default()
        };
        assert_eq!(metrics.comment_percent(), 50.0);
    }
}

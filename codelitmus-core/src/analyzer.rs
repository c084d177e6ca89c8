//! Static analysis of Python sources.

use tree_sitter::{Node, Parser, Tree};

use crate::complexity::{ComplexityBlock, ModuleComplexity};
use crate::error::{LitmusError, Result};
use crate::halstead::HalsteadMetrics;
use crate::raw::RawMetrics;

/// Source of the raw signals the scorer combines.
#[cfg_attr(test, mockall::automock)]
pub trait StaticAnalyzer {
    /// Cyclomatic complexity of every block in the source.
    fn complexity_of(&self, code: &str) -> Result<Vec<f64>>;
    /// Maintainability index of the source, from 0 to 100.
    fn maintainability_of(&self, code: &str) -> Result<f64>;
}

/// Every metric computed for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMetrics {
    /// Complexity per function, method and class.
    pub blocks: Vec<ComplexityBlock>,
    /// Module-wide cyclomatic complexity.
    pub total_complexity: u32,
    /// Halstead counts.
    pub halstead: HalsteadMetrics,
    /// Line counts.
    pub raw: RawMetrics,
    /// Maintainability index, from 0 to 100.
    pub maintainability_index: f64,
}

/// Analyzer for Python source backed by `tree-sitter-python`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAnalyzer;

impl PythonAnalyzer {
    /// Create a new Python analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Complexity of every function, method and class in the source.
    pub fn blocks(&self, code: &str) -> Result<Vec<ComplexityBlock>> {
        let tree = self.parse(code)?;
        Ok(ModuleComplexity::measure(tree.root_node(), code.as_bytes()).blocks())
    }

    /// Compute every metric for the source.
    pub fn analyze(&self, code: &str) -> Result<ModuleMetrics> {
        let tree = self.parse(code)?;
        let root = tree.root_node();
        let complexity = ModuleComplexity::measure(root, code.as_bytes());
        let halstead = HalsteadMetrics::measure(root, code.as_bytes());
        let raw = RawMetrics::measure(code, root);
        let total_complexity = complexity.total();
        let maintainability_index = maintainability_index(
            halstead.volume(),
            total_complexity,
            raw.lloc,
            raw.comment_percent(),
        );

        Ok(ModuleMetrics {
            blocks: complexity.blocks(),
            total_complexity,
            halstead,
            raw,
            maintainability_index,
        })
    }

    fn parse(&self, code: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|err| LitmusError::Other(format!("failed to load python grammar: {err}")))?;
        let tree = parser
            .parse(code, None)
            .ok_or_else(|| LitmusError::Other("python parser returned no tree".to_string()))?;

        let root = tree.root_node();
        if let Some(node) = first_error(root).or_else(|| first_rejected(root, code)) {
            let position = node.start_position();
            return Err(LitmusError::Parse {
                line: position.row + 1,
                column: position.column + 1,
            });
        }
        Ok(tree)
    }
}

impl StaticAnalyzer for PythonAnalyzer {
    fn complexity_of(&self, code: &str) -> Result<Vec<f64>> {
        Ok(self
            .blocks(code)?
            .into_iter()
            .map(|block| f64::from(block.complexity))
            .collect())
    }

    fn maintainability_of(&self, code: &str) -> Result<f64> {
        Ok(self.analyze(code)?.maintainability_index)
    }
}

/// Maintainability index on a 0-100 scale.
///
/// `lloc` is the number of logical lines. `comment_percent` is comment and
/// docstring lines as a percentage of SLOC. Sources without volume or code
/// score a perfect 100.
pub fn maintainability_index(
    halstead_volume: f64,
    complexity: u32,
    lloc: usize,
    comment_percent: f64,
) -> f64 {
    if halstead_volume <= 0.0 || lloc == 0 {
        return 100.0;
    }
    let volume_scale = halstead_volume.ln();
    let sloc_scale = (lloc as f64).ln();
    let comments_scale = (2.46 * comment_percent.to_radians()).sqrt();
    let raw = 171.0 - 5.2 * volume_scale - 0.23 * f64::from(complexity) - 16.2 * sloc_scale
        + 50.0 * comments_scale.sin();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(first_error)
        .or(Some(node))
}

// Python 2 forms that tree-sitter-python accepts but Python 3 rejects,
// and statements whose indentation does not line up with their siblings.
fn first_rejected<'tree>(node: Node<'tree>, code: &str) -> Option<Node<'tree>> {
    match node.kind() {
        "exec_statement" => return Some(node),
        "print_statement" if child_of_kind(node, "chevron").is_none() => return Some(node),
        "except_clause" => {
            if let Some(comma) = child_of_kind(node, ",") {
                return Some(comma);
            }
        }
        _ => {}
    }
    if let Some(statement) = misaligned_statement(node, code) {
        return Some(statement);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| first_rejected(child, code))
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn misaligned_statement<'tree>(node: Node<'tree>, code: &str) -> Option<Node<'tree>> {
    let (mut expected, header) = match node.kind() {
        "module" => (None, None),
        "block" => (None, node.parent()),
        _ => return None,
    };
    let mut cursor = node.walk();
    let statements: Vec<Node<'tree>> = node
        .named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect();
    if header.is_some() && statements.is_empty() {
        return Some(node);
    }

    let mut previous_row = header.map(|header| header.start_position().row);
    for statement in statements {
        let start = statement.start_position();
        let same_line = previous_row == Some(start.row);
        previous_row = Some(statement.end_position().row);
        if same_line {
            continue;
        }
        match (expected, header) {
            (Some(column), _) if column != start.column => return Some(statement),
            (Some(_), _) => {}
            (None, Some(header)) if start.column <= header.start_position().column => {
                return Some(statement);
            }
            (None, Some(_)) => expected = Some(start.column),
            (None, None) => {
                let bom = if start.row == 0 && code.starts_with('\u{feff}') {
                    '\u{feff}'.len_utf8()
                } else {
                    0
                };
                if start.column != bom {
                    return Some(statement);
                }
                expected = Some(0);
            }
        }
    }
    None
}

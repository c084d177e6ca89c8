//! Cyclomatic complexity of Python functions, methods and classes.
//!
//! A function scores `1` plus one per decision point in its body. Nested
//! function and class definitions are measured on their own and never add to
//! the enclosing block. A class scores its real complexity (`1`, plus class
//! body decisions, plus the sum of its methods) averaged over its methods.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;
use utoipa::ToSchema;

/// Kind of block measured for complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Free function, including ones nested in module-level control flow.
    Function,
    /// Function defined in a class body.
    Method,
    /// Class definition.
    Class,
}

/// Complexity of a single function, method or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComplexityBlock {
    /// Declared name of the block.
    pub name: String,
    /// Kind of block.
    pub kind: BlockKind,
    /// One-based line of the definition.
    pub line: usize,
    /// Cyclomatic complexity.
    pub complexity: u32,
}

#[derive(Debug, Default)]
struct Scope {
    decisions: u32,
    functions: Vec<FunctionBlock>,
    classes: Vec<ClassBlock>,
}

#[derive(Debug)]
struct FunctionBlock {
    name: String,
    line: usize,
    complexity: u32,
}

#[derive(Debug)]
struct ClassBlock {
    name: String,
    line: usize,
    methods: Vec<FunctionBlock>,
    real_complexity: u32,
}

impl ClassBlock {
    fn complexity(&self) -> u32 {
        let methods = self.methods.len() as u32;
        if methods == 0 {
            return self.real_complexity;
        }
        self.real_complexity / methods + u32::from(methods > 1)
    }
}

/// Complexity measurements for a whole module.
#[derive(Debug)]
pub(crate) struct ModuleComplexity {
    module: Scope,
}

impl ModuleComplexity {
    /// Walk the syntax tree rooted at `root`.
    pub(crate) fn measure(root: Node<'_>, source: &[u8]) -> Self {
        let mut module = Scope::default();
        visit(root, source, &mut module);
        Self { module }
    }

    /// Functions first, then each class followed by its methods.
    pub(crate) fn blocks(&self) -> Vec<ComplexityBlock> {
        let mut blocks: Vec<ComplexityBlock> = self
            .module
            .functions
            .iter()
            .map(|function| function.to_block(BlockKind::Function))
            .collect();
        for class in &self.module.classes {
            blocks.push(ComplexityBlock {
                name: class.name.clone(),
                kind: BlockKind::Class,
                line: class.line,
                complexity: class.complexity(),
            });
            blocks.extend(
                class
                    .methods
                    .iter()
                    .map(|method| method.to_block(BlockKind::Method)),
            );
        }
        blocks
    }

    /// Module-wide complexity: module decisions plus every block's decisions, plus one.
    pub(crate) fn total(&self) -> u32 {
        let functions: u32 = self
            .module
            .functions
            .iter()
            .map(|function| function.complexity - 1)
            .sum();
        let classes: u32 = self
            .module
            .classes
            .iter()
            .map(|class| class.real_complexity - 1)
            .sum();
        1 + self.module.decisions + functions + classes
    }
}

impl FunctionBlock {
    fn to_block(&self, kind: BlockKind) -> ComplexityBlock {
        ComplexityBlock {
            name: self.name.clone(),
            kind,
            line: self.line,
            complexity: self.complexity,
        }
    }
}

fn visit(node: Node<'_>, source: &[u8], scope: &mut Scope) {
    match node.kind() {
        "function_definition" => {
            scope.functions.push(visit_function(node, source));
            return;
        }
        "class_definition" => {
            scope.classes.push(visit_class(node, source));
            return;
        }
        "decorated_definition" => {
            if let Some(definition) = node.child_by_field_name("definition") {
                visit(definition, source, scope);
            }
            return;
        }
        _ => scope.decisions += decision_points(node),
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, scope);
    }
}

fn visit_function(node: Node<'_>, source: &[u8]) -> FunctionBlock {
    let mut body = Scope::default();
    if let Some(block) = node.child_by_field_name("body") {
        visit(block, source, &mut body);
    }
    FunctionBlock {
        name: definition_name(node, source),
        line: node.start_position().row + 1,
        complexity: 1 + body.decisions,
    }
}

fn visit_class(node: Node<'_>, source: &[u8]) -> ClassBlock {
    let mut body = Scope::default();
    if let Some(block) = node.child_by_field_name("body") {
        visit(block, source, &mut body);
    }
    let methods_complexity: u32 = body.functions.iter().map(|method| method.complexity).sum();
    ClassBlock {
        name: definition_name(node, source),
        line: node.start_position().row + 1,
        real_complexity: 1 + body.decisions + methods_complexity,
        methods: body.functions,
    }
}

fn decision_points(node: Node<'_>) -> u32 {
    match node.kind() {
        "if_statement" | "elif_clause" | "conditional_expression" | "boolean_operator"
        | "for_in_clause" | "if_clause" | "assert_statement" | "case_clause" => 1,
        "for_statement" | "while_statement" => {
            1 + u32::from(node.child_by_field_name("alternative").is_some())
        }
        "try_statement" => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|child| {
                    matches!(
                        child.kind(),
                        "except_clause" | "except_group_clause" | "else_clause"
                    )
                })
                .count() as u32
        }
        _ => 0,
    }
}

fn definition_name(node: Node<'_>, source: &[u8]) -> String {
    node.child_by_field_name("name")
        .and_then(|name| name.utf8_text(source).ok())
        .unwrap_or("<anonymous>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{BlockKind, ComplexityBlock, ModuleComplexity};
    use tree_sitter::Parser;

    fn measure(source: &str) -> ModuleComplexity {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("python grammar");
        let tree = parser.parse(source, None).expect("tree");
        ModuleComplexity::measure(tree.root_node(), source.as_bytes())
    }

    fn complexities(source: &str) -> Vec<(String, u32)> {
        measure(source)
            .blocks()
            .into_iter()
            .map(|block| (block.name, block.complexity))
            .collect()
    }

    #[test]
    fn straight_line_function_scores_one() {
        let source = "def add(a, b):\n    return a + b\n";
        assert_eq!(complexities(source), vec![("add".to_string(), 1)]);
    }

    #[test]
    fn if_and_elif_each_add_a_path() {
        let source = "\
def sign(x):
    if x > 0:
        return 1
    elif x < 0:
        return -1
    else:
        return 0
";
        assert_eq!(complexities(source), vec![("sign".to_string(), 3)]);
    }

    #[test]
    fn loops_handlers_and_comprehensions_are_counted() {
        let source = "\
def walk(items):
    for item in items:
        pass
    else:
        pass
    try:
        pass
    except ValueError:
        pass
    except KeyError:
        pass
    else:
        pass
    return [x for x in items if x and x > 1]
";
        assert_eq!(complexities(source), vec![("walk".to_string(), 9)]);
    }

    #[test]
    fn nested_functions_do_not_add_to_parent() {
        let source = "\
def outer(x):
    def inner(y):
        if y:
            return 1
        return 2
    return inner(x) if x else None
";
        assert_eq!(complexities(source), vec![("outer".to_string(), 2)]);
    }

    #[test]
    fn class_complexity_averages_over_methods() {
        let source = "\
class Account:
    def deposit(self, amount):
        if amount <= 0:
            raise ValueError(\"amount\")
        self.balance += amount

    def name(self):
        return \"acct\"
";
        let module = measure(source);
        assert_eq!(
            module.blocks(),
            vec![
                ComplexityBlock {
                    name: "Account".to_string(),
                    kind: BlockKind::Class,
                    line: 1,
                    complexity: 3,
                },
                ComplexityBlock {
                    name: "deposit".to_string(),
                    kind: BlockKind::Method,
                    line: 2,
                    complexity: 2,
                },
                ComplexityBlock {
                    name: "name".to_string(),
                    kind: BlockKind::Method,
                    line: 7,
                    complexity: 1,
                },
            ]
        );
        assert_eq!(module.total(), 4);
    }

    #[test]
    fn decorated_functions_inside_module_branches_are_blocks() {
        let source = "\
import functools

if True:
    @functools.lru_cache
    def cached(n):
        return n
";
        let module = measure(source);
        assert_eq!(
            module
                .blocks()
                .into_iter()
                .map(|block| (block.name, block.kind))
                .collect::<Vec<_>>(),
            vec![("cached".to_string(), BlockKind::Function)]
        );
        assert_eq!(module.total(), 2);
    }

    #[test]
    fn module_without_definitions_has_no_blocks() {
        let module = measure("x = 1\nprint(x)\n");
        assert!(module.blocks().is_empty());
        assert_eq!(module.total(), 1);
    }
}

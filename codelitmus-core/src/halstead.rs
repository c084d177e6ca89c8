//! Halstead operator and operand counts for Python sources.

use std::collections::HashSet;

use tree_sitter::Node;

/// Halstead base counts for a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalsteadMetrics {
    /// Distinct operators (h1).
    pub distinct_operators: usize,
    /// Distinct operands (h2).
    pub distinct_operands: usize,
    /// Total operators (N1).
    pub total_operators: usize,
    /// Total operands (N2).
    pub total_operands: usize,
}

impl HalsteadMetrics {
    /// Walk the syntax tree rooted at `root`.
    pub(crate) fn measure(root: Node<'_>, source: &[u8]) -> Self {
        let mut visitor = HalsteadVisitor::new(source);
        visitor.visit(root, "");
        Self {
            distinct_operators: visitor.operators_seen.len(),
            distinct_operands: visitor.operands_seen.len(),
            total_operators: visitor.operators,
            total_operands: visitor.operands,
        }
    }

    /// Program vocabulary, `h1 + h2`.
    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    /// Program length, `N1 + N2`.
    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    /// Program volume, `length * log2(vocabulary)`.
    pub fn volume(&self) -> f64 {
        let vocabulary = self.vocabulary();
        if vocabulary == 0 {
            return 0.0;
        }
        self.length() as f64 * (vocabulary as f64).log2()
    }
}

/// Names and literals compare by text, any other operand is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OperandKey {
    Text(String),
    Node(usize, usize),
}

struct HalsteadVisitor<'s> {
    source: &'s [u8],
    operators: usize,
    operands: usize,
    operators_seen: HashSet<(String, String)>,
    operands_seen: HashSet<(String, OperandKey)>,
}

impl<'s> HalsteadVisitor<'s> {
    fn new(source: &'s [u8]) -> Self {
        Self {
            source,
            operators: 0,
            operands: 0,
            operators_seen: HashSet::new(),
            operands_seen: HashSet::new(),
        }
    }

    fn visit(&mut self, node: Node<'_>, context: &str) {
        match node.kind() {
            "function_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .and_then(|name| name.utf8_text(self.source).ok())
                    .unwrap_or_default()
                    .to_string();
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit_children(body, &name);
                }
                return;
            }
            "boolean_operator" => {
                let operator = operator_of(node);
                let mut values = Vec::new();
                flatten_boolean(node, operator, &mut values);
                self.record(context, [operator], &values);
                for value in values {
                    self.visit(value, context);
                }
                return;
            }
            "binary_operator" => {
                let operands = fields(node, &["left", "right"]);
                self.record(context, [operator_of(node)], &operands);
            }
            "augmented_assignment" => {
                let operator = operator_of(node);
                let operator = operator.strip_suffix('=').unwrap_or(operator);
                let operands = fields(node, &["left", "right"]);
                self.record(context, [operator], &operands);
            }
            "unary_operator" => {
                let operator = format!("unary {}", operator_of(node));
                let operands = fields(node, &["argument"]);
                self.record(context, [operator.as_str()], &operands);
            }
            "not_operator" => {
                let operands = fields(node, &["argument"]);
                self.record(context, ["not"], &operands);
            }
            "comparison_operator" => {
                let mut cursor = node.walk();
                let mut operators = Vec::new();
                let mut operands = Vec::new();
                for child in node.children(&mut cursor) {
                    if child.is_named() {
                        if child.kind() != "comment" {
                            operands.push(child);
                        }
                    } else {
                        operators.push(child.kind());
                    }
                }
                self.record(context, operators, &operands);
            }
            _ => {}
        }

        self.visit_children(node, context);
    }

    fn visit_children(&mut self, node: Node<'_>, context: &str) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, context);
        }
    }

    fn record<'o>(
        &mut self,
        context: &str,
        operators: impl IntoIterator<Item = &'o str>,
        operands: &[Node<'_>],
    ) {
        for operator in operators {
            self.operators += 1;
            self.operators_seen
                .insert((context.to_string(), operator.to_string()));
        }
        for operand in operands {
            self.operands += 1;
            let key = self.operand_key(*operand);
            self.operands_seen.insert((context.to_string(), key));
        }
    }

    fn operand_key(&self, node: Node<'_>) -> OperandKey {
        match node.kind() {
            "identifier" | "integer" | "float" | "true" | "false" | "none" => {
                OperandKey::Text(node.utf8_text(self.source).unwrap_or_default().to_string())
            }
            _ => OperandKey::Node(node.start_byte(), node.end_byte()),
        }
    }
}

fn operator_of(node: Node<'_>) -> &'static str {
    node.child_by_field_name("operator")
        .map(|operator| operator.kind())
        .unwrap_or("?")
}

fn fields<'t>(node: Node<'t>, names: &[&str]) -> Vec<Node<'t>> {
    names
        .iter()
        .filter_map(|name| node.child_by_field_name(name))
        .collect()
}

fn flatten_boolean<'t>(node: Node<'t>, operator: &str, values: &mut Vec<Node<'t>>) {
    for side in ["left", "right"] {
        let Some(child) = node.child_by_field_name(side) else {
            continue;
        };
        if child.kind() == "boolean_operator" && operator_of(child) == operator {
            flatten_boolean(child, operator, values);
        } else {
            values.push(child);
        }
    }
}

//! Go front end: tree-sitter parsing and lowering into [`GoFile`].

use tree_sitter::{Node, Parser};

use super::common::{
    CommentGroup, Decl, Field, FuncBody, FuncDecl, GoFile, Ident, InterfaceMethod, LocalBinding,
    Position, Receiver, Span, TypeBody, TypeDecl, TypeExpr, TypeSpec, ValueDecl, ValueKind,
    ValueSpec,
};
use super::registry::create_parser_for_language;
use crate::core::errors::{NomenError, Result};

/// Go-specific parsing
pub struct GoParser {
    /// Tree-sitter parser for Go
    parser: Parser,
}

impl GoParser {
    /// Create a new Go parser
    pub fn new() -> Result<Self> {
        let parser = create_parser_for_language("go")?;
        Ok(Self { parser })
    }

    /// Parse Go source and lower it. Any syntax error fails the whole file.
    pub fn parse(&mut self, source_code: &str, file_path: &str) -> Result<GoFile> {
        let tree = self
            .parser
            .parse(source_code, None)
            .ok_or_else(|| NomenError::parse("go", "Failed to parse Go source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error_position(root)
                .map(|p| (Some(p.line), Some(p.column)))
                .unwrap_or((None, None));
            return Err(NomenError::parse_with_location(
                "go",
                "syntax error",
                file_path,
                line,
                column,
            ));
        }

        Ok(Lowering::new(source_code.as_bytes(), root).lower(root))
    }
}

fn walk_tree<'t, F>(node: Node<'t>, callback: &mut F)
where
    F: FnMut(Node<'t>),
{
    callback(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_tree(child, callback);
    }
}

fn first_error_position(root: Node) -> Option<Position> {
    let mut found = None;
    walk_tree(root, &mut |node| {
        if found.is_none() && (node.is_error() || node.is_missing()) {
            found = Some(position_of(&node));
        }
    });
    found
}

fn position_of(node: &Node) -> Position {
    let point = node.start_position();
    Position::new(point.row + 1, point.column + 1)
}

fn span_of(node: &Node) -> Span {
    let end = node.end_position();
    Span {
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start: position_of(node),
        end: Position::new(end.row + 1, end.column + 1),
    }
}

/// Strip comment markers and surrounding blanks from one comment token.
pub(crate) fn clean_comment(raw: &str) -> String {
    if let Some(line) = raw.strip_prefix("//") {
        return line.trim().to_string();
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|rest| rest.strip_suffix("*/"))
        .unwrap_or(raw);
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

struct RawGroup {
    group: CommentGroup,
    leading: bool,
}

struct Lowering<'s> {
    src: &'s [u8],
    groups: Vec<RawGroup>,
}

impl<'s> Lowering<'s> {
    fn new(src: &'s [u8], root: Node) -> Self {
        let mut comments = Vec::new();
        walk_tree(root, &mut |node| {
            if node.kind() == "comment" {
                comments.push(node);
            }
        });

        let mut lowering = Self {
            src,
            groups: Vec::new(),
        };
        for comment in comments {
            lowering.push_comment(comment);
        }
        lowering
    }

    fn text(&self, node: &Node) -> &'s str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// A comment leads when only whitespace precedes it on its line.
    fn is_leading(&self, node: &Node) -> bool {
        let start = node.start_byte();
        self.src[..start]
            .iter()
            .rev()
            .take_while(|byte| **byte != b'\n')
            .all(|byte| byte.is_ascii_whitespace())
    }

    fn push_comment(&mut self, node: Node) {
        let leading = self.is_leading(&node);
        let text = clean_comment(self.text(&node));
        let span = span_of(&node);

        if let Some(last) = self.groups.last_mut() {
            if leading && last.leading && span.start.line <= last.group.span.end.line + 1 {
                if !text.is_empty() {
                    if !last.group.text.is_empty() {
                        last.group.text.push('\n');
                    }
                    last.group.text.push_str(&text);
                }
                last.group.span.end_byte = span.end_byte;
                last.group.span.end = span.end;
                return;
            }
        }

        self.groups.push(RawGroup {
            group: CommentGroup { text, span },
            leading,
        });
    }

    /// Leading group that ends on the line right before `node`.
    fn doc_for(&self, node: &Node) -> Option<CommentGroup> {
        let start = position_of(node);
        self.groups
            .iter()
            .find(|raw| {
                raw.leading
                    && raw.group.span.end.line + 1 == start.line
                    && raw.group.span.end_byte <= node.start_byte()
            })
            .map(|raw| raw.group.clone())
    }

    /// Trailing group on the same line as the end of `node`.
    fn line_comment_for(&self, node: &Node) -> Option<CommentGroup> {
        let end_line = node.end_position().row + 1;
        self.groups
            .iter()
            .find(|raw| {
                !raw.leading
                    && raw.group.span.start.line == end_line
                    && raw.group.span.start_byte >= node.end_byte()
            })
            .map(|raw| raw.group.clone())
    }

    fn lower(self, root: Node) -> GoFile {
        let mut file = GoFile {
            comments: self.groups.iter().map(|raw| raw.group.clone()).collect(),
            ..GoFile::default()
        };

        let mut cursor = root.walk();
        let children: Vec<Node> = root.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "package_clause" => {
                    let mut inner = child.walk();
                    file.package = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| self.text(&n).to_string())
                        .unwrap_or_default();
                    file.package_doc = self.doc_for(&child);
                }
                "function_declaration" | "method_declaration" => {
                    file.decls.push(Decl::Func(self.lower_func(child)));
                }
                "var_declaration" => {
                    file.decls
                        .push(Decl::Value(self.lower_value_decl(child, ValueKind::Var)));
                }
                "const_declaration" => {
                    file.decls
                        .push(Decl::Value(self.lower_value_decl(child, ValueKind::Const)));
                }
                "type_declaration" => {
                    file.decls.push(Decl::Type(self.lower_type_decl(child)));
                }
                _ => {}
            }
        }

        file
    }

    fn ident(&self, node: Node) -> Ident {
        Ident {
            name: self.text(&node).to_string(),
            position: position_of(&node),
        }
    }

    fn classify_type(&self, node: Option<Node>) -> TypeExpr {
        let Some(node) = node else {
            return TypeExpr::Unknown;
        };
        match node.kind() {
            "type_identifier" => TypeExpr::Named(self.text(&node).to_string()),
            "qualified_type" => node
                .child_by_field_name("name")
                .map(|name| TypeExpr::Named(self.text(&name).to_string()))
                .unwrap_or(TypeExpr::Unknown),
            "pointer_type" | "parenthesized_type" => self.classify_type(node.named_child(0)),
            "generic_type" => self.classify_type(node.child_by_field_name("type")),
            "array_type" | "slice_type" | "implicit_length_array_type" => TypeExpr::Array,
            "struct_type" => TypeExpr::Struct,
            "function_type" => TypeExpr::Func,
            "interface_type" => TypeExpr::Interface,
            "map_type" => TypeExpr::Map,
            "channel_type" => TypeExpr::Channel,
            _ => TypeExpr::Unknown,
        }
    }

    fn lower_fields(&self, list: Option<Node>) -> Vec<Field> {
        let Some(list) = list else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        let declarations: Vec<Node> = list.named_children(&mut cursor).collect();

        declarations
            .into_iter()
            .filter(|decl| {
                matches!(
                    decl.kind(),
                    "parameter_declaration"
                        | "variadic_parameter_declaration"
                        | "field_declaration"
                )
            })
            .map(|decl| {
                let mut names_cursor = decl.walk();
                let names = decl
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|name| self.ident(name))
                    .collect();
                let ty = if decl.kind() == "variadic_parameter_declaration" {
                    TypeExpr::Array
                } else {
                    self.classify_type(decl.child_by_field_name("type"))
                };
                Field {
                    names,
                    ty,
                    doc: self.doc_for(&decl),
                    comment: self.line_comment_for(&decl),
                }
            })
            .collect()
    }

    fn lower_results(&self, result: Option<Node>) -> Vec<Field> {
        match result {
            Some(node) if node.kind() == "parameter_list" => self.lower_fields(Some(node)),
            Some(node) => vec![Field {
                names: Vec::new(),
                ty: self.classify_type(Some(node)),
                doc: None,
                comment: None,
            }],
            None => Vec::new(),
        }
    }

    fn receiver_type(&self, node: Option<Node>) -> Option<(String, bool)> {
        let node = node?;
        match node.kind() {
            "type_identifier" => Some((self.text(&node).to_string(), false)),
            "pointer_type" => self
                .receiver_type(node.named_child(0))
                .map(|(name, _)| (name, true)),
            "generic_type" => self.receiver_type(node.child_by_field_name("type")),
            "parenthesized_type" => self.receiver_type(node.named_child(0)),
            _ => None,
        }
    }

    fn lower_receiver(&self, list: Option<Node>) -> Option<Receiver> {
        let list = list?;
        let mut cursor = list.walk();
        let param = list
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        let (type_name, pointer) = self.receiver_type(param.child_by_field_name("type"))?;
        Some(Receiver {
            name: param
                .child_by_field_name("name")
                .map(|n| self.text(&n).to_string()),
            type_name,
            pointer,
        })
    }

    fn lower_func(&self, node: Node) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.ident(n))
            .unwrap_or_else(|| Ident {
                name: String::new(),
                position: position_of(&node),
            });

        let receiver = if node.kind() == "method_declaration" {
            self.lower_receiver(node.child_by_field_name("receiver"))
        } else {
            None
        };

        FuncDecl {
            name,
            receiver,
            params: self.lower_fields(node.child_by_field_name("parameters")),
            results: self.lower_results(node.child_by_field_name("result")),
            doc: self.doc_for(&node),
            span: span_of(&node),
            body: node
                .child_by_field_name("body")
                .map(|body| self.lower_body(body))
                .unwrap_or_default(),
        }
    }

    fn identifiers_in(&self, node: Option<Node>) -> Vec<Ident> {
        let Some(node) = node else {
            return Vec::new();
        };
        if node.kind() == "identifier" {
            return vec![self.ident(node)];
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        children
            .into_iter()
            .filter(|n| n.kind() == "identifier")
            .map(|n| self.ident(n))
            .collect()
    }

    fn string_literal(&self, node: &Node) -> Option<String> {
        if !matches!(node.kind(), "interpreted_string_literal" | "raw_string_literal") {
            return None;
        }
        let text = self.text(node);
        if text.len() < 2 {
            return Some(String::new());
        }
        Some(text[1..text.len() - 1].to_string())
    }

    fn literals_in(&self, node: Option<Node>) -> Vec<String> {
        let mut literals = Vec::new();
        if let Some(node) = node {
            walk_tree(node, &mut |n| {
                if let Some(literal) = self.string_literal(&n) {
                    literals.push(literal);
                }
            });
        }
        literals
    }

    fn lower_body(&self, body: Node) -> FuncBody {
        let mut lowered = FuncBody::default();

        walk_tree(body, &mut |node| match node.kind() {
            "short_var_declaration" => {
                for ident in self.identifiers_in(node.child_by_field_name("left")) {
                    lowered.locals.push(LocalBinding {
                        name: ident.name,
                        kind: ValueKind::Var,
                        position: ident.position,
                    });
                }
            }
            "var_spec" | "const_spec" => {
                let kind = if node.kind() == "var_spec" {
                    ValueKind::Var
                } else {
                    ValueKind::Const
                };
                let mut cursor = node.walk();
                let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
                for name in names {
                    let ident = self.ident(name);
                    lowered.locals.push(LocalBinding {
                        name: ident.name,
                        kind,
                        position: ident.position,
                    });
                }
            }
            "assignment_statement" => {
                lowered.assigned.extend(
                    self.identifiers_in(node.child_by_field_name("left"))
                        .into_iter()
                        .map(|ident| ident.name),
                );
            }
            "range_clause" => {
                let declares = {
                    let mut cursor = node.walk();
                    let found = node.children(&mut cursor).any(|c| c.kind() == ":=");
                    found
                };
                for ident in self.identifiers_in(node.child_by_field_name("left")) {
                    if declares {
                        lowered.locals.push(LocalBinding {
                            name: ident.name,
                            kind: ValueKind::Var,
                            position: ident.position,
                        });
                    } else {
                        lowered.range_vars.push(ident.name);
                    }
                }
            }
            "interpreted_string_literal" | "raw_string_literal" => {
                if let Some(literal) = self.string_literal(&node) {
                    lowered.literals.push(literal);
                }
            }
            _ => {}
        });

        lowered
    }

    fn has_paren(node: &Node) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| c.kind() == "(");
        found
    }

    fn lower_value_decl(&self, node: Node, kind: ValueKind) -> ValueDecl {
        let spec_kind = match kind {
            ValueKind::Var => "var_spec",
            ValueKind::Const => "const_spec",
        };

        let mut spec_nodes = Vec::new();
        let mut grouped = Self::has_paren(&node);
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == spec_kind {
                spec_nodes.push(child);
            } else if child.kind() == "var_spec_list" {
                grouped = grouped || Self::has_paren(&child);
                let mut inner = child.walk();
                spec_nodes.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|n| n.kind() == spec_kind),
                );
            }
        }

        let specs = spec_nodes
            .into_iter()
            .map(|spec| {
                let mut names_cursor = spec.walk();
                let names = spec
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|name| self.ident(name))
                    .collect();
                let ty = spec
                    .child_by_field_name("type")
                    .map(|ty| self.classify_type(Some(ty)));
                ValueSpec {
                    names,
                    ty,
                    literals: self.literals_in(spec.child_by_field_name("value")),
                    doc: if grouped { self.doc_for(&spec) } else { None },
                    comment: self.line_comment_for(&spec),
                    span: span_of(&spec),
                }
            })
            .collect();

        ValueDecl {
            kind,
            grouped,
            doc: self.doc_for(&node),
            specs,
        }
    }

    fn lower_interface(&self, node: Node) -> Vec<InterfaceMethod> {
        let mut cursor = node.walk();
        let elems: Vec<Node> = node.named_children(&mut cursor).collect();
        elems
            .into_iter()
            .filter(|elem| matches!(elem.kind(), "method_elem" | "method_spec"))
            .filter_map(|elem| {
                let name = elem.child_by_field_name("name")?;
                Some(InterfaceMethod {
                    name: self.ident(name),
                    doc: self.doc_for(&elem),
                    comment: self.line_comment_for(&elem),
                })
            })
            .collect()
    }

    fn lower_type_decl(&self, node: Node) -> TypeDecl {
        let grouped = Self::has_paren(&node);
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();

        let specs = children
            .into_iter()
            .filter(|child| matches!(child.kind(), "type_spec" | "type_alias"))
            .filter_map(|spec| {
                let name = self.ident(spec.child_by_field_name("name")?);
                let ty = spec.child_by_field_name("type");
                let body = match ty {
                    Some(ty) if ty.kind() == "struct_type" => {
                        let mut inner = ty.walk();
                        let list = ty
                            .named_children(&mut inner)
                            .find(|n| n.kind() == "field_declaration_list");
                        TypeBody::Struct(self.lower_fields(list))
                    }
                    Some(ty) if ty.kind() == "interface_type" => {
                        TypeBody::Interface(self.lower_interface(ty))
                    }
                    other => TypeBody::Other(self.classify_type(other)),
                };
                Some(TypeSpec {
                    name,
                    doc: if grouped { self.doc_for(&spec) } else { None },
                    comment: self.line_comment_for(&spec),
                    span: span_of(&spec),
                    body,
                })
            })
            .collect();

        TypeDecl {
            grouped,
            doc: self.doc_for(&node),
            specs,
        }
    }
}

#[cfg(test)]
#[path = "go_tests.rs"]
mod tests;

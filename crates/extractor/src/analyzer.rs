use crate::error::{ExtractError, Result};
use archmap_model::{Annotation, Field, Parameter};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// A method declaration with its extracted surface and the AST node it came
/// from, kept so routing resolution can revisit raw attribute expressions.
pub(crate) struct MethodDecl<'a> {
    pub node: Node<'a>,
    pub name: String,
    pub return_type: String,
    pub annotations: Vec<Annotation>,
    pub parameters: Vec<Parameter>,
}

/// A call expression found inside a method body.
pub(crate) struct CallSite<'a> {
    pub node: Node<'a>,
    pub name: String,
    pub object_name: String,
    pub object_type: String,
    pub called_from: String,
    pub argument_contents: String,
}

/// One parsed source file: the per-file extraction context.
///
/// All parser state lives here rather than in process-wide statics, so
/// independent files can be extracted concurrently.
pub(crate) struct JavaUnit {
    source: String,
    class_name: String,
    package_name: String,
    tree: Tree,
}

impl JavaUnit {
    /// Parse `source` as a Java compilation unit.
    pub fn parse(parser: &mut Parser, source: &str, path: &str) -> Result<Self> {
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::parse(format!("failed to parse {path}")))?;
        if tree.root_node().has_error() {
            return Err(ExtractError::parse(format!("syntax errors in {path}")));
        }

        let class_name = Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let mut unit = Self {
            source: source.to_string(),
            class_name,
            package_name: String::new(),
            tree,
        };
        unit.package_name = unit.extract_package_name();
        Ok(unit)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// `<package>.<ClassName>`, the per-file identity stamped on every
    /// extracted entity.
    pub fn package_and_class_name(&self) -> String {
        if self.package_name.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.class_name)
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }

    fn extract_package_name(&self) -> String {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_declaration" {
                let mut inner = child.walk();
                for part in child.children(&mut inner) {
                    if matches!(part.kind(), "identifier" | "scoped_identifier") {
                        return self.text(part).to_string();
                    }
                }
            }
        }
        String::new()
    }

    /// Annotations attached to class, interface, or enum declarations.
    pub fn class_annotations(&self) -> Vec<Node<'_>> {
        let mut annotations = Vec::new();
        for decl in self.collect(&[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
        ]) {
            let mut cursor = decl.walk();
            for child in decl.children(&mut cursor) {
                if child.kind() == "modifiers" {
                    let mut inner = child.walk();
                    for modifier in child.children(&mut inner) {
                        if matches!(modifier.kind(), "annotation" | "marker_annotation") {
                            annotations.push(modifier);
                        }
                    }
                }
            }
        }
        annotations
    }

    /// Simple name of an annotation node (`@com.example.Foo` yields `Foo`).
    pub fn annotation_name(&self, node: Node) -> String {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        name.rsplit('.').next().unwrap_or(name).to_string()
    }

    /// Raw text of a named annotation attribute: the first `key = value`
    /// pair whose key is in `keys`. Outer quotes are stripped but the value
    /// is otherwise untouched, so non-literal expressions
    /// (`RequestMethod.GET`) come back verbatim.
    pub fn annotation_named_value(&self, node: Node, keys: &[&str]) -> Option<String> {
        let arguments = node.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        for child in arguments.children(&mut cursor) {
            if child.kind() == "element_value_pair" {
                let key = child
                    .child_by_field_name("key")
                    .map(|k| self.text(k))
                    .unwrap_or_default();
                if keys.contains(&key) {
                    let value = child.child_by_field_name("value")?;
                    return Some(strip_quotes(self.text(value)).to_string());
                }
            }
        }
        None
    }

    /// Raw text of a single positional annotation value (`@Foo("bar")`),
    /// outer quotes stripped.
    pub fn annotation_positional_value(&self, node: Node) -> Option<String> {
        let arguments = node.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        for child in arguments.children(&mut cursor) {
            if child.kind() == "element_value_pair" {
                return None;
            }
            if child.is_named() && !matches!(child.kind(), "line_comment" | "block_comment") {
                return Some(strip_quotes(self.text(child)).to_string());
            }
        }
        None
    }

    /// Path-style attribute of a routing annotation: a named `path`/`value`
    /// pair, or the positional value.
    pub fn annotation_path_value(&self, node: Node, keys: &[&str]) -> Option<String> {
        self.annotation_named_value(node, keys)
            .or_else(|| self.annotation_positional_value(node))
    }

    /// Distill an annotation node into the model form: name plus the
    /// string-literal attributes. Non-literal attribute values are dropped;
    /// a positional literal lands under the key `default`.
    pub fn annotation_model(&self, node: Node) -> Annotation {
        let mut annotation = Annotation::new(self.annotation_name(node), self.package_and_class_name());
        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for child in arguments.children(&mut cursor) {
                if child.kind() == "element_value_pair" {
                    let key = child
                        .child_by_field_name("key")
                        .map(|k| self.text(k))
                        .unwrap_or_default();
                    if let Some(value) = child.child_by_field_name("value") {
                        if value.kind() == "string_literal" {
                            annotation
                                .attributes
                                .insert(key.to_string(), strip_quotes(self.text(value)).to_string());
                        }
                    }
                } else if child.kind() == "string_literal" {
                    annotation
                        .attributes
                        .insert("default".to_string(), strip_quotes(self.text(child)).to_string());
                }
            }
        }
        annotation
    }

    /// One `Field` per variable declarator in the file.
    pub fn fields(&self) -> Vec<Field> {
        let identity = self.package_and_class_name();
        let mut fields = Vec::new();
        for declaration in self.collect(&["field_declaration"]) {
            let type_name = declaration
                .child_by_field_name("type")
                .map(|t| self.text(t).to_string())
                .unwrap_or_default();
            let mut cursor = declaration.walk();
            for child in declaration.children(&mut cursor) {
                if child.kind() == "variable_declarator" {
                    if let Some(name) = child.child_by_field_name("name") {
                        fields.push(Field {
                            name: self.text(name).to_string(),
                            package_and_class_name: identity.clone(),
                            type_name: type_name.clone(),
                        });
                    }
                }
            }
        }
        fields
    }

    /// Initializer text of the same-class field named `name`, outer quotes
    /// stripped.
    pub fn field_initializer(&self, name: &str) -> Option<String> {
        for declaration in self.collect(&["field_declaration"]) {
            let mut cursor = declaration.walk();
            for child in declaration.children(&mut cursor) {
                if child.kind() != "variable_declarator" {
                    continue;
                }
                let matches_name = child
                    .child_by_field_name("name")
                    .map(|n| self.text(n) == name)
                    .unwrap_or(false);
                if matches_name {
                    let value = child.child_by_field_name("value")?;
                    return Some(strip_quotes(self.text(value)).to_string());
                }
            }
        }
        None
    }

    /// All method declarations, including bodiless interface methods.
    pub fn methods(&self) -> Vec<MethodDecl<'_>> {
        let identity = self.package_and_class_name();
        self.collect(&["method_declaration"])
            .into_iter()
            .map(|node| MethodDecl {
                node,
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
                return_type: node
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string())
                    .unwrap_or_default(),
                annotations: self.node_annotations(node),
                parameters: self.method_parameters(node, &identity),
            })
            .collect()
    }

    /// Annotation nodes attached to a declaration's modifier list.
    pub fn annotation_nodes<'a>(&self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifiers" {
                let mut inner = child.walk();
                for modifier in child.children(&mut inner) {
                    if matches!(modifier.kind(), "annotation" | "marker_annotation") {
                        out.push(modifier);
                    }
                }
            }
        }
        out
    }

    fn node_annotations(&self, node: Node) -> Vec<Annotation> {
        self.annotation_nodes(node)
            .into_iter()
            .map(|a| self.annotation_model(a))
            .collect()
    }

    fn method_parameters(&self, method: Node, identity: &str) -> Vec<Parameter> {
        let Some(parameters) = method.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = parameters.walk();
        for child in parameters.children(&mut cursor) {
            if !matches!(child.kind(), "formal_parameter" | "spread_parameter") {
                continue;
            }
            let name = child
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            let type_name = child
                .child_by_field_name("type")
                .map(|t| self.text(t).to_string())
                .unwrap_or_default();
            out.push(Parameter {
                name,
                package_and_class_name: identity.to_string(),
                type_name,
                annotations: self.node_annotations(child),
            });
        }
        out
    }

    /// Every call expression in every method body, with a best-effort
    /// receiver type. Unknown receivers yield an empty type and the call is
    /// retained as a plain call.
    pub fn method_calls(&self) -> Vec<CallSite<'_>> {
        let mut calls = Vec::new();
        for method in self.collect(&["method_declaration"]) {
            let Some(body) = method.child_by_field_name("body") else {
                continue;
            };
            let called_from = method
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            for invocation in collect_in(body, &["method_invocation"]) {
                let name = invocation
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let object_name = invocation
                    .child_by_field_name("object")
                    .filter(|o| o.kind() == "identifier")
                    .map(|o| self.text(o).to_string())
                    .unwrap_or_default();
                let object_type = if object_name.is_empty() {
                    String::new()
                } else {
                    self.resolve_receiver_type(&object_name, method)
                };
                calls.push(CallSite {
                    node: invocation,
                    name,
                    object_name,
                    object_type,
                    called_from: called_from.clone(),
                    argument_contents: self.argument_text(invocation),
                });
            }
        }
        calls
    }

    fn argument_text(&self, invocation: Node) -> String {
        let Some(arguments) = invocation.child_by_field_name("arguments") else {
            return String::new();
        };
        let mut parts = Vec::new();
        let mut cursor = arguments.walk();
        for child in arguments.children(&mut cursor) {
            if child.is_named() {
                parts.push(self.text(child).to_string());
            }
        }
        parts.join(",")
    }

    /// Resolve the declared type of a receiver variable within this file:
    /// same-class fields, then the enclosing method's parameters, then its
    /// locals. A capitalized receiver with no declaration is taken to be a
    /// type name itself (static call); anything else is unknown.
    fn resolve_receiver_type(&self, receiver: &str, method: Node) -> String {
        for field in self.fields() {
            if field.name == receiver {
                return simple_type(&field.type_name);
            }
        }
        if let Some(parameters) = method.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            for child in parameters.children(&mut cursor) {
                if matches!(child.kind(), "formal_parameter" | "spread_parameter") {
                    let matches_name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n) == receiver)
                        .unwrap_or(false);
                    if matches_name {
                        if let Some(type_node) = child.child_by_field_name("type") {
                            return simple_type(self.text(type_node));
                        }
                    }
                }
            }
        }
        if let Some(body) = method.child_by_field_name("body") {
            for declaration in collect_in(body, &["local_variable_declaration"]) {
                let type_name = declaration
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string())
                    .unwrap_or_default();
                let mut cursor = declaration.walk();
                for child in declaration.children(&mut cursor) {
                    if child.kind() == "variable_declarator" {
                        let matches_name = child
                            .child_by_field_name("name")
                            .map(|n| self.text(n) == receiver)
                            .unwrap_or(false);
                        if matches_name {
                            return simple_type(&type_name);
                        }
                    }
                }
            }
        }
        if receiver.chars().next().is_some_and(char::is_uppercase) {
            return receiver.to_string();
        }
        String::new()
    }

    /// Simple names of the interfaces implemented by the file's class.
    /// Type arguments do not identify an interface, so only the base name of
    /// a generic type counts.
    pub fn implemented_types(&self) -> Vec<String> {
        let mut types = Vec::new();
        for declaration in self.collect(&["class_declaration"]) {
            let Some(interfaces) = declaration.child_by_field_name("interfaces") else {
                continue;
            };
            let mut cursor = interfaces.walk();
            for list in interfaces.children(&mut cursor) {
                if list.kind() != "type_list" {
                    continue;
                }
                let mut inner = list.walk();
                for type_node in list.children(&mut inner) {
                    match type_node.kind() {
                        "type_identifier" => types.push(self.text(type_node).to_string()),
                        "scoped_type_identifier" => {
                            types.push(simple_type(self.text(type_node)));
                        }
                        "generic_type" => {
                            if let Some(base) = type_node.child(0) {
                                if matches!(
                                    base.kind(),
                                    "type_identifier" | "scoped_type_identifier"
                                ) {
                                    types.push(simple_type(self.text(base)));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        types
    }

    fn collect<'a>(&'a self, kinds: &[&str]) -> Vec<Node<'a>> {
        collect_in(self.tree.root_node(), kinds)
    }
}

/// Depth-first collection of all descendant nodes of the given kinds.
fn collect_in<'a>(node: Node<'a>, kinds: &[&str]) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if kinds.contains(&current.kind()) {
            out.push(current);
        }
        let mut cursor = current.walk();
        let mut children: Vec<_> = current.children(&mut cursor).collect();
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Remove one layer of surrounding double quotes, if present.
pub(crate) fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Base name of a possibly generic or qualified type (`List<User>` yields
/// `List`, `java.util.List` yields `List`).
pub(crate) fn simple_type(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name).trim();
    base.rsplit('.').next().unwrap_or(base).to_string()
}

/// Build a parser for the Java grammar.
pub(crate) fn java_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| ExtractError::tree_sitter(format!("failed to set language: {e}")))?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(source: &str) -> JavaUnit {
        let mut parser = java_parser().unwrap();
        JavaUnit::parse(&mut parser, source, "/users/src/UserController.java").unwrap()
    }

    #[test]
    fn package_and_class_identity() {
        let unit = unit("package com.example.users;\n\npublic class UserController {}\n");
        assert_eq!(unit.package_name(), "com.example.users");
        assert_eq!(
            unit.package_and_class_name(),
            "com.example.users.UserController"
        );
    }

    #[test]
    fn class_annotations_and_attributes() {
        let unit = unit(
            "package com.example;\n\
             @RestController\n\
             @RequestMapping(\"users\")\n\
             public class UserController {}\n",
        );
        let annotations = unit.class_annotations();
        assert_eq!(annotations.len(), 2);
        assert_eq!(unit.annotation_name(annotations[0]), "RestController");
        assert_eq!(unit.annotation_path_value(annotations[0], &["path", "value"]), None);
        assert_eq!(
            unit.annotation_path_value(annotations[1], &["path", "value"]),
            Some("users".to_string())
        );
        assert_eq!(unit.annotation_named_value(annotations[1], &["method"]), None);
    }

    #[test]
    fn fields_and_initializers() {
        let unit = unit(
            "package com.example;\n\
             @Service\n\
             public class UserService {\n\
                 private static final String BASE = \"/api/users\";\n\
                 private UserRepository userRepository;\n\
             }\n",
        );
        let fields = unit.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].type_name, "UserRepository");
        assert_eq!(unit.field_initializer("BASE"), Some("/api/users".to_string()));
        assert_eq!(unit.field_initializer("missing"), None);
    }

    #[test]
    fn receiver_type_resolution_falls_back_to_simple_name() {
        let unit = unit(
            "package com.example;\n\
             @Service\n\
             public class UserService {\n\
                 private UserRepository userRepository;\n\
                 public void run(OrderClient orderClient) {\n\
                     UserMapper mapper = new UserMapper();\n\
                     userRepository.findAll();\n\
                     orderClient.fetch();\n\
                     mapper.map();\n\
                     Util.helper();\n\
                     unknown.call();\n\
                 }\n\
             }\n",
        );
        let calls = unit.method_calls();
        let by_name = |object: &str| {
            calls
                .iter()
                .find(|c| c.object_name == object)
                .map(|c| c.object_type.clone())
                .unwrap()
        };
        assert_eq!(by_name("userRepository"), "UserRepository");
        assert_eq!(by_name("orderClient"), "OrderClient");
        assert_eq!(by_name("mapper"), "UserMapper");
        assert_eq!(by_name("Util"), "Util");
        assert_eq!(by_name("unknown"), "");
    }

    #[test]
    fn implemented_types_use_simple_names() {
        let unit = unit(
            "package com.example;\n\
             @Service\n\
             public class UserServiceImpl implements UserService, Comparable<UserServiceImpl> {}\n",
        );
        let types = unit.implemented_types();
        assert_eq!(types, vec!["UserService".to_string(), "Comparable".to_string()]);
    }

    #[test]
    fn syntax_errors_are_a_parse_failure() {
        let mut parser = java_parser().unwrap();
        let result = JavaUnit::parse(&mut parser, "class {{{", "/broken.java");
        assert!(result.is_err());
    }
}

/**
 * query.rs
 * SPARQL query builders shared by the local graph and remote SPARQL endpoints
 *
 * Every scoped query carries a `{from_clause}` placeholder. The executing
 * backend substitutes its graph qualifier (empty for a local file, a
 * `FROM <graph>` clause for a merged multi-ontology store).
 */

pub const FROM_CLAUSE_PLACEHOLDER: &str = "{from_clause}";

const PREFIXES: &str = r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
PREFIX dc: <http://purl.org/dc/elements/1.1/>
PREFIX dcterms: <http://purl.org/dc/terms/>
"#;

/// Shape of the answer a query produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
    form: QueryForm,
    scoped: bool,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            form: QueryForm::Select,
            scoped: true,
        }
    }

    pub fn ask(query: impl Into<String>) -> Self {
        Self {
            form: QueryForm::Ask,
            ..Self::new(query)
        }
    }

    /// Queries that enumerate the whole store ignore graph scoping
    pub fn unscoped(mut self) -> Self {
        self.scoped = false;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn form(&self) -> QueryForm {
        self.form
    }

    pub fn is_scoped(&self) -> bool {
        self.scoped
    }

    /// Final query text with the graph qualifier substituted
    pub fn render(&self, from_clause: &str) -> String {
        let qualifier = if self.scoped { from_clause } else { "" };
        self.query.replace(FROM_CLAUSE_PLACEHOLDER, qualifier)
    }

    /// Label of a URI, preferring an English-tagged label
    pub fn label_of(uri: &str) -> Self {
        Self::new(format!(
            r#"{prefixes}
            SELECT DISTINCT ?label
            {from}
            WHERE {{
                OPTIONAL {{
                    <{uri}> rdfs:label ?label .
                    FILTER langMatches(lang(?label), "en")
                }}
                OPTIONAL {{
                    <{uri}> rdfs:label ?label .
                }}
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            uri = uri
        ))
    }

    /// Resources whose label matches `term` as a plain, string-typed or
    /// English-tagged literal. Underscore, hyphen and space are equivalent.
    pub fn uri_by_label(term: &str, case_sensitive: bool) -> Self {
        let pattern = escape_literal(&label_pattern(term));
        let flags = if case_sensitive { "" } else { r#", "i""# };
        Self::new(format!(
            r#"{prefixes}
            SELECT DISTINCT ?uri
            {from}
            WHERE {{
                {{
                    ?uri rdfs:label ?label .
                    FILTER (lang(?label) = "")
                }}
                UNION
                {{
                    ?uri rdfs:label ?label .
                    FILTER (datatype(?label) = xsd:string)
                }}
                UNION
                {{
                    ?uri rdfs:label ?label .
                    FILTER langMatches(lang(?label), "en")
                }}
                FILTER (isIRI(?uri) && regex(str(?label), "{pattern}"{flags}))
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            pattern = pattern,
            flags = flags
        ))
    }

    /// Direct (one hop) subclass test
    pub fn is_subclass(child_uri: &str, parent_uri: &str) -> Self {
        Self::ask(format!(
            r#"{prefixes}
            ASK
            {from}
            WHERE {{
                <{child}> rdfs:subClassOf <{parent}> .
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            child = child_uri,
            parent = parent_uri
        ))
    }

    /// Reflexive-transitive subclass test
    pub fn is_descendant(descendant_uri: &str, ancestor_uri: &str) -> Self {
        Self::ask(format!(
            r#"{prefixes}
            ASK
            {from}
            WHERE {{
                <{descendant}> rdfs:subClassOf* <{ancestor}> .
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            descendant = descendant_uri,
            ancestor = ancestor_uri
        ))
    }

    pub fn parents(uri: &str) -> Self {
        Self::related("?related", &format!("<{}> rdfs:subClassOf ?related", uri))
    }

    pub fn children(uri: &str) -> Self {
        Self::related("?related", &format!("?related rdfs:subClassOf <{}>", uri))
    }

    pub fn ancestors(uri: &str) -> Self {
        Self::related("?related", &format!("<{}> rdfs:subClassOf+ ?related", uri))
    }

    pub fn descendants(uri: &str) -> Self {
        Self::related("?related", &format!("?related rdfs:subClassOf+ <{}>", uri))
    }

    fn related(var: &str, pattern: &str) -> Self {
        Self::new(format!(
            r#"{prefixes}
            SELECT DISTINCT {var}
            {from}
            WHERE {{
                {pattern} .
                FILTER isIRI({var})
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            var = var,
            pattern = pattern
        ))
    }

    /// Every ontology resource in the store with its title
    pub fn ontologies() -> Self {
        Self::new(format!(
            r#"{prefixes}
            SELECT DISTINCT ?ontology ?title
            WHERE {{
                ?ontology rdf:type owl:Ontology .
                OPTIONAL {{ ?ontology dc:title ?title }}
                OPTIONAL {{ ?ontology dcterms:title ?title }}
            }}
            "#,
            prefixes = PREFIXES
        ))
        .unscoped()
    }

    pub fn is_named_individual(uri: &str) -> Self {
        Self::ask(format!(
            r#"{prefixes}
            ASK
            {from}
            WHERE {{
                <{uri}> rdf:type owl:NamedIndividual .
            }}
            "#,
            prefixes = PREFIXES,
            from = FROM_CLAUSE_PLACEHOLDER,
            uri = uri
        ))
    }

    pub fn instances_of(class_uri: &str) -> Self {
        Self::related("?instance", &format!("?instance rdf:type <{}>", class_uri))
    }
}

/// Anchored regex matching `term` with `_`, `-` and space interchangeable.
///
/// Only XPath regex metacharacters are escaped so the pattern is valid both
/// for SPARQL `regex()` and for the `regex` crate.
pub fn label_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 8);
    pattern.push('^');
    for c in term.chars() {
        match c {
            '_' | '-' | ' ' => pattern.push_str("[-_ ]"),
            '\\' | '.' | '?' | '*' | '+' | '|' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }
    pattern.push('$');
    pattern
}

/// Escape text for a double-quoted SPARQL string literal
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whether `uri` can be embedded as `<uri>` without breaking the query
pub fn is_safe_iri(uri: &str) -> bool {
    !uri.is_empty()
        && !uri
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'))
}

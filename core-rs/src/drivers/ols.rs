//! EBI Ontology Lookup Service (OLS) REST backend
//!
//! OLS addresses ontologies by a short identifier (`ncbitaxon`, `go`, ...).
//! The short id for an ontology URI is resolved from the paginated ontology
//! listing the first time it is needed and cached for the process lifetime.
//! Only a listing fetched to its last page is cached; a failed page leaves
//! the cache empty so the next lookup fetches again.

use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::config::ClientConfig;
use crate::drivers::http::HttpClient;
use crate::drivers::traits::{non_empty, QueryBackend};
use crate::errors::{Result, TytoError};
use crate::ontology::matching::{distinct, LabelMatcher};
use crate::ontology::Ontology;

pub const OLS_API_URL: &str = "https://www.ebi.ac.uk/ols4/api";

const PAGE_SIZE: &str = "500";
// The listing is fetched under `fetch_lock`, so first lookups of every
// ontology on a shared backend wait for it. OLS lists a few hundred
// ontologies, one page at this size.
const MAX_PAGES: usize = 20;

/// One entry of the OLS ontology listing
#[derive(Debug, Clone, PartialEq)]
pub struct OlsOntology {
    pub id: String,
    pub uris: Vec<String>,
    pub title: String,
}

/// One page of an OLS collection
#[derive(Debug, Clone, PartialEq)]
pub struct OlsPage<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
}

impl<T> OlsPage<T> {
    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

#[derive(Debug)]
pub struct OlsBackend {
    name: String,
    base_url: String,
    http: HttpClient,
    short_ids: RwLock<HashMap<String, String>>,
    titles: RwLock<BTreeMap<String, String>>,
    listing_complete: AtomicBool,
    fetch_lock: Mutex<()>,
}

impl OlsBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_base_url(OLS_API_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            name: "EBI OLS".to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HttpClient::new(config),
            short_ids: RwLock::new(HashMap::new()),
            titles: RwLock::new(BTreeMap::new()),
            listing_complete: AtomicBool::new(false),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Record listing entries; only ever adds keys
    pub fn remember(&self, ontologies: &[OlsOntology]) {
        let mut ids = self.short_ids.write().unwrap_or_else(|e| e.into_inner());
        let mut titles = self.titles.write().unwrap_or_else(|e| e.into_inner());
        for ontology in ontologies {
            for uri in &ontology.uris {
                ids.entry(normalize_uri(uri)).or_insert_with(|| ontology.id.clone());
            }
            if let Some(uri) = ontology.uris.first() {
                titles.entry(uri.clone()).or_insert_with(|| ontology.title.clone());
            }
        }
    }

    fn cached_short_id(&self, ontology_uri: &str) -> Option<String> {
        self.short_ids
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&normalize_uri(ontology_uri))
            .cloned()
    }

    /// OLS short id for the ontology, fetching the listing on first use
    fn short_id(&self, ontology: &Ontology) -> Result<Option<String>> {
        let uri = match ontology.uri() {
            Some(uri) if !uri.is_empty() => uri,
            _ => return Ok(None),
        };
        if let Some(id) = self.cached_short_id(uri) {
            return Ok(Some(id));
        }

        let _guard = self.fetch_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = self.cached_short_id(uri) {
            return Ok(Some(id));
        }
        if self.is_listing_cached() {
            return Ok(None);
        }
        self.fetch_listing()?;
        Ok(self.cached_short_id(uri))
    }

    fn is_listing_cached(&self) -> bool {
        self.listing_complete.load(Ordering::Acquire)
    }

    /// Fetch every listing page, then cache; any failed page caches nothing
    fn fetch_listing(&self) -> Result<()> {
        let url = format!("{}/ontologies", self.base_url);
        let mut ontologies = Vec::new();
        let mut page = 0usize;
        loop {
            let page_str = page.to_string();
            let body = match self.http.get_json(&url, &[("page", page_str.as_str()), ("size", PAGE_SIZE)])? {
                Some(body) => body,
                None => break,
            };
            let parsed = parse_ontology_page(&body)?;
            let has_next = parsed.has_next();
            ontologies.extend(parsed.items);
            if !has_next || page + 1 >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        self.remember(&ontologies);
        self.listing_complete.store(true, Ordering::Release);
        tracing::debug!(backend = %self.name, ontologies = self.titles.read().map(|t| t.len()).unwrap_or(0), "OLS ontology listing cached");
        Ok(())
    }

    /// Every IRI of a paginated term collection
    fn term_iris(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<Vec<String>>> {
        let mut iris = Vec::new();
        let mut page = 0usize;
        loop {
            let page_str = page.to_string();
            let mut params: Vec<(&str, &str)> = query.to_vec();
            params.push(("page", page_str.as_str()));
            params.push(("size", PAGE_SIZE));

            let body = match self.http.get_json(url, &params)? {
                Some(body) => body,
                None if page == 0 => return Ok(None),
                None => break,
            };
            let parsed = parse_term_page(&body)?;
            let has_next = parsed.has_next();
            iris.extend(parsed.items.into_iter().map(|(iri, _)| iri));
            if !has_next || page + 1 >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        Ok(Some(distinct(iris)))
    }

    fn relatives(&self, ontology: &Ontology, relation: &str, uri: &str) -> Result<Option<Vec<String>>> {
        let id = match self.short_id(ontology)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let url = format!("{}/ontologies/{}/{}", self.base_url, id, relation);
        self.term_iris(&url, &[("id", uri)])
    }
}

impl QueryBackend for OlsBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn term_for_uri(&self, ontology: &Ontology, uri: &str) -> Result<Option<String>> {
        let id = match self.short_id(ontology)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let url = format!("{}/ontologies/{}/terms", self.base_url, id);
        match self.http.get_json(&url, &[("iri", uri)])? {
            Some(body) => Ok(parse_term_page(&body)?
                .items
                .into_iter()
                .find(|(iri, _)| iri == uri)
                .map(|(_, label)| label)),
            None => Ok(None),
        }
    }

    fn uri_for_term(&self, ontology: &Ontology, term: &str) -> Result<Option<String>> {
        let id = match self.short_id(ontology)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let url = format!("{}/search", self.base_url);
        let body = match self.http.get_json(
            &url,
            &[
                ("q", term),
                ("ontology", id.as_str()),
                ("queryFields", "label"),
                ("exact", "true"),
                ("rows", "50"),
            ],
        )? {
            Some(body) => body,
            None => return Ok(None),
        };
        let candidates = parse_search_docs(&body)?;
        LabelMatcher::new(term)?.resolve(term, &candidates)
    }

    fn is_child_of(&self, ontology: &Ontology, child: &str, parent: &str) -> Result<Option<bool>> {
        Ok(self
            .relatives(ontology, "parents", child)?
            .map(|parents| parents.iter().any(|p| p == parent)))
    }

    fn is_descendant_of(&self, ontology: &Ontology, descendant: &str, ancestor: &str) -> Result<Option<bool>> {
        if descendant == ancestor {
            return Ok(Some(true));
        }
        Ok(self
            .relatives(ontology, "ancestors", descendant)?
            .map(|ancestors| ancestors.iter().any(|a| a == ancestor)))
    }

    fn get_parents(&self, ontology: &Ontology, uri: &str) -> Result<Option<Vec<String>>> {
        Ok(self.relatives(ontology, "parents", uri)?.and_then(non_empty))
    }

    fn get_children(&self, ontology: &Ontology, uri: &str) -> Result<Option<Vec<String>>> {
        Ok(self.relatives(ontology, "children", uri)?.and_then(non_empty))
    }

    fn get_ancestors(&self, ontology: &Ontology, uri: &str) -> Result<Option<Vec<String>>> {
        Ok(self.relatives(ontology, "ancestors", uri)?.and_then(non_empty))
    }

    fn get_descendants(&self, ontology: &Ontology, uri: &str) -> Result<Option<Vec<String>>> {
        Ok(self.relatives(ontology, "descendants", uri)?.and_then(non_empty))
    }

    fn get_ontologies(&self, _ontology: &Ontology) -> Result<Option<BTreeMap<String, String>>> {
        {
            let _guard = self.fetch_lock.lock().unwrap_or_else(|e| e.into_inner());
            if !self.is_listing_cached() {
                self.fetch_listing()?;
            }
        }
        let titles = self.titles.read().unwrap_or_else(|e| e.into_inner()).clone();
        Ok(if titles.is_empty() { None } else { Some(titles) })
    }

    fn is_instance(&self, ontology: &Ontology, uri: &str) -> Result<Option<bool>> {
        let id = match self.short_id(ontology)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let url = format!("{}/ontologies/{}/individuals", self.base_url, id);
        match self.http.get_json(&url, &[("iri", uri)])? {
            Some(body) => {
                let found = parse_individuals(&body)?.iter().any(|iri| iri == uri);
                Ok(if found { Some(true) } else { None })
            }
            None => Ok(None),
        }
    }
}

fn normalize_uri(uri: &str) -> String {
    uri.trim().trim_end_matches(['/', '#']).to_string()
}

fn str_field<'a>(value: &'a JsonValue, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(JsonValue::as_str)
}

fn page_info(body: &JsonValue) -> (usize, usize) {
    let number = body.pointer("/page/number").and_then(JsonValue::as_u64).unwrap_or(0) as usize;
    let total = body.pointer("/page/totalPages").and_then(JsonValue::as_u64).unwrap_or(1) as usize;
    (number, total)
}

/// Parse `GET /ontologies`
pub fn parse_ontology_page(body: &JsonValue) -> Result<OlsPage<OlsOntology>> {
    let (number, total_pages) = page_info(body);
    let entries = match body.pointer("/_embedded/ontologies") {
        Some(JsonValue::Array(entries)) => entries.as_slice(),
        Some(_) => {
            return Err(TytoError::UnexpectedResponse(
                "OLS ontology listing is not an array".to_string(),
            ))
        }
        None => &[],
    };

    let items = entries
        .iter()
        .filter_map(|entry| {
            let id = str_field(entry, "/ontologyId")?.to_string();
            let uris: Vec<String> = ["/config/id", "/config/versionIri", "/config/fileLocation"]
                .iter()
                .filter_map(|p| str_field(entry, p))
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            let title = str_field(entry, "/config/title").unwrap_or_default().to_string();
            Some(OlsOntology { id, uris, title })
        })
        .collect();

    Ok(OlsPage { items, number, total_pages })
}

/// Parse a term collection into `(iri, label)` pairs
pub fn parse_term_page(body: &JsonValue) -> Result<OlsPage<(String, String)>> {
    let (number, total_pages) = page_info(body);
    let terms = match body.pointer("/_embedded/terms") {
        Some(JsonValue::Array(terms)) => terms.as_slice(),
        Some(_) => {
            return Err(TytoError::UnexpectedResponse(
                "OLS term collection is not an array".to_string(),
            ))
        }
        None => &[],
    };
    let items = terms
        .iter()
        .filter_map(|t| {
            let iri = str_field(t, "/iri")?.to_string();
            let label = str_field(t, "/label").unwrap_or_default().to_string();
            Some((iri, label))
        })
        .collect();
    Ok(OlsPage { items, number, total_pages })
}

/// Parse `GET /search` docs into `(iri, label)` pairs
pub fn parse_search_docs(body: &JsonValue) -> Result<Vec<(String, String)>> {
    match body.pointer("/response/docs") {
        Some(JsonValue::Array(docs)) => Ok(docs
            .iter()
            .filter_map(|d| {
                let iri = str_field(d, "/iri")?.to_string();
                let label = str_field(d, "/label")?.to_string();
                Some((iri, label))
            })
            .collect()),
        Some(_) => Err(TytoError::UnexpectedResponse(
            "OLS search docs is not an array".to_string(),
        )),
        None => Ok(Vec::new()),
    }
}

fn parse_individuals(body: &JsonValue) -> Result<Vec<String>> {
    match body.pointer("/_embedded/individuals") {
        Some(JsonValue::Array(items)) => Ok(items
            .iter()
            .filter_map(|i| str_field(i, "/iri").map(String::from))
            .collect()),
        Some(_) => Err(TytoError::UnexpectedResponse(
            "OLS individuals is not an array".to_string(),
        )),
        None => Ok(Vec::new()),
    }
}

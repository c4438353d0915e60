//! PubChem PUG REST substance backend
//!
//! Substances are identified by SID. Public URIs use the identifiers.org
//! form `https://identifiers.org/pubchem.substance:<SID>`; the label of a
//! substance is its first synonym.

use serde_json::Value as JsonValue;

use crate::config::ClientConfig;
use crate::drivers::http::{join_segments, HttpClient};
use crate::drivers::traits::QueryBackend;
use crate::errors::{Result, TytoError};
use crate::ontology::Ontology;

pub const PUBCHEM_API_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
pub const PUBCHEM_SUBSTANCE_NAMESPACE: &str = "https://identifiers.org/pubchem.substance:";

#[derive(Debug)]
pub struct PubChemBackend {
    name: String,
    base_url: String,
    http: HttpClient,
}

impl PubChemBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_base_url(PUBCHEM_API_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            name: "PubChem".to_string(),
            base_url: base_url.into(),
            http: HttpClient::new(config),
        }
    }
}

/// SID embedded in a substance URI
pub fn sid_from_uri(uri: &str) -> Option<&str> {
    let sid = uri.strip_prefix(PUBCHEM_SUBSTANCE_NAMESPACE)?;
    if !sid.is_empty() && sid.bytes().all(|b| b.is_ascii_digit()) {
        Some(sid)
    } else {
        None
    }
}

pub fn uri_for_sid(sid: u64) -> String {
    format!("{}{}", PUBCHEM_SUBSTANCE_NAMESPACE, sid)
}

/// Parse `substance/name/<name>/sids/JSON`
pub fn parse_sids(body: &JsonValue) -> Result<Vec<u64>> {
    match body.pointer("/IdentifierList/SID") {
        Some(JsonValue::Array(sids)) => Ok(sids.iter().filter_map(JsonValue::as_u64).collect()),
        Some(_) => Err(TytoError::UnexpectedResponse(
            "PubChem SID list is not an array".to_string(),
        )),
        None => Ok(Vec::new()),
    }
}

/// One SID is the answer; several name different substances
pub fn resolve_sids(term: &str, sids: &[u64]) -> Result<Option<String>> {
    match sids {
        [] => Ok(None),
        [sid] => Ok(Some(uri_for_sid(*sid))),
        _ => Err(TytoError::AmbiguousTerm {
            term: term.to_string(),
            candidates: sids.iter().map(|sid| uri_for_sid(*sid)).collect(),
        }),
    }
}

/// Parse `substance/sid/<sid>/synonyms/JSON` into the preferred name
pub fn parse_first_synonym(body: &JsonValue) -> Option<String> {
    body.pointer("/InformationList/Information/0/Synonym/0")
        .and_then(JsonValue::as_str)
        .map(String::from)
}

impl QueryBackend for PubChemBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn term_for_uri(&self, _ontology: &Ontology, uri: &str) -> Result<Option<String>> {
        let sid = match sid_from_uri(uri) {
            Some(sid) => sid,
            None => return Ok(None),
        };
        let url = join_segments(&self.base_url, &["substance", "sid", sid, "synonyms", "JSON"])?;
        Ok(self.http.get_json(&url, &[])?.as_ref().and_then(parse_first_synonym))
    }

    fn uri_for_term(&self, _ontology: &Ontology, term: &str) -> Result<Option<String>> {
        if term.trim().is_empty() {
            return Ok(None);
        }
        let url = join_segments(&self.base_url, &["substance", "name", term, "sids", "JSON"])?;
        let body = match self.http.get_json(&url, &[])? {
            Some(body) => body,
            None => return Ok(None),
        };
        resolve_sids(term, &parse_sids(&body)?)
    }
}

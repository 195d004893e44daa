//! Retrieval: a single data-source descriptor.
//!
//! A retrieval names a transport method, an optional endpoint, optional
//! headers and body, and an optional script applied to the raw response.
//! Retrievals are immutable value objects: folding and provider expansion
//! always return a new retrieval.
//!
//! Structural invariants, enforced at construction and re-checked on wire
//! serialization:
//!
//! - RNG retrievals carry no url, headers, or body
//! - HTTP-GET and HTTP-HEAD retrievals carry no body

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use radon_script::{bytecode, wildcard, Script};
use radon_wire::{kind, RadRetrieve, StringPair};

use crate::error::{ArtifactError, Result};
use crate::json::script_json;

/// Transport method of a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    HttpGet,
    HttpHead,
    HttpPost,
    /// Provider-less randomness source.
    Rng,
}

impl Method {
    /// Wire kind code (see [`radon_wire::kind`]).
    pub fn kind(self) -> u32 {
        match self {
            Method::HttpGet => kind::HTTP_GET,
            Method::HttpHead => kind::HTTP_HEAD,
            Method::HttpPost => kind::HTTP_POST,
            Method::Rng => kind::RNG,
        }
    }

    /// Symbolic name for the humanized JSON form.
    pub fn name(self) -> &'static str {
        match self {
            Method::HttpGet => "HTTP-GET",
            Method::HttpHead => "HTTP-HEAD",
            Method::HttpPost => "HTTP-POST",
            Method::Rng => "RNG",
        }
    }
}

/// A single data-source descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    method: Method,
    url: Option<String>,
    headers: IndexMap<String, String>,
    body: Option<String>,
    script: Option<Script>,
    /// Optional names for the wildcard positions, enabling named folding.
    args_keys: Option<Vec<String>>,
}

impl Retrieval {
    fn new(method: Method, url: Option<String>, body: Option<String>) -> Self {
        Self {
            method,
            url,
            headers: IndexMap::new(),
            body,
            script: None,
            args_keys: None,
        }
    }

    /// An HTTP GET source.
    pub fn http_get(url: impl Into<String>) -> Self {
        Self::new(Method::HttpGet, Some(url.into()), None)
    }

    /// An HTTP HEAD source.
    pub fn http_head(url: impl Into<String>) -> Self {
        Self::new(Method::HttpHead, Some(url.into()), None)
    }

    /// An HTTP POST source with an optional body.
    pub fn http_post(url: impl Into<String>, body: Option<String>) -> Self {
        Self::new(Method::HttpPost, Some(url.into()), body)
    }

    /// A provider-less randomness source.
    pub fn rng() -> Self {
        Self::new(Method::Rng, None, None)
    }

    /// Add an HTTP header. Fails on RNG retrievals, which carry none.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        if self.method == Method::Rng {
            return Err(ArtifactError::ForbiddenField {
                method: "RNG",
                field: "headers",
            });
        }
        self.headers.insert(name.into(), value.into());
        Ok(self)
    }

    /// Attach the script applied to the raw response.
    pub fn with_script(mut self, script: impl Into<Script>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Declare names for the wildcard positions (enables [`Retrieval::fold_named`]).
    pub fn with_args_keys(mut self, keys: Vec<String>) -> Self {
        self.args_keys = Some(keys);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    pub fn args_keys(&self) -> Option<&[String]> {
        self.args_keys.as_deref()
    }

    /// Re-check the structural invariants. Constructors uphold them; this
    /// guards values that arrived through deserialization.
    pub(crate) fn validate(&self) -> Result<()> {
        match self.method {
            Method::Rng => {
                if self.url.is_some() {
                    return Err(ArtifactError::ForbiddenField {
                        method: "RNG",
                        field: "url",
                    });
                }
                if !self.headers.is_empty() {
                    return Err(ArtifactError::ForbiddenField {
                        method: "RNG",
                        field: "headers",
                    });
                }
                if self.body.is_some() {
                    return Err(ArtifactError::ForbiddenField {
                        method: "RNG",
                        field: "body",
                    });
                }
            }
            Method::HttpGet | Method::HttpHead => {
                if self.body.is_some() {
                    return Err(ArtifactError::ForbiddenField {
                        method: if self.method == Method::HttpGet {
                            "HTTP-GET"
                        } else {
                            "HTTP-HEAD"
                        },
                        field: "body",
                    });
                }
            }
            Method::HttpPost => {}
        }
        Ok(())
    }

    /// Max wildcard count across url, body, header names/values, and script.
    pub fn args_count(&self) -> Result<usize> {
        let mut count = 0;
        if let Some(url) = &self.url {
            count = count.max(wildcard::args_count(url)?);
        }
        if let Some(body) = &self.body {
            count = count.max(wildcard::args_count(body)?);
        }
        for (name, value) in &self.headers {
            count = count.max(wildcard::args_count(name)?);
            count = count.max(wildcard::args_count(value)?);
        }
        if let Some(script) = &self.script {
            count = count.max(script.args_count()?);
        }
        Ok(count)
    }

    /// Whether wildcard `\0\` is reserved to select a provider: the url is
    /// absent or mentions `\0\`. Fails on a malformed wildcard token rather
    /// than defaulting.
    pub fn is_modal(&self) -> Result<bool> {
        if self.method == Method::Rng {
            return Ok(false);
        }
        match &self.url {
            None => Ok(true),
            Some(url) => Ok(wildcard::contains(url, 0)?),
        }
    }

    /// New retrieval with every wildcard replaced positionally by `values`.
    ///
    /// The argument count must match [`Retrieval::args_count`] exactly;
    /// extra values are rejected, not dropped.
    pub fn fold_args<S: AsRef<str>>(&self, values: &[S]) -> Result<Retrieval> {
        let expected = self.args_count()?;
        if values.len() != expected {
            return Err(radon_script::ScriptError::ArityMismatch {
                expected,
                actual: values.len(),
            }
            .into());
        }
        tracing::debug!(args = expected, method = self.method.name(), "folding retrieval");
        Ok(Retrieval {
            method: self.method,
            url: self
                .url
                .as_deref()
                .map(|url| wildcard::replace(url, values))
                .transpose()?,
            headers: self
                .headers
                .iter()
                .map(|(name, value)| {
                    Ok((wildcard::replace(name, values)?, wildcard::replace(value, values)?))
                })
                .collect::<Result<_>>()?,
            body: self
                .body
                .as_deref()
                .map(|body| wildcard::replace(body, values))
                .transpose()?,
            script: self
                .script
                .as_ref()
                .map(|script| script.replace_wildcards(values))
                .transpose()?,
            args_keys: None,
        })
    }

    /// Fold by named key, using the declared `args_keys` to order values.
    pub fn fold_named(&self, values: &IndexMap<String, String>) -> Result<Retrieval> {
        let keys = self.args_keys.as_ref().ok_or(ArtifactError::NoArgsKeys)?;
        let ordered = keys
            .iter()
            .map(|key| {
                values
                    .get(key)
                    .cloned()
                    .ok_or_else(|| ArtifactError::MissingArgKey { key: key.clone() })
            })
            .collect::<Result<Vec<_>>>()?;
        self.fold_args(&ordered)
    }

    /// Expand a modal retrieval into one concrete retrieval per provider:
    /// wildcard `\0\` is spliced to the provider value and every other
    /// wildcard is renumbered down by one.
    pub fn spawn_retrievals<S: AsRef<str>>(&self, providers: &[S]) -> Result<Vec<Retrieval>> {
        providers
            .iter()
            .map(|provider| self.splice_provider(provider.as_ref()))
            .collect()
    }

    fn splice_provider(&self, provider: &str) -> Result<Retrieval> {
        Ok(Retrieval {
            method: self.method,
            url: match self.url.as_deref() {
                None => Some(provider.to_string()),
                Some(url) => Some(wildcard::splice(url, 0, provider)?),
            },
            headers: self
                .headers
                .iter()
                .map(|(name, value)| {
                    Ok((
                        wildcard::splice(name, 0, provider)?,
                        wildcard::splice(value, 0, provider)?,
                    ))
                })
                .collect::<Result<_>>()?,
            body: self
                .body
                .as_deref()
                .map(|body| wildcard::splice(body, 0, provider))
                .transpose()?,
            script: self
                .script
                .as_ref()
                .map(|script| script.splice_wildcard(0, provider))
                .transpose()?,
            args_keys: self.args_keys.as_ref().map(|keys| {
                // Key 0 named the provider slot; the rest shift down.
                keys.iter().skip(1).cloned().collect()
            }),
        })
    }

    /// Wire form of this retrieval.
    pub fn to_wire(&self) -> Result<RadRetrieve> {
        self.validate()?;
        let script = match &self.script {
            Some(script) => bytecode::encode(script)?,
            None => bytecode::encode(&Script::identity(radon_script::RadonTypeKind::String))?,
        };
        Ok(RadRetrieve {
            kind: self.method.kind(),
            url: self.url.clone().unwrap_or_default(),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| StringPair {
                    left: name.clone(),
                    right: value.clone(),
                })
                .collect(),
            body: self.body.as_deref().map(str::as_bytes).unwrap_or_default().to_vec(),
            script,
        })
    }

    /// Display/debugging JSON form. Never hashed.
    pub fn to_json(&self, humanize: bool) -> serde_json::Value {
        let method = if humanize {
            serde_json::Value::from(self.method.name())
        } else {
            serde_json::Value::from(self.method.kind())
        };
        let script = self
            .script
            .as_ref()
            .map(|script| script_json(script, humanize))
            .unwrap_or(serde_json::Value::Array(vec![]));
        serde_json::json!({
            "method": method,
            "url": self.url,
            "headers": self.headers,
            "body": self.body,
            "script": script,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radon_script::RadonString;

    #[test]
    fn test_rng_carries_nothing() {
        let rng = Retrieval::rng();
        assert_eq!(rng.method(), Method::Rng);
        assert!(rng.url().is_none());
        assert!(rng.validate().is_ok());
        assert!(matches!(
            rng.with_header("x", "y"),
            Err(ArtifactError::ForbiddenField { field: "headers", .. })
        ));
    }

    #[test]
    fn test_args_count_spans_all_fields() {
        let retrieval = Retrieval::http_post("https://x/\\0\\", Some("{\"id\":\"\\2\\\"}".into()))
            .with_header("X-Key", "\\1\\")
            .unwrap();
        assert_eq!(retrieval.args_count().unwrap(), 3);
    }

    #[test]
    fn test_args_count_includes_script() {
        let retrieval = Retrieval::http_get("https://x/")
            .with_script(RadonString::default().parse_json_map().get_float("\\1\\"));
        assert_eq!(retrieval.args_count().unwrap(), 2);
    }

    /// Folding a one-wildcard GET yields a fully concrete retrieval.
    #[test]
    fn test_fold_args_yields_concrete_retrieval() {
        let retrieval = Retrieval::http_get("https://x/\\0\\")
            .with_script(RadonString::default().as_float().round());
        assert_eq!(retrieval.args_count().unwrap(), 1);

        let folded = retrieval.fold_args(&["BTC"]).unwrap();
        assert_eq!(folded.url(), Some("https://x/BTC"));
        assert_eq!(folded.args_count().unwrap(), 0);
    }

    #[test]
    fn test_fold_args_rejects_wrong_arity_both_ways() {
        let retrieval = Retrieval::http_get("https://x/\\0\\");
        assert!(retrieval.fold_args::<&str>(&[]).is_err());
        assert!(retrieval.fold_args(&["a", "b"]).is_err());
    }

    #[test]
    fn test_fold_named() {
        let mut values = IndexMap::new();
        values.insert("base".to_string(), "BTC".to_string());
        values.insert("quote".to_string(), "USD".to_string());

        let retrieval = Retrieval::http_get("https://x/\\0\\-\\1\\")
            .with_args_keys(vec!["base".into(), "quote".into()]);
        let folded = retrieval.fold_named(&values).unwrap();
        assert_eq!(folded.url(), Some("https://x/BTC-USD"));

        let unnamed = Retrieval::http_get("https://x/\\0\\");
        assert!(matches!(
            unnamed.fold_named(&values),
            Err(ArtifactError::NoArgsKeys)
        ));
    }

    #[test]
    fn test_is_modal() {
        assert!(Retrieval::http_get("\\0\\").is_modal().unwrap());
        assert!(Retrieval::http_get("https://\\0\\/api").is_modal().unwrap());
        assert!(!Retrieval::http_get("https://fixed/api").is_modal().unwrap());
        assert!(!Retrieval::rng().is_modal().unwrap());
    }

    /// A malformed wildcard in the url surfaces as an error, never a
    /// silent "not modal".
    #[test]
    fn test_is_modal_rejects_malformed_wildcards() {
        let retrieval = Retrieval::http_get("https://x/\\10\\");
        assert!(matches!(
            retrieval.is_modal(),
            Err(ArtifactError::Script(
                radon_script::ScriptError::WildcardOutOfRange { index: 10 }
            ))
        ));
    }

    #[test]
    fn test_spawn_retrievals_consumes_wildcard_zero() {
        let modal = Retrieval::http_get("\\0\\/price?sym=\\1\\");
        let spawned = modal
            .spawn_retrievals(&["https://a", "https://b"])
            .unwrap();
        assert_eq!(spawned.len(), 2);
        assert_eq!(spawned[0].url(), Some("https://a/price?sym=\\0\\"));
        assert_eq!(spawned[1].url(), Some("https://b/price?sym=\\0\\"));
        assert_eq!(spawned[0].args_count().unwrap(), 1);
    }

    #[test]
    fn test_to_wire_identity_script_is_empty_cbor_array() {
        let wire = Retrieval::http_get("https://x/").to_wire().unwrap();
        assert_eq!(wire.kind, kind::HTTP_GET);
        assert_eq!(wire.script, vec![0x80]);
    }

    #[test]
    fn test_to_json_humanized_uses_method_name() {
        let retrieval =
            Retrieval::http_get("https://x/").with_script(RadonString::default().as_float());
        let human = retrieval.to_json(true);
        assert_eq!(human["method"], serde_json::Value::from("HTTP-GET"));
        assert_eq!(human["script"][0], serde_json::Value::from("StringAsFloat"));
        let raw = retrieval.to_json(false);
        assert_eq!(raw["method"], serde_json::Value::from(kind::HTTP_GET));
        assert_eq!(raw["script"][0], serde_json::Value::from(0x58));
    }
}

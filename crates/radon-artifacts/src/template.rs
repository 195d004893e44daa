//! Template: a parameterized, multi-source artifact.
//!
//! A template bundles one or more retrievals with the aggregate and tally
//! reducers, plus optional named sample argument sets. Folding a template
//! with concrete arguments yields a [`Request`](crate::Request).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use radon_script::Reducer;

use crate::error::{ArtifactError, Result};
use crate::json::reducer_json;
use crate::request::Request;
use crate::retrieval::Retrieval;

/// Arguments for folding a template.
#[derive(Debug, Clone)]
pub enum TemplateArgs<S> {
    /// One vector applied identically to every retrieval. Only valid when
    /// the template is homogeneous.
    Shared(Vec<S>),
    /// One vector per retrieval, in member order.
    PerRetrieval(Vec<Vec<S>>),
}

/// A parameterized data request with one or more sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    retrievals: Vec<Retrieval>,
    aggregate: Reducer,
    tally: Reducer,
    /// Named example argument sets, usable via [`Template::build_request_named`].
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    samples: IndexMap<String, Vec<String>>,
}

impl Template {
    pub fn new(retrievals: Vec<Retrieval>, aggregate: Reducer, tally: Reducer) -> Result<Self> {
        if retrievals.is_empty() {
            return Err(ArtifactError::EmptyTemplate);
        }
        for retrieval in &retrievals {
            retrieval.validate()?;
        }
        Ok(Self {
            retrievals,
            aggregate,
            tally,
            samples: IndexMap::new(),
        })
    }

    /// Attach named sample argument sets. Each sample must carry at least as
    /// many values as every member retrieval expects.
    pub fn with_samples(mut self, samples: IndexMap<String, Vec<String>>) -> Result<Self> {
        for (name, values) in &samples {
            for (index, retrieval) in self.retrievals.iter().enumerate() {
                let expected = retrieval.args_count()?;
                if values.len() < expected {
                    return Err(ArtifactError::SampleArity {
                        name: name.clone(),
                        index,
                        expected,
                        actual: values.len(),
                    });
                }
            }
        }
        self.samples = samples;
        Ok(self)
    }

    pub fn retrievals(&self) -> &[Retrieval] {
        &self.retrievals
    }

    pub fn aggregate(&self) -> &Reducer {
        &self.aggregate
    }

    pub fn tally(&self) -> &Reducer {
        &self.tally
    }

    pub fn samples(&self) -> &IndexMap<String, Vec<String>> {
        &self.samples
    }

    /// Max wildcard count across member retrievals.
    pub fn args_count(&self) -> Result<usize> {
        let mut count = 0;
        for retrieval in &self.retrievals {
            count = count.max(retrieval.args_count()?);
        }
        Ok(count)
    }

    /// Whether every member retrieval expects the same argument count.
    pub fn homogeneous(&self) -> Result<bool> {
        let mut counts = self.retrievals.iter().map(Retrieval::args_count);
        let first = match counts.next() {
            Some(first) => first?,
            None => return Ok(true),
        };
        for count in counts {
            if count? != first {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fold every member retrieval and assemble a concrete [`Request`].
    pub fn build_request<S: AsRef<str>>(&self, args: TemplateArgs<S>) -> Result<Request> {
        let folded = match args {
            TemplateArgs::Shared(values) => {
                if !self.homogeneous()? {
                    return Err(ArtifactError::SharedArgsNotHomogeneous {
                        retrievals: self.retrievals.len(),
                    });
                }
                self.retrievals
                    .iter()
                    .enumerate()
                    .map(|(index, retrieval)| self.fold_member(index, retrieval, &values))
                    .collect::<Result<Vec<_>>>()?
            }
            TemplateArgs::PerRetrieval(vectors) => {
                if vectors.len() != self.retrievals.len() {
                    return Err(ArtifactError::ArgsVectorCount {
                        expected: self.retrievals.len(),
                        actual: vectors.len(),
                    });
                }
                self.retrievals
                    .iter()
                    .zip(&vectors)
                    .enumerate()
                    .map(|(index, (retrieval, values))| self.fold_member(index, retrieval, values))
                    .collect::<Result<Vec<_>>>()?
            }
        };
        Request::new(folded, self.aggregate.clone(), self.tally.clone())
    }

    /// Fold using a named sample attached via [`Template::with_samples`].
    /// Each member takes its own prefix of the sample values.
    ///
    /// Sample arity is re-checked here: `with_samples` validates at
    /// construction, but a template can also arrive through
    /// deserialization, so an undersupplied sample must fail typed rather
    /// than assume the construction-time invariant.
    pub fn build_request_named(&self, name: &str) -> Result<Request> {
        let values = self
            .samples
            .get(name)
            .ok_or_else(|| ArtifactError::UnknownSample { name: name.to_string() })?
            .clone();
        let vectors = self
            .retrievals
            .iter()
            .enumerate()
            .map(|(index, retrieval)| {
                let expected = retrieval.args_count()?;
                if values.len() < expected {
                    return Err(ArtifactError::SampleArity {
                        name: name.to_string(),
                        index,
                        expected,
                        actual: values.len(),
                    });
                }
                Ok(values[..expected].to_vec())
            })
            .collect::<Result<Vec<_>>>()?;
        self.build_request(TemplateArgs::PerRetrieval(vectors))
    }

    fn fold_member<S: AsRef<str>>(
        &self,
        index: usize,
        retrieval: &Retrieval,
        values: &[S],
    ) -> Result<Retrieval> {
        let expected = retrieval.args_count()?;
        if values.len() != expected {
            return Err(ArtifactError::RetrievalArity {
                index,
                expected,
                actual: values.len(),
            });
        }
        retrieval.fold_args(values)
    }

    /// Display/debugging JSON form. Never hashed.
    pub fn to_json(&self, humanize: bool) -> serde_json::Value {
        serde_json::json!({
            "retrieve": self
                .retrievals
                .iter()
                .map(|retrieval| retrieval.to_json(humanize))
                .collect::<Vec<_>>(),
            "aggregate": reducer_json(&self.aggregate, humanize),
            "tally": reducer_json(&self.tally, humanize),
            "samples": self.samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radon_script::RadonString;

    fn price_retrieval(url: &str) -> Retrieval {
        Retrieval::http_get(url).with_script(RadonString::default().as_float())
    }

    fn template(retrievals: Vec<Retrieval>) -> Template {
        Template::new(retrievals, Reducer::price_aggregate(), Reducer::price_tally()).unwrap()
    }

    #[test]
    fn test_empty_template_rejected() {
        let result = Template::new(vec![], Reducer::price_aggregate(), Reducer::price_tally());
        assert!(matches!(result, Err(ArtifactError::EmptyTemplate)));
    }

    #[test]
    fn test_homogeneous_and_args_count() {
        let tpl = template(vec![
            price_retrieval("https://a/\\0\\"),
            price_retrieval("https://b/\\0\\"),
        ]);
        assert!(tpl.homogeneous().unwrap());
        assert_eq!(tpl.args_count().unwrap(), 1);

        let mixed = template(vec![
            price_retrieval("https://a/\\0\\"),
            price_retrieval("https://b/\\0\\-\\1\\"),
        ]);
        assert!(!mixed.homogeneous().unwrap());
        assert_eq!(mixed.args_count().unwrap(), 2);
    }

    #[test]
    fn test_shared_args_require_homogeneity() {
        let mixed = template(vec![
            price_retrieval("https://a/\\0\\"),
            price_retrieval("https://b/\\0\\-\\1\\"),
        ]);
        let result = mixed.build_request(TemplateArgs::Shared(vec!["BTC"]));
        assert!(matches!(
            result,
            Err(ArtifactError::SharedArgsNotHomogeneous { retrievals: 2 })
        ));
    }

    #[test]
    fn test_shared_args_fold_every_member() {
        let tpl = template(vec![
            price_retrieval("https://a/\\0\\"),
            price_retrieval("https://b/\\0\\"),
        ]);
        let request = tpl.build_request(TemplateArgs::Shared(vec!["BTC"])).unwrap();
        assert_eq!(request.retrievals()[0].url(), Some("https://a/BTC"));
        assert_eq!(request.retrievals()[1].url(), Some("https://b/BTC"));
    }

    #[test]
    fn test_per_retrieval_args() {
        let mixed = template(vec![
            price_retrieval("https://a/\\0\\"),
            price_retrieval("https://b/\\0\\-\\1\\"),
        ]);
        let request = mixed
            .build_request(TemplateArgs::PerRetrieval(vec![
                vec!["BTC"],
                vec!["BTC", "USD"],
            ]))
            .unwrap();
        assert_eq!(request.retrievals()[1].url(), Some("https://b/BTC-USD"));

        let wrong_outer = mixed.build_request(TemplateArgs::PerRetrieval(vec![vec!["BTC"]]));
        assert!(matches!(
            wrong_outer,
            Err(ArtifactError::ArgsVectorCount { expected: 2, actual: 1 })
        ));

        let wrong_inner = mixed.build_request(TemplateArgs::PerRetrieval(vec![
            vec!["BTC", "EXTRA"],
            vec!["BTC", "USD"],
        ]));
        assert!(matches!(
            wrong_inner,
            Err(ArtifactError::RetrievalArity { index: 0, expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_samples_validated_and_usable() {
        let mut samples = IndexMap::new();
        samples.insert("btc".to_string(), vec!["BTC".to_string()]);

        let tpl = template(vec![price_retrieval("https://a/\\0\\")])
            .with_samples(samples)
            .unwrap();
        let request = tpl.build_request_named("btc").unwrap();
        assert_eq!(request.retrievals()[0].url(), Some("https://a/BTC"));

        assert!(matches!(
            tpl.build_request_named("eth"),
            Err(ArtifactError::UnknownSample { .. })
        ));
    }

    /// `with_samples` checks at construction, but deserialization does not
    /// run it; an undersupplied sample must still fail with a typed arity
    /// error, not a slice panic.
    #[test]
    fn test_deserialized_short_sample_fails_typed() {
        let tpl = template(vec![price_retrieval("https://a/\\0\\-\\1\\")]);
        let mut value = serde_json::to_value(&tpl).unwrap();
        value["samples"] = serde_json::json!({ "bad": ["BTC"] });
        let tpl: Template = serde_json::from_value(value).unwrap();

        assert!(matches!(
            tpl.build_request_named("bad"),
            Err(ArtifactError::SampleArity {
                index: 0,
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_short_sample_rejected() {
        let mut samples = IndexMap::new();
        samples.insert("bad".to_string(), vec![]);
        let result = template(vec![price_retrieval("https://a/\\0\\")]).with_samples(samples);
        assert!(matches!(
            result,
            Err(ArtifactError::SampleArity { index: 0, expected: 1, actual: 0, .. })
        ));
    }
}

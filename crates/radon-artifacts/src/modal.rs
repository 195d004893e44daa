//! Modal: a multi-provider single-source artifact.
//!
//! A modal wraps one retrieval whose wildcard `\0\` (or entire url) names a
//! provider, plus a list of interchangeable provider base urls. Expanding a
//! modal splices one provider per member and yields an ordinary
//! [`Template`]; from there folding proceeds as usual.

use serde::{Deserialize, Serialize};

use radon_script::Reducer;

use crate::error::{ArtifactError, Result};
use crate::request::Request;
use crate::retrieval::Retrieval;
use crate::template::{Template, TemplateArgs};

/// A single retrieval replicated across interchangeable providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modal {
    retrieval: Retrieval,
    providers: Vec<String>,
    aggregate: Reducer,
    tally: Reducer,
}

impl Modal {
    /// Wrap a modal retrieval (one whose url is absent or mentions `\0\`).
    pub fn new(retrieval: Retrieval, aggregate: Reducer, tally: Reducer) -> Result<Self> {
        retrieval.validate()?;
        if !retrieval.is_modal()? {
            return Err(ArtifactError::NotModal);
        }
        Ok(Self {
            retrieval,
            providers: Vec::new(),
            aggregate,
            tally,
        })
    }

    /// Append one provider base url. Must be http(s).
    pub fn add_provider(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        check_provider_scheme(&url)?;
        self.providers.push(url);
        Ok(self)
    }

    /// Replace the provider list wholesale.
    pub fn with_providers(mut self, providers: Vec<String>) -> Result<Self> {
        for url in &providers {
            check_provider_scheme(url)?;
        }
        self.providers = providers;
        Ok(self)
    }

    pub fn retrieval(&self) -> &Retrieval {
        &self.retrieval
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Remaining (post-provider) argument count: wildcard `\0\` is consumed
    /// by provider expansion, so the underlying count shifts down by one.
    pub fn args_count(&self) -> Result<usize> {
        Ok(self.retrieval.args_count()?.saturating_sub(1))
    }

    /// Expand into a [`Template`] with one member per provider.
    ///
    /// `providers` overrides the stored list when given; either way the
    /// effective list must be non-empty.
    pub fn build_radon_template(&self, providers: Option<&[String]>) -> Result<Template> {
        let providers = providers.unwrap_or(&self.providers);
        if providers.is_empty() {
            return Err(ArtifactError::NoProviders);
        }
        for url in providers {
            check_provider_scheme(url)?;
        }
        let retrievals = self.retrieval.spawn_retrievals(providers)?;
        Template::new(retrievals, self.aggregate.clone(), self.tally.clone())
    }

    /// Expand and fold in one step, yielding a concrete [`Request`].
    pub fn build_radon_request<S: AsRef<str> + Clone>(&self, args: &[S]) -> Result<Request> {
        self.build_radon_template(None)?
            .build_request(TemplateArgs::Shared(args.to_vec()))
    }
}

fn check_provider_scheme(url: &str) -> Result<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ArtifactError::BadProviderScheme { url: url.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radon_script::RadonString;

    fn modal(url: &str) -> Modal {
        Modal::new(
            Retrieval::http_get(url).with_script(RadonString::default().as_float()),
            Reducer::price_aggregate(),
            Reducer::price_tally(),
        )
        .unwrap()
    }

    #[test]
    fn test_non_modal_retrieval_rejected() {
        let result = Modal::new(
            Retrieval::http_get("https://fixed/api"),
            Reducer::price_aggregate(),
            Reducer::price_tally(),
        );
        assert!(matches!(result, Err(ArtifactError::NotModal)));
    }

    #[test]
    fn test_provider_scheme_enforced() {
        let result = modal("\\0\\").add_provider("ftp://a");
        assert!(matches!(result, Err(ArtifactError::BadProviderScheme { .. })));
        assert!(modal("\\0\\").add_provider("https://a").is_ok());
    }

    /// A bare `\0\` url with two providers expands into a
    /// two-member homogeneous template.
    #[test]
    fn test_expand_to_template() {
        let modal = modal("\\0\\")
            .with_providers(vec!["https://a/price".into(), "https://b/price".into()])
            .unwrap();
        let template = modal.build_radon_template(None).unwrap();
        assert_eq!(template.retrievals().len(), 2);
        assert!(template.homogeneous().unwrap());
        assert_eq!(template.retrievals()[0].url(), Some("https://a/price"));
        assert_eq!(template.retrievals()[1].url(), Some("https://b/price"));
    }

    #[test]
    fn test_expand_without_providers_fails() {
        assert!(matches!(
            modal("\\0\\").build_radon_template(None),
            Err(ArtifactError::NoProviders)
        ));
    }

    #[test]
    fn test_args_count_excludes_provider_slot() {
        let with_arg = modal("\\0\\/price?sym=\\1\\");
        assert_eq!(with_arg.args_count().unwrap(), 1);
        assert_eq!(modal("\\0\\").args_count().unwrap(), 0);
    }

    #[test]
    fn test_build_request_end_to_end() {
        let modal = modal("\\0\\/price?sym=\\1\\")
            .with_providers(vec!["https://a".into(), "https://b".into()])
            .unwrap();
        let request = modal.build_radon_request(&["BTC"]).unwrap();
        assert_eq!(request.retrievals().len(), 2);
        assert_eq!(request.retrievals()[0].url(), Some("https://a/price?sym=BTC"));
        assert_eq!(request.retrievals()[1].url(), Some("https://b/price?sym=BTC"));
    }
}

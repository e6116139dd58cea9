#![forbid(unsafe_code)]

//! Link targets for tags.
//!
//! A [`LinkResolver`] turns a label into a URL-like string. The widget
//! treats the [`LinkContext`] as opaque and only passes it through.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::label::LabelPair;

/// Caller-supplied scope for link resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkContext {
    pub namespace: Option<String>,
}

impl LinkContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Resolves a label to a link target.
///
/// Must be a pure function of its inputs: it is called once per rendered
/// tag per frame.
pub trait LinkResolver {
    fn resolve(&self, pair: &LabelPair, ctx: &LinkContext) -> Option<String>;
}

impl<F> LinkResolver for F
where
    F: Fn(&LabelPair, &LinkContext) -> Option<String>,
{
    fn resolve(&self, pair: &LabelPair, ctx: &LinkContext) -> Option<String> {
        self(pair, ctx)
    }
}

/// Links each tag to a resource list filtered by that label.
///
/// `/namespaces/{ns}/{resource}?labelSelector={key=value}` with a namespace,
/// `/{resource}?labelSelector={key=value}` without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSelectorLinks {
    resource: String,
}

impl Default for LabelSelectorLinks {
    fn default() -> Self {
        Self::new("pipelineruns")
    }
}

impl LabelSelectorLinks {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl LinkResolver for LabelSelectorLinks {
    fn resolve(&self, pair: &LabelPair, ctx: &LinkContext) -> Option<String> {
        let selector = encode_uri_component(&format!("{}={}", pair.key, pair.value));
        let url = match ctx.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!(
                "/namespaces/{}/{}?labelSelector={selector}",
                encode_uri_component(ns),
                self.resource
            ),
            _ => format!("/{}?labelSelector={selector}", self.resource),
        };
        Some(url)
    }
}

/// Bytes `encodeURIComponent` escapes: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `input` as a URI component.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

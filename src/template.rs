//! Template renderer seam.
//!
//! waypost does not ship a template engine. Anything that can turn a template
//! name plus a few named values into a string plugs in through
//! [`TemplateRenderer`].

use crate::error::Error;
use crate::request::Request;

/// A value bound to a template variable.
#[derive(Clone, Copy, Debug)]
pub enum TemplateValue<'a> {
    /// The request being answered, for templates that introspect it.
    Request(&'a Request),
    Text(&'a str),
}

/// Named values handed to [`TemplateRenderer::render`], in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TemplateParams<'a> {
    entries: Vec<(&'a str, TemplateValue<'a>)>,
}

impl<'a> TemplateParams<'a> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Binds `name`, replacing an earlier binding of the same name.
    pub fn bind(mut self, name: &'a str, value: TemplateValue<'a>) -> Self {
        self.entries.retain(|(k, _)| *k != name);
        self.entries.push((name, value));
        self
    }

    pub fn get(&self, name: &str) -> Option<TemplateValue<'a>> {
        self.entries.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    pub fn text(&self, name: &str) -> Option<&'a str> {
        match self.get(name)? {
            TemplateValue::Text(s) => Some(s),
            TemplateValue::Request(_) => None,
        }
    }

    pub fn request(&self, name: &str) -> Option<&'a Request> {
        match self.get(name)? {
            TemplateValue::Request(r) => Some(r),
            TemplateValue::Text(_) => None,
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, TemplateValue<'a>)> + '_ {
        self.entries.iter().copied()
    }
}

/// Renders a named template.
///
/// Failures (unknown template, engine error) are reported as
/// [`Error::Render`] and propagated untouched by callers.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, params: &TemplateParams<'_>) -> Result<String, Error>;
}

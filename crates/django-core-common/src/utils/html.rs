//! Small HTML element builders.
//!
//! Output is already escaped and can be marked safe by the template layer.

use crate::utils::text::escape_html;

const VOID_TAGS: [&str; 4] = ["img", "input", "hr", "br"];

/// Builder for a single HTML element.
///
/// Attributes render in insertion order, with `class` last. Void tags
/// (`img`, `input`, `hr`, `br`) self-close and ignore text and icon.
///
/// ```
/// use django_core_common::utils::html::HtmlElement;
///
/// let html = HtmlElement::new("a")
///     .attr("href", "xyz.com")
///     .class("big")
///     .icon("fa fa-times")
///     .text("hello")
///     .render();
/// assert_eq!(html, r#"<a href="xyz.com" class="big"><i class="fa fa-times"></i> hello</a>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlElement {
    tag: String,
    text: Option<String>,
    icon_class: Option<String>,
    cls: Option<String>,
    attrs: Vec<(String, String)>,
}

impl HtmlElement {
    /// Starts an element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sets the (escaped) text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the css class of an `<i>` icon rendered before the text.
    #[must_use]
    pub fn icon(mut self, icon_class: impl Into<String>) -> Self {
        self.icon_class = Some(icon_class.into());
        self
    }

    /// Sets the element's `class` attribute.
    #[must_use]
    pub fn class(mut self, cls: impl Into<String>) -> Self {
        self.cls = Some(cls.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Adds several attributes.
    #[must_use]
    pub fn attrs<K, V>(mut self, attrs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.attrs.extend(
            attrs
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        self
    }

    /// Renders the element.
    pub fn render(&self) -> String {
        let mut open = self.tag.clone();
        let class_attr = self.cls.as_ref().map(|c| ("class".to_string(), c.clone()));
        for (name, value) in self.attrs.iter().chain(class_attr.iter()) {
            open.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
        }

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return format!("<{open} />");
        }

        let icon = self
            .icon_class
            .as_ref()
            .map(|c| format!("<i class=\"{}\"></i> ", escape_html(c)))
            .unwrap_or_default();
        let text = self.text.as_deref().map(escape_html).unwrap_or_default();
        format!("<{open}>{icon}{text}</{}>", self.tag)
    }
}

/// Builds any element in one call.
///
/// ```
/// use django_core_common::utils::html::build_html_element;
///
/// assert_eq!(
///     build_html_element("img", None, None, Some("thumb"), &[("src", "a.png")]),
///     r#"<img src="a.png" class="thumb" />"#
/// );
/// ```
pub fn build_html_element<K, V>(
    tag: &str,
    text: Option<&str>,
    icon_class: Option<&str>,
    cls: Option<&str>,
    attrs: &[(K, V)],
) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut element = HtmlElement::new(tag).attrs(attrs);
    if let Some(text) = text {
        element = element.text(text);
    }
    if let Some(cls) = cls {
        element = element.class(cls);
    }
    if let Some(icon) = icon_class {
        element = element.icon(icon);
    }
    element.render()
}

/// Builds an `<a>` element.
///
/// ```
/// use django_core_common::utils::html::build_link;
///
/// assert_eq!(
///     build_link("xyz.com", "hello", Some("big"), None, &[] as &[(&str, &str)]),
///     r#"<a href="xyz.com" class="big">hello</a>"#
/// );
/// ```
pub fn build_link<K, V>(
    href: &str,
    text: &str,
    cls: Option<&str>,
    icon_class: Option<&str>,
    attrs: &[(K, V)],
) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut element = HtmlElement::new("a").attr("href", href).attrs(attrs).text(text);
    if let Some(cls) = cls {
        element = element.class(cls);
    }
    if let Some(icon) = icon_class {
        element = element.icon(icon);
    }
    element.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_tag() {
        let html = HtmlElement::new("img")
            .attr("src", "/a.png")
            .text("ignored")
            .render();
        assert_eq!(html, r#"<img src="/a.png" />"#);
    }

    #[test]
    fn test_text_and_attrs_are_escaped() {
        let html = HtmlElement::new("div")
            .attr("title", "a\"b")
            .text("<script>")
            .render();
        assert_eq!(html, r#"<div title="a&quot;b">&lt;script&gt;</div>"#);
    }

    #[test]
    fn test_build_html_element_icon_only() {
        let html = build_html_element("span", None, Some("fa fa-check"), None, &[("id", "ok")]);
        assert_eq!(html, r#"<span id="ok"><i class="fa fa-check"></i> </span>"#);
    }

    #[test]
    fn test_link_extra_attrs_before_class() {
        let html = build_link("/x/", "X", Some("btn"), None, &[("target", "_blank")]);
        assert_eq!(html, r#"<a href="/x/" target="_blank" class="btn">X</a>"#);
    }

    #[test]
    fn test_link_with_icon() {
        let html = build_link(
            "xyz.com",
            "hello",
            Some("big"),
            Some("fa fa-times"),
            &[] as &[(&str, &str)],
        );
        assert_eq!(
            html,
            r#"<a href="xyz.com" class="big"><i class="fa fa-times"></i> hello</a>"#
        );
    }
}

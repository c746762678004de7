//! HTML links to a model's pages.

use django_core_common::utils::html::build_link;

use crate::model::Model;

/// Optional pieces of a generated link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Link text. Each link method has its own default.
    pub text: Option<String>,
    /// CSS class of the `<a>` element.
    pub cls: Option<String>,
    /// CSS class of an icon rendered before the text.
    pub icon_class: Option<String>,
    /// Extra attributes.
    pub attrs: Vec<(String, String)>,
}

impl LinkOptions {
    /// Options with only the link text set.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn render(&self, href: &str, default_text: &str) -> String {
        build_link(
            href,
            self.text.as_deref().unwrap_or(default_text),
            self.cls.as_deref(),
            self.icon_class.as_deref(),
            &self.attrs,
        )
    }
}

/// A model that can render links to its view, edit and delete pages.
pub trait UrlLink: Model {
    /// Field whose value is the default text of the absolute url link.
    fn link_text_field() -> &'static str {
        "id"
    }

    /// URL of the object's page.
    fn get_absolute_url(&self) -> String;

    /// URL of the object's edit page.
    fn get_edit_url(&self) -> String;

    /// URL of the object's delete page.
    fn get_delete_url(&self) -> String;

    /// `<a>` link to the object's page; text defaults to [`Self::link_text_field`].
    fn get_absolute_url_link(&self, options: &LinkOptions) -> String {
        let mut text = self.lookup_value(Self::link_text_field());
        if text.is_null() {
            text = self.pk().into();
        }
        options.render(&self.get_absolute_url(), &text.to_string())
    }

    /// `<a>` link to the edit page; text defaults to "Edit".
    fn get_edit_url_link(&self, options: &LinkOptions) -> String {
        options.render(&self.get_edit_url(), "Edit")
    }

    /// `<a>` link to the delete page; text defaults to "Delete".
    fn get_delete_url_link(&self, options: &LinkOptions) -> String {
        options.render(&self.get_delete_url(), "Delete")
    }
}

//! A small element tree used for both server-rendered pages and the result
//! fragments the controllers insert into the DOM.
//!
//! Text and attribute values are stored unescaped. The page host escapes them
//! when it serialises a page, and the browser side builds real nodes from the
//! tree, so upstream text is never parsed as markup.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiElement {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    content: UiContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiContent {
    Empty,
    Text(String),
    Children(Vec<UiElement>),
}

impl UiElement {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            content: UiContent::Empty,
        }
    }

    pub fn with_attr(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((label, value.into()));
        self
    }

    pub fn maybe_attr(
        mut self,
        condition: bool,
        label: &'static str,
        value: impl Into<String>,
    ) -> Self {
        if condition {
            self.attrs.push((label, value.into()));
        }
        self
    }

    pub fn with_class(self, class_name: impl Into<String>) -> Self {
        self.with_attr("class", class_name)
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = UiContent::Text(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<UiElement>) -> Self {
        self.content = UiContent::Children(children);
        self
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attrs(&self) -> &[(&'static str, String)] {
        &self.attrs
    }

    pub fn attr(&self, label: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn content(&self) -> &UiContent {
        &self.content
    }

    pub fn children(&self) -> &[UiElement] {
        match &self.content {
            UiContent::Children(nodes) => nodes,
            _ => &[],
        }
    }

    /// Concatenated text of this element and all descendants.
    pub fn text(&self) -> String {
        match &self.content {
            UiContent::Empty => String::new(),
            UiContent::Text(value) => value.clone(),
            UiContent::Children(nodes) => nodes.iter().map(UiElement::text).collect(),
        }
    }

    /// Depth-first search for every descendant (including self) with `tag`.
    pub fn find_all(&self, tag: &str) -> Vec<&UiElement> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a UiElement>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in self.children() {
            child.collect(tag, found);
        }
    }

    /// Copy of the tree with every text node and attribute value passed
    /// through `text` and `attr`. Children of `raw_tags` keep their text.
    pub fn map_values(
        &self,
        raw_tags: &[&str],
        text: &dyn Fn(&str) -> String,
        attr: &dyn Fn(&str) -> String,
    ) -> UiElement {
        let attrs = self
            .attrs
            .iter()
            .map(|(label, value)| (*label, attr(value)))
            .collect();
        let content = match &self.content {
            UiContent::Empty => UiContent::Empty,
            UiContent::Text(value) if raw_tags.contains(&self.tag) => {
                UiContent::Text(value.clone())
            }
            UiContent::Text(value) => UiContent::Text(text(value)),
            UiContent::Children(nodes) => UiContent::Children(
                nodes
                    .iter()
                    .map(|node| node.map_values(raw_tags, text, attr))
                    .collect(),
            ),
        };
        UiElement {
            tag: self.tag,
            attrs,
            content,
        }
    }
}

pub fn el(tag: &'static str) -> UiElement {
    UiElement::new(tag)
}

pub fn text_el(tag: &'static str, text: impl Into<String>) -> UiElement {
    UiElement::new(tag).with_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_keep_values_unescaped() {
        let node = el("ul").with_class("list").with_children(vec![
            text_el("li", "Tom & <Jerry>"),
            text_el("li", "plain").with_attr("data-crop", "a\"b"),
        ]);
        assert_eq!(node.attr("class"), Some("list"));
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].text(), "Tom & <Jerry>");
        assert_eq!(node.children()[1].attr("data-crop"), Some("a\"b"));
        assert_eq!(node.children()[1].attr("missing"), None);
    }

    #[test]
    fn map_values_skips_raw_text_tags() {
        let node = el("div").with_attr("title", "a&b").with_children(vec![
            text_el("p", "x<y"),
            text_el("style", ".a > .b {}"),
        ]);
        let upper = |value: &str| value.to_uppercase();
        let tagged = |value: &str| format!("[{value}]");
        let mapped = node.map_values(&["style"], &upper, &tagged);

        assert_eq!(mapped.attr("title"), Some("[a&b]"));
        assert_eq!(mapped.children()[0].text(), "X<Y");
        assert_eq!(mapped.children()[1].text(), ".a > .b {}");
    }

    #[test]
    fn maybe_attr_only_when_set() {
        let on = el("option").maybe_attr(true, "selected", "selected");
        let off = el("option").maybe_attr(false, "selected", "selected");
        assert_eq!(on.attr("selected"), Some("selected"));
        assert!(off.attrs().is_empty());
    }

    #[test]
    fn text_and_search_helpers() {
        let node = el("div").with_children(vec![
            text_el("h4", "Maize"),
            el("p").with_children(vec![text_el("span", "Water: "), text_el("span", "High")]),
        ]);
        assert_eq!(node.text(), "MaizeWater: High");
        assert_eq!(node.find_all("span").len(), 2);
        assert!(node.find_all("li").is_empty());
    }
}

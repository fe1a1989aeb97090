//! Element tree
//!
//! A small retained tree of element records standing in for the host view
//! layer's nodes. Each element carries a layout rectangle in document
//! coordinates, the animatable style the runtime writes into, optional text
//! content, and class names used by selector queries.

use crate::error::{Error, Result};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Stable reference to an element in an [`ElementTree`]
    pub struct ElementId;
}

/// Axis-aligned rectangle in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Center point (x, y)
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check whether a point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }

    /// Copy of this rectangle moved by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Visual style snapshot of an element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub opacity: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    /// Rotation in degrees
    pub rotation: f32,
}

impl Style {
    /// The natural resting style every entrance animation ends at
    pub const RESTING: Style = Style {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
    };

    /// Compare two styles within a tolerance
    pub fn approx_eq(&self, other: &Style, tolerance: f32) -> bool {
        (self.opacity - other.opacity).abs() <= tolerance
            && (self.translate_x - other.translate_x).abs() <= tolerance
            && (self.translate_y - other.translate_y).abs() <= tolerance
            && (self.scale - other.scale).abs() <= tolerance
            && (self.rotation - other.rotation).abs() <= tolerance
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::RESTING
    }
}

/// A single animatable property of an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    Rotation,
    Text,
}

impl StyleProperty {
    const ALL: [StyleProperty; 6] = [
        StyleProperty::Opacity,
        StyleProperty::TranslateX,
        StyleProperty::TranslateY,
        StyleProperty::Scale,
        StyleProperty::Rotation,
        StyleProperty::Text,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Compact set of [`StyleProperty`] values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertySet {
    bits: u8,
}

impl PropertySet {
    pub const EMPTY: PropertySet = PropertySet { bits: 0 };

    pub fn with(mut self, property: StyleProperty) -> Self {
        self.bits |= property.bit();
        self
    }

    pub fn insert(&mut self, property: StyleProperty) {
        self.bits |= property.bit();
    }

    pub fn contains(&self, property: StyleProperty) -> bool {
        self.bits & property.bit() != 0
    }

    pub fn intersects(&self, other: PropertySet) -> bool {
        self.bits & other.bits != 0
    }

    pub fn union(self, other: PropertySet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = StyleProperty> + '_ {
        StyleProperty::ALL
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl FromIterator<StyleProperty> for PropertySet {
    fn from_iter<I: IntoIterator<Item = StyleProperty>>(iter: I) -> Self {
        let mut set = PropertySet::EMPTY;
        for property in iter {
            set.insert(property);
        }
        set
    }
}

/// An element record
#[derive(Clone, Debug, Default)]
pub struct Element {
    /// Layout rectangle in document coordinates (untransformed)
    pub rect: Rect,
    /// Current animatable style
    pub style: Style,
    /// Displayed text content
    pub text: String,
    /// Class names matched by `.class` selectors
    pub classes: SmallVec<[String; 2]>,
    /// Optional unique name matched by `#name` selectors
    pub name: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Default::default()
        }
    }

    /// Builder: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: add a class name
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Builder: set the element name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the initial style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Simple selector used to resolve stagger children
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// `*`
    Any,
    /// `.a` or `.a.b` (all classes must match)
    Classes(SmallVec<[String; 2]>),
    /// `#name`
    Name(String),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input == "*" {
            return Ok(Selector::Any);
        }
        if let Some(name) = input.strip_prefix('#') {
            if is_ident(name) {
                return Ok(Selector::Name(name.to_string()));
            }
            return Err(Error::InvalidSelector(input.to_string()));
        }
        if let Some(rest) = input.strip_prefix('.') {
            let classes: SmallVec<[String; 2]> = rest.split('.').map(str::to_string).collect();
            if classes.iter().all(|c| is_ident(c)) {
                return Ok(Selector::Classes(classes));
            }
        }
        Err(Error::InvalidSelector(input.to_string()))
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Any => true,
            Selector::Classes(classes) => classes.iter().all(|c| element.has_class(c)),
            Selector::Name(name) => element.name.as_deref() == Some(name.as_str()),
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Retained element tree owned by the runtime
pub struct ElementTree {
    elements: SlotMap<ElementId, Element>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
        }
    }

    /// Insert a root element
    pub fn insert(&mut self, element: Element) -> ElementId {
        self.elements.insert(Element {
            parent: None,
            children: Vec::new(),
            ..element
        })
    }

    /// Insert an element as the last child of `parent`
    ///
    /// Returns `None` if the parent does not exist.
    pub fn insert_child(&mut self, parent: ElementId, element: Element) -> Option<ElementId> {
        if !self.elements.contains_key(parent) {
            return None;
        }
        let id = self.elements.insert(Element {
            parent: Some(parent),
            children: Vec::new(),
            ..element
        });
        self.elements[parent].children.push(id);
        Some(id)
    }

    /// Remove an element and its whole subtree
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let element = self.elements.remove(id)?;
        if let Some(parent) = element.parent.and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack: Vec<ElementId> = element.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.elements.remove(child) {
                stack.extend(removed.children);
            }
        }
        Some(element)
    }

    /// Remove all children of an element, keeping the element itself
    pub fn clear_children(&mut self, id: ElementId) {
        let children = match self.elements.get(id) {
            Some(element) => element.children.clone(),
            None => return,
        };
        for child in children {
            self.remove(child);
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.elements.get(id).map(|e| e.style)
    }

    pub fn set_style(&mut self, id: ElementId, style: Style) {
        if let Some(element) = self.elements.get_mut(id) {
            element.style = style;
        }
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text = text.into();
        }
    }

    /// Own text followed by the text of every descendant, in document order
    pub fn text_content(&self, id: ElementId) -> Option<String> {
        let element = self.elements.get(id)?;
        let mut out = element.text.clone();
        let mut stack: Vec<ElementId> = element.children.iter().rev().copied().collect();
        while let Some(child) = stack.pop() {
            if let Some(element) = self.elements.get(child) {
                out.push_str(&element.text);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        Some(out)
    }

    /// Update an element's layout rectangle
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(element) = self.elements.get_mut(id) {
            element.rect = rect;
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Find an element by its `name`
    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| e.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// All descendants of `container` matching `selector`, in document order
    ///
    /// The container itself is never included.
    pub fn query_all(&self, container: ElementId, selector: &Selector) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(container).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if selector.matches(element) {
                out.push(id);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        out
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(class: &str) -> Element {
        Element::new(Rect::new(0.0, 0.0, 100.0, 50.0)).with_class(class)
    }

    #[test]
    fn test_query_all_document_order() {
        let mut tree = ElementTree::new();
        let root = tree.insert(Element::new(Rect::new(0.0, 0.0, 400.0, 400.0)));
        let a = tree.insert_child(root, card("item")).unwrap();
        let group = tree.insert_child(root, card("group")).unwrap();
        let b = tree.insert_child(group, card("item")).unwrap();
        let c = tree.insert_child(root, card("item")).unwrap();

        let selector = Selector::parse(".item").unwrap();
        assert_eq!(tree.query_all(root, &selector), vec![a, b, c]);
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("*").unwrap(), Selector::Any);
        assert_eq!(
            Selector::parse("#hero").unwrap(),
            Selector::Name("hero".to_string())
        );
        assert!(matches!(
            Selector::parse(".stagger-item.visible").unwrap(),
            Selector::Classes(c) if c.len() == 2
        ));
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse(".").is_err());
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = ElementTree::new();
        let root = tree.insert(card("root"));
        let child = tree.insert_child(root, card("child")).unwrap();
        let grandchild = tree.insert_child(child, card("gc")).unwrap();

        tree.remove(child);
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut tree = ElementTree::new();
        let root = tree.insert(card("heading").with_text("> "));
        tree.insert_child(root, card("word").with_text("Hello\u{a0}"));
        tree.insert_child(root, card("word").with_text("world\u{a0}"));
        assert_eq!(
            tree.text_content(root).as_deref(),
            Some("> Hello\u{a0}world\u{a0}")
        );
    }

    #[test]
    fn test_property_set() {
        let set = PropertySet::EMPTY
            .with(StyleProperty::Opacity)
            .with(StyleProperty::TranslateY);
        assert!(set.contains(StyleProperty::Opacity));
        assert!(!set.contains(StyleProperty::Scale));
        assert!(set.intersects(PropertySet::EMPTY.with(StyleProperty::TranslateY)));
        assert!(!set.intersects(PropertySet::EMPTY.with(StyleProperty::Text)));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(60.0, 40.0));
        assert!(!rect.contains(111.0, 40.0));
        assert_eq!(rect.center(), (60.0, 40.0));
    }
}

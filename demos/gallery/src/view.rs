use std::rc::Rc;

use tether_core::prelude::*;

/// A keyed node in a rebuilt view description.
#[derive(Clone, Debug)]
pub struct View {
    pub key: String,
    pub kind: ViewKind,
    pub transition: Option<Rc<TransitionSpec>>,
    pub children: Vec<View>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewKind {
    Section(String),
    Text(String),
    Toggle { label: String, on: bool },
    Button(String),
    Dots(Vec<bool>),
    Image { name: String, rotation: f32 },
}

#[allow(non_snake_case)]
pub fn Section(key: &str, title: impl Into<String>) -> View {
    View::new(key, ViewKind::Section(title.into()))
}

#[allow(non_snake_case)]
pub fn Text(key: &str, text: impl Into<String>) -> View {
    View::new(key, ViewKind::Text(text.into()))
}

#[allow(non_snake_case)]
pub fn Toggle(key: &str, label: impl Into<String>, on: bool) -> View {
    View::new(
        key,
        ViewKind::Toggle {
            label: label.into(),
            on,
        },
    )
}

#[allow(non_snake_case)]
pub fn Button(key: &str, label: impl Into<String>) -> View {
    View::new(key, ViewKind::Button(label.into()))
}

#[allow(non_snake_case)]
pub fn Dots(key: &str, dots: Vec<bool>) -> View {
    View::new(key, ViewKind::Dots(dots))
}

#[allow(non_snake_case)]
pub fn Image(key: &str, name: impl Into<String>, rotation: f32) -> View {
    View::new(
        key,
        ViewKind::Image {
            name: name.into(),
            rotation,
        },
    )
}

impl View {
    pub fn new(key: &str, kind: ViewKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            transition: None,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: View) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.children.extend(children);
        self
    }

    /// Overrides the commit's transition when this view is inserted or removed.
    pub fn transition(mut self, spec: TransitionSpec) -> Self {
        self.transition = Some(Rc::new(spec));
        self
    }

    /// Depth-first walk, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a View, usize)) {
        fn go<'a>(v: &'a View, depth: usize, f: &mut impl FnMut(&'a View, usize)) {
            f(v, depth);
            for c in &v.children {
                go(c, depth + 1, f);
            }
        }
        go(self, 0, f);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.walk(&mut |v, _| out.push(v.key.clone()));
        out
    }

    pub fn find(&self, key: &str) -> Option<&View> {
        let mut found = None;
        self.walk(&mut |v, _| {
            if found.is_none() && v.key == key {
                found = Some(v);
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_depth_first() {
        let tree = Section("root", "Root")
            .child(Text("a", "A").child(Text("a.1", "A1")))
            .child(Text("b", "B"));
        assert_eq!(tree.keys(), vec!["root", "a", "a.1", "b"]);
        assert!(tree.find("a.1").is_some());
        assert!(tree.find("c").is_none());
    }
}

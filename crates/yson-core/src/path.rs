//! Coding paths: where in the value tree an encode or decode step is.
//!
//! While the bridge walks a tree it keeps a borrowed, stack-allocated chain of
//! [`Path`] frames, one per container level. Only when an error is raised is
//! the chain flattened into an owned [`CodingPath`].

use std::fmt;

/// One step of a coding path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

impl From<&str> for PathComponent {
    fn from(key: &str) -> Self {
        PathComponent::Key(key.to_string())
    }
}

impl From<usize> for PathComponent {
    fn from(index: usize) -> Self {
        PathComponent::Index(index)
    }
}

/// Owned list of steps from the root of a value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath(Vec<PathComponent>);

impl CodingPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathComponent> {
        self.0.iter()
    }

    pub fn push(&mut self, component: impl Into<PathComponent>) {
        self.0.push(component.into());
    }

    pub(crate) fn extend(&mut self, other: CodingPath) {
        self.0.extend(other.0);
    }
}

impl From<Vec<PathComponent>> for CodingPath {
    fn from(components: Vec<PathComponent>) -> Self {
        Self(components)
    }
}

impl<'a> IntoIterator for &'a CodingPath {
    type Item = &'a PathComponent;
    type IntoIter = std::slice::Iter<'a, PathComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Renders as `items[2].name`; the empty path renders as `<root>`.
impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<root>");
        }
        for (i, component) in self.0.iter().enumerate() {
            match component {
                PathComponent::Key(key) if i == 0 => f.write_str(key)?,
                PathComponent::Key(key) => write!(f, ".{key}")?,
                PathComponent::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Borrowed path frame threaded through the bridge's containers.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Path<'a> {
    Root,
    Key { parent: &'a Path<'a>, key: &'a str },
    Index { parent: &'a Path<'a>, index: usize },
}

impl<'a> Path<'a> {
    pub(crate) fn key(&'a self, key: &'a str) -> Path<'a> {
        Path::Key { parent: self, key }
    }

    pub(crate) fn index(&'a self, index: usize) -> Path<'a> {
        Path::Index {
            parent: self,
            index,
        }
    }

    pub(crate) fn to_coding_path(&self) -> CodingPath {
        let mut components = Vec::new();
        let mut frame = self;
        loop {
            match frame {
                Path::Root => break,
                Path::Key { parent, key } => {
                    components.push(PathComponent::Key((*key).to_string()));
                    frame = *parent;
                }
                Path::Index { parent, index } => {
                    components.push(PathComponent::Index(*index));
                    frame = *parent;
                }
            }
        }
        components.reverse();
        CodingPath(components)
    }
}

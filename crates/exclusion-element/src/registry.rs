//! Element metadata and factory registration.

use std::collections::BTreeMap;
use std::fmt;

use crate::element::{Element, Exclusion};
use crate::error::RegistryError;

/// Descriptive details shown by pipeline inspection tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMetadata {
    pub long_name: &'static str,
    pub classification: &'static str,
    pub description: &'static str,
    pub author: &'static str,
}

impl ElementMetadata {
    pub const fn exclusion() -> Self {
        Self {
            long_name: "Exclusion",
            classification: "Filter/Effect/Video",
            description: "Exclusion remaps the colors of the video signal",
            author: "Luis de Bethencourt <luis@debethencourt.com>",
        }
    }
}

/// Autoplugging preference of a factory. Higher ranks win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    None = 0,
    Marginal = 64,
    Secondary = 128,
    Primary = 256,
}

type Constructor = fn() -> Box<dyn Element>;

struct Factory {
    rank: Rank,
    create: Constructor,
}

/// Name-indexed collection of element factories.
#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        rank: Rank,
        create: Constructor,
    ) -> Result<(), RegistryError> {
        if self.factories.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.factories
            .insert(name.to_string(), Factory { rank, create });
        tracing::debug!("registered element {name} ({rank:?})");
        Ok(())
    }

    /// Instantiate a registered element.
    pub fn make(&self, name: &str) -> Result<Box<dyn Element>, RegistryError> {
        self.factories
            .get(name)
            .map(|f| (f.create)())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn rank(&self, name: &str) -> Option<Rank> {
        self.factories.get(name).map(|f| f.rank)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.factories.iter().map(|(name, fac)| (name, fac.rank)))
            .finish()
    }
}

fn create_exclusion() -> Box<dyn Element> {
    Box::new(Exclusion::new())
}

/// Register every element this crate provides.
pub fn plugin_init(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(Exclusion::NAME, Rank::None, create_exclusion)
}

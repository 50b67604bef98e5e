//! crates/multilog/src/registry.rs
//! Name-keyed collection of sinks with all-or-nothing mutation.

use std::collections::{BTreeMap, HashSet};

use crate::error::RegistryError;
use crate::sink::Sink;

/// The sinks known to a dispatcher, keyed by name.
///
/// Every mutating method validates its whole batch before changing
/// anything: on error the registry is exactly as it was before the call.
///
/// # Examples
///
/// ```
/// use logging_sink::MemoryBuffer;
/// use multilog::{Registry, Sink};
///
/// let mut registry = Registry::new();
/// registry
///     .register([Sink::new("b").with_writer(MemoryBuffer::new()),
///                Sink::new("a").with_writer(MemoryBuffer::new())])
///     .unwrap();
///
/// let names: Vec<_> = registry.list().iter().map(|s| s.name().to_owned()).collect();
/// assert_eq!(names, ["a", "b"]);
///
/// // A duplicate anywhere in the batch rejects the whole call.
/// let before = registry.clone();
/// assert!(registry
///     .register([Sink::new("c").with_writer(MemoryBuffer::new()),
///                Sink::new("a").with_writer(MemoryBuffer::new())])
///     .is_err());
/// assert_eq!(registry, before);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Registry {
    sinks: BTreeMap<String, Sink>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every registered sink with `sinks`, filling unset options
    /// with defaults.
    ///
    /// Sinks registered before the call and absent from the batch are
    /// dropped. An empty batch clears the registry.
    ///
    /// # Errors
    ///
    /// Fails if any sink has an empty name, no writer, an out-of-range level
    /// or layout mask, or an invalid timestamp format, or if a name repeats
    /// within the batch.
    pub fn register<I>(&mut self, sinks: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Sink>,
    {
        let sinks: Vec<Sink> = sinks.into_iter().collect();
        let mut seen = HashSet::with_capacity(sinks.len());
        for sink in &sinks {
            sink.validate(true)?;
            if !seen.insert(sink.name()) {
                return Err(RegistryError::DuplicateName {
                    name: sink.name().to_owned(),
                });
            }
        }

        self.sinks = sinks
            .into_iter()
            .map(|mut sink| {
                sink.fill_defaults();
                (sink.name().to_owned(), sink)
            })
            .collect();
        Ok(())
    }

    /// Applies partial updates to registered sinks.
    ///
    /// Only the options an update supplies are changed. A batch that names
    /// the same sink twice applies the updates in order.
    ///
    /// # Errors
    ///
    /// Fails if any update has an empty name, names an unregistered sink, or
    /// carries an invalid mask or timestamp format.
    pub fn edit<I>(&mut self, updates: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Sink>,
    {
        let updates: Vec<Sink> = updates.into_iter().collect();
        for update in &updates {
            update.validate(false)?;
            if !self.sinks.contains_key(update.name()) {
                return Err(RegistryError::SinkNotFound {
                    name: update.name().to_owned(),
                });
            }
        }

        for update in &updates {
            if let Some(current) = self.sinks.get_mut(update.name()) {
                current.merge_from(update);
            }
        }
        Ok(())
    }

    /// Removes the named sinks, ignoring names that are not registered.
    ///
    /// Returns how many sinks were removed.
    pub fn delete<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|name| self.sinks.remove(name.as_ref()).is_some())
            .count()
    }

    /// Copies of every sink, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<Sink> {
        self.sinks.values().cloned().collect()
    }

    /// Copies of the named sinks in request order; unknown names are skipped.
    pub fn get<I, S>(&self, names: I) -> Vec<Sink>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.sinks.get(name.as_ref()).cloned())
            .collect()
    }

    /// Reports whether a sink with `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sinks.contains_key(name)
    }

    /// Number of registered sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Reports whether no sinks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Registered sinks in name order, without copying.
    pub fn iter(&self) -> impl Iterator<Item = &Sink> + '_ {
        self.sinks.values()
    }
}

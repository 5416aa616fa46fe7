//! Read and write operations for one object class over a [`Transport`].

use std::marker::PhantomData;

use tracing::{debug, trace};
use xml_tree::XmlNode;

use crate::error::{Error, Result};
use crate::object::{specify, Container, Entry, Object, Singleton};
use crate::path;
use crate::transport::Transport;
use crate::version::Version;

/// Candidate (`get`) or running (`show`) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Candidate,
    Running,
}

impl Source {
    fn op(self) -> &'static str {
        match self {
            Self::Candidate => "get",
            Self::Running => "show",
        }
    }
}

fn version_of<C: Transport + ?Sized>(client: &C) -> Result<Version> {
    client
        .version()
        .map_err(|source| Error::transport("version", "", source))
}

fn read<C: Transport + ?Sized>(client: &C, source: Source, xpath: &str) -> Result<XmlNode> {
    trace!(op = source.op(), xpath, "reading configuration");
    let response = match source {
        Source::Candidate => client.get(xpath),
        Source::Running => client.show(xpath),
    };
    response.map_err(|err| {
        if err.is_object_not_present() {
            Error::NotFound {
                xpath: xpath.to_string(),
            }
        } else {
            Error::transport(source.op(), xpath, err)
        }
    })
}

/// Operations on a named, list-addressable object class.
pub struct Namespace<'a, T, C: ?Sized> {
    client: &'a C,
    _object: PhantomData<fn() -> T>,
}

impl<'a, T, C> Namespace<'a, T, C>
where
    T: Entry,
    C: Transport + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            _object: PhantomData,
        }
    }

    pub fn client(&self) -> &'a C {
        self.client
    }

    pub(crate) fn version(&self) -> Result<Version> {
        version_of(self.client)
    }

    fn load(&self, source: Source, xpath: &str) -> Result<Container<T>> {
        let response = read(self.client, source, xpath)?;
        let (mut container, _) = specify::<T>(&self.version()?);
        container.load(&response);
        Ok(container)
    }

    fn list(&self, source: Source, scope: &T::Scope) -> Result<Vec<String>> {
        let xpath = path::join(&T::container(scope)?);
        match self.load(source, &xpath) {
            Ok(container) => Ok(container.names()),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    fn one(&self, source: Source, scope: &T::Scope, name: &str) -> Result<T> {
        let xpath = path::join(&T::xpath(scope, &[name])?);
        let container = self.load(source, &xpath)?;
        container
            .normalize()?
            .into_iter()
            .next()
            .ok_or(Error::NotFound { xpath })
    }

    fn all(&self, source: Source, scope: &T::Scope) -> Result<Vec<T>> {
        let xpath = path::join(&T::container(scope)?);
        match self.load(source, &xpath) {
            Ok(container) => container.normalize(),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Names of all entries in the candidate configuration.
    pub fn get_list(&self, scope: &T::Scope) -> Result<Vec<String>> {
        self.list(Source::Candidate, scope)
    }

    /// Names of all entries in the running configuration.
    pub fn show_list(&self, scope: &T::Scope) -> Result<Vec<String>> {
        self.list(Source::Running, scope)
    }

    pub fn get(&self, scope: &T::Scope, name: &str) -> Result<T> {
        self.one(Source::Candidate, scope, name)
    }

    pub fn show(&self, scope: &T::Scope, name: &str) -> Result<T> {
        self.one(Source::Running, scope, name)
    }

    pub fn get_all(&self, scope: &T::Scope) -> Result<Vec<T>> {
        self.all(Source::Candidate, scope)
    }

    pub fn show_all(&self, scope: &T::Scope) -> Result<Vec<T>> {
        self.all(Source::Running, scope)
    }

    /// Encode `records` for the device firmware.
    pub fn encode_all(&self, records: &[T]) -> Result<Vec<XmlNode>> {
        let (_, encoder) = specify::<T>(&self.version()?);
        records.iter().map(|record| encoder.encode(record)).collect()
    }

    /// Create or merge `records` by name in one request.
    pub fn set(&self, scope: &T::Scope, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let xpath = path::join(&T::container(scope)?);
        let elements = self.encode_all(records)?;
        debug!(kind = T::KIND, count = records.len(), xpath = %xpath, "set");
        self.client
            .set(&xpath, &elements)
            .map_err(|source| Error::transport("set", &xpath, source))?;

        let names: Vec<&str> = records.iter().map(|record| record.name()).collect();
        self.import(scope, &names)
    }

    /// Replace one entry in place.
    pub fn edit(&self, scope: &T::Scope, record: &T) -> Result<()> {
        let xpath = path::join(&T::xpath(scope, &[record.name()])?);
        let element = self
            .encode_all(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::encode(T::KIND, "encoder produced no element"))?;
        debug!(kind = T::KIND, name = record.name(), "edit");
        self.client
            .edit(&xpath, &element)
            .map_err(|source| Error::transport("edit", &xpath, source))?;
        self.import(scope, &[record.name()])
    }

    /// Remove entries by name.
    pub fn delete(&self, scope: &T::Scope, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(vsys_xpath) = T::import_vsys(scope)? {
            self.client
                .vsys_unimport(&vsys_xpath, T::IMPORT_LIST, names)
                .map_err(|source| Error::transport("unimport", &vsys_xpath, source))?;
        }
        let xpath = path::join(&T::xpath(scope, names)?);
        debug!(kind = T::KIND, count = names.len(), "delete");
        self.client
            .delete(&xpath)
            .map_err(|source| Error::transport("delete", &xpath, source))
    }

    /// Remove entries by record identity.
    pub fn delete_records(&self, scope: &T::Scope, records: &[T]) -> Result<()> {
        let names: Vec<&str> = records.iter().map(|record| record.name()).collect();
        self.delete(scope, &names)
    }

    fn import(&self, scope: &T::Scope, names: &[&str]) -> Result<()> {
        let Some(vsys_xpath) = T::import_vsys(scope)? else {
            return Ok(());
        };
        debug!(kind = T::KIND, vsys_xpath = %vsys_xpath, "importing into vsys");
        self.client
            .vsys_import(&vsys_xpath, T::IMPORT_LIST, names)
            .map_err(|source| Error::transport("import", &vsys_xpath, source))
    }
}

/// Operations on an object class of which each scope holds exactly one.
pub struct SingletonNamespace<'a, T, C: ?Sized> {
    client: &'a C,
    _object: PhantomData<fn() -> T>,
}

impl<'a, T, C> SingletonNamespace<'a, T, C>
where
    T: Singleton,
    C: Transport + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            _object: PhantomData,
        }
    }

    fn one(&self, source: Source, scope: &T::Scope) -> Result<T> {
        let xpath = path::join(&T::xpath(scope)?);
        let response = read(self.client, source, &xpath)?;
        let (mut container, _) = specify::<T>(&version_of(self.client)?);
        container.load(&response);
        container
            .normalize()?
            .into_iter()
            .next()
            .ok_or(Error::NotFound { xpath })
    }

    pub fn get(&self, scope: &T::Scope) -> Result<T> {
        self.one(Source::Candidate, scope)
    }

    pub fn show(&self, scope: &T::Scope) -> Result<T> {
        self.one(Source::Running, scope)
    }

    fn encode(&self, record: &T) -> Result<XmlNode> {
        let (_, encoder) = specify::<T>(&version_of(self.client)?);
        encoder.encode(record)
    }

    /// Merge `record` into the configuration.
    pub fn set(&self, scope: &T::Scope, record: &T) -> Result<()> {
        let mut segments = T::xpath(scope)?;
        segments.pop();
        let parent = path::join(&segments);
        let element = self.encode(record)?;
        debug!(kind = T::KIND, xpath = %parent, "set");
        self.client
            .set(&parent, &[element])
            .map_err(|source| Error::transport("set", &parent, source))
    }

    /// Replace the whole object.
    pub fn edit(&self, scope: &T::Scope, record: &T) -> Result<()> {
        let xpath = path::join(&T::xpath(scope)?);
        let element = self.encode(record)?;
        debug!(kind = T::KIND, xpath = %xpath, "edit");
        self.client
            .edit(&xpath, &element)
            .map_err(|source| Error::transport("edit", &xpath, source))
    }

    pub fn delete(&self, scope: &T::Scope) -> Result<()> {
        let xpath = path::join(&T::xpath(scope)?);
        debug!(kind = T::KIND, xpath = %xpath, "delete");
        self.client
            .delete(&xpath)
            .map_err(|source| Error::transport("delete", &xpath, source))
    }
}

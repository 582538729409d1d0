//! Repository resolver: page and control properties kept outside the test scripts.
//!
//! A UFT archive stores them as XML under `Framework/ObjectRepository`:
//!
//! ```xml
//! <ObjectRepository>
//!   <Browser name="Shop">
//!     <Page name="Login">
//!       <Property name="title" value="Shop - Login"/>
//!       <Control class="WebEdit" name="UserName">
//!         <Property name="html id" value="user"/>
//!       </Control>
//!     </Page>
//!   </Browser>
//! </ObjectRepository>
//! ```

use crate::error::{ConnectorError, ConnectorResult};
use crate::object_map;
use crate::types::Properties;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Lookup capability used by the row transformers.
pub trait ObjectRepository {
    /// Module constraints of a page.
    fn module_properties(&self, browser: &str, page: &str) -> ConnectorResult<Properties>;

    /// Technical identifiers of a control on a page. `class_hint` narrows the
    /// match to one test object class when non-empty.
    fn control_properties(
        &self,
        browser: &str,
        page: &str,
        class_hint: &str,
        control: &str,
    ) -> ConnectorResult<Properties>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PageEntry {
    properties: Properties,
    controls: Vec<ControlEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ControlEntry {
    class: String,
    name: String,
    properties: Properties,
}

/// In-memory object repository, keyed by (browser, page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryIndex {
    pages: BTreeMap<(String, String), PageEntry>,
}

impl RepositoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.xml` file of `dir`, in file-name order. A missing
    /// directory yields an empty repository.
    pub fn load_dir(dir: &Path) -> ConnectorResult<Self> {
        let mut index = RepositoryIndex::new();
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no object repository directory");
            return Ok(index);
        }
        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
            })
            .collect();
        files.sort();
        for file in files {
            debug!(file = %file.display(), "loading object repository");
            let xml = fs::read(&file)?;
            index
                .merge_xml(&xml)
                .map_err(|e| e.in_file(file.clone()))?;
        }
        Ok(index)
    }

    pub fn parse_xml(xml: &[u8]) -> ConnectorResult<Self> {
        let mut index = RepositoryIndex::new();
        index.merge_xml(xml)?;
        Ok(index)
    }

    /// Register page properties (keys as they appear in the repository).
    pub fn insert_page(&mut self, browser: &str, page: &str, properties: Properties) {
        self.pages
            .entry((browser.to_string(), page.to_string()))
            .or_default()
            .properties
            .extend(properties);
    }

    /// Register a control. Property names are UFT identification properties.
    pub fn insert_control(
        &mut self,
        browser: &str,
        page: &str,
        class: &str,
        name: &str,
        properties: Properties,
    ) {
        self.pages
            .entry((browser.to_string(), page.to_string()))
            .or_default()
            .controls
            .push(ControlEntry {
                class: class.to_string(),
                name: name.to_string(),
                properties,
            });
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, browser: &str, page: &str) -> ConnectorResult<&PageEntry> {
        self.pages
            .get(&(browser.to_string(), page.to_string()))
            .ok_or_else(|| {
                ConnectorError::RepositoryLookup(format!(
                    "no definition for page '{}' of browser '{}'",
                    page, browser
                ))
            })
    }

    fn merge_xml(&mut self, xml: &[u8]) -> ConnectorResult<()> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut browser: Option<String> = None;
        let mut page: Option<String> = None;
        let mut control: Option<ControlEntry> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => match element.name() {
                    QName(b"Browser") => browser = Some(required_attr(&element, b"name")?),
                    QName(b"Page") => {
                        let name = required_attr(&element, b"name")?;
                        if let Some(b) = browser.as_deref() {
                            self.insert_page(b, &name, Properties::new());
                        }
                        page = Some(name);
                    }
                    QName(b"Control") => {
                        control = Some(ControlEntry {
                            class: optional_attr(&element, b"class")?.unwrap_or_default(),
                            name: required_attr(&element, b"name")?,
                            properties: Properties::new(),
                        });
                    }
                    _ => {}
                },
                Event::Empty(element) => match element.name() {
                    QName(b"Property") => {
                        let name = required_attr(&element, b"name")?;
                        let value = optional_attr(&element, b"value")?.unwrap_or_default();
                        if let Some(c) = control.as_mut() {
                            c.properties.insert(name, value);
                        } else if let (Some(b), Some(p)) = (browser.as_deref(), page.as_deref()) {
                            self.insert_page(b, p, Properties::from([(name, value)]));
                        }
                    }
                    QName(b"Page") => {
                        if let Some(b) = browser.as_deref() {
                            let name = required_attr(&element, b"name")?;
                            self.insert_page(b, &name, Properties::new());
                        }
                    }
                    _ => {}
                },
                Event::End(element) => match element.name() {
                    QName(b"Control") => {
                        if let (Some(b), Some(p), Some(c)) =
                            (browser.as_deref(), page.as_deref(), control.take())
                        {
                            self.insert_control(b, p, &c.class, &c.name, c.properties);
                        }
                    }
                    QName(b"Page") => page = None,
                    QName(b"Browser") => browser = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }
}

fn optional_attr(element: &BytesStart<'_>, key: &[u8]) -> ConnectorResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(element: &BytesStart<'_>, key: &[u8]) -> ConnectorResult<String> {
    optional_attr(element, key)?.ok_or_else(|| {
        ConnectorError::SourceFormat(format!(
            "<{}> without '{}' attribute",
            String::from_utf8_lossy(element.name().as_ref()),
            String::from_utf8_lossy(key)
        ))
    })
}

/// `title` → `Title`
fn constraint_name(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ObjectRepository for RepositoryIndex {
    fn module_properties(&self, browser: &str, page: &str) -> ConnectorResult<Properties> {
        let entry = self.page(browser, page)?;
        Ok(entry
            .properties
            .iter()
            .map(|(name, value)| (constraint_name(name), value.clone()))
            .collect())
    }

    fn control_properties(
        &self,
        browser: &str,
        page: &str,
        class_hint: &str,
        control: &str,
    ) -> ConnectorResult<Properties> {
        let entry = self.page(browser, page)?;
        let found = entry
            .controls
            .iter()
            .find(|c| c.name == control && (class_hint.is_empty() || c.class == class_hint))
            .ok_or_else(|| {
                ConnectorError::RepositoryLookup(format!(
                    "no control '{}'{} on page '{}' of browser '{}'",
                    control,
                    if class_hint.is_empty() {
                        String::new()
                    } else {
                        format!(" of class '{}'", class_hint)
                    },
                    page,
                    browser
                ))
            })?;
        found
            .properties
            .iter()
            .map(|(name, value)| {
                object_map::technical_id(name).map(|id| (id.to_string(), value.clone()))
            })
            .collect()
    }
}

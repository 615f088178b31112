//! makensis defines and commands.
//!
//! Defines become `-D` flags substituted into the script text; commands
//! become `-X` flags that control the compiler itself (output file,
//! compression, version resource). Both keep insertion order so the
//! generated command line is stable.

use super::{resources::ResourceResolver, utils};
use crate::bundler::{
    error::Result,
    settings::{Arch, Compression, Settings},
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Namespace for installer GUIDs derived from the application id.
pub const INSTALLER_GUID_NAMESPACE: Uuid = Uuid::from_u128(0x50e065bc_3134_11e6_9bab_38c9862bdaf3);

/// LZMA dictionary size in MB.
pub const LZMA_DICT_SIZE: &str = "64";

/// Insertion-ordered name → value table; setting an existing name replaces
/// its value in place.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Ordered<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Ordered<V> {
    fn insert(&mut self, name: String, value: V) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    fn remove(&mut self, name: &str) -> Option<V> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Symbolic defines passed to makensis.
///
/// A value of `None` is a bare flag (`-DNAME`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DefineSet {
    inner: Ordered<Option<String>>,
}

impl DefineSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), Some(value.into()));
    }

    /// Sets `name` as a bare flag.
    pub fn flag(&mut self, name: impl Into<String>) {
        self.inner.insert(name.into(), None);
    }

    /// Removes `name`, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.inner.remove(name).is_some()
    }

    /// Whether `name` is defined (as flag or value).
    pub fn contains(&self, name: &str) -> bool {
        self.inner.get(name).is_some()
    }

    /// Value of `name`; `Some(None)` for a bare flag.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.inner.get(name).map(|v| v.as_deref())
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.inner
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of defines.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// True when nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// `-DNAME` / `-DNAME=value` flags in insertion order.
    pub fn to_args(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| match value {
                Some(value) => format!("-D{name}={value}"),
                None => format!("-D{name}"),
            })
            .collect()
    }
}

impl Serialize for DefineSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Value of a makensis command.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum CommandValue {
    /// Issued once.
    Scalar(String),
    /// Issued once per entry.
    List(Vec<String>),
}

/// Compiler commands passed to makensis.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandSet {
    inner: Ordered<CommandValue>,
}

impl CommandSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single-valued command.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .insert(name.into(), CommandValue::Scalar(value.into()));
    }

    /// Sets a command issued once per value.
    pub fn set_list<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.insert(
            name.into(),
            CommandValue::List(values.into_iter().map(Into::into).collect()),
        );
    }

    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<&CommandValue> {
        self.inner.get(name)
    }

    /// Whether `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.get(name).is_some()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandValue)> {
        self.inner
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// True when no command is set.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// `-XNAME value` flags, one per list entry.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (name, value) in self.iter() {
            match value {
                CommandValue::Scalar(value) => args.push(format!("-X{name} {value}")),
                CommandValue::List(values) => {
                    args.extend(values.iter().map(|value| format!("-X{name} {value}")))
                }
            }
        }
        args
    }
}

impl Serialize for CommandSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Installer GUID derived from the application id (UUID v5).
pub fn derive_guid(app_id: &str) -> String {
    Uuid::new_v5(&INSTALLER_GUID_NAMESPACE, app_id.as_bytes()).to_string()
}

/// Derives the defines and commands for one installer build.
pub struct DefineCommandBuilder<'a> {
    settings: &'a Settings,
    resolver: &'a ResourceResolver,
}

impl<'a> DefineCommandBuilder<'a> {
    /// Creates a builder over the given settings and resources.
    pub fn new(settings: &'a Settings, resolver: &'a ResourceResolver) -> Self {
        Self { settings, resolver }
    }

    /// Builds the define and command sets.
    ///
    /// `archives` are the realized per-architecture archive paths in the
    /// order the architectures were requested.
    ///
    /// # Errors
    ///
    /// Fails only on a malformed version or build number.
    pub fn build(
        &self,
        icon: &Path,
        installer_path: &Path,
        archives: &[(Arch, PathBuf)],
    ) -> Result<(DefineSet, CommandSet)> {
        let app = self.settings.app_info();
        let options = self.settings.nsis_settings();
        let mut defines = DefineSet::new();

        let app_id = app.id();
        let guid = match &options.guid {
            Some(guid) => guid.clone(),
            None => derive_guid(&app_id),
        };

        defines.set("APP_ID", app_id);
        defines.set("APP_GUID", guid);
        defines.set("PRODUCT_NAME", &app.product_name);
        defines.set("PRODUCT_FILENAME", app.product_filename());
        defines.set("APP_DESCRIPTION", &app.description);
        defines.set("VERSION", &app.version);

        let icon = icon.display().to_string();
        defines.set("MUI_ICON", &icon);
        defines.set("MUI_UNICON", &icon);

        defines.set("COMPANY_NAME", &app.company_name);
        defines.set("PROJECT_DIR", self.settings.project_dir().display().to_string());
        defines.set(
            "BUILD_RESOURCES_DIR",
            self.resolver.build_resources_dir().display().to_string(),
        );

        for (arch, archive) in archives {
            defines.set(arch.app_define(), archive.display().to_string());
        }

        let one_click = options.one_click;

        if one_click {
            let header_icon = self
                .resolver
                .resolve(&options.installer_header_icon, "installerHeaderIcon.ico");
            if let Some(header_icon) = header_icon {
                defines.set("HEADER_ICO", header_icon.display().to_string());
            }
        } else {
            let header = self
                .resolver
                .resolve(&options.installer_header, "installerHeader.bmp");
            if let Some(header) = header {
                defines.flag("MUI_HEADERIMAGE");
                defines.flag("MUI_HEADERIMAGE_RIGHT");
                defines.set("MUI_HEADERIMAGE_BITMAP", header.display().to_string());
            }
        }

        if options.per_machine {
            defines.flag("INSTALL_MODE_PER_ALL_USERS");
        }

        if !one_click || options.per_machine {
            defines.flag("INSTALL_MODE_PER_ALL_USERS_REQUIRED");
        }

        if one_click {
            if options.run_after_finish {
                defines.flag("RUN_AFTER_FINISH");
            }
        } else if options.allow_elevation {
            defines.flag("MULTIUSER_INSTALLMODE_ALLOW_ELEVATION");
        }

        let mut commands = CommandSet::new();
        commands.set("OutFile", utils::quote(&installer_path.display().to_string()));
        commands.set("VIProductVersion", utils::product_version(app)?);
        commands.set_list("VIAddVersionKey", self.version_keys());

        match self.settings.compression() {
            Compression::Store => {
                commands.set("SetCompress", "off");
                defines.set("COMPRESS", "off");
            }
            Compression::Normal | Compression::Maximum => {
                commands.set("SetCompressor", "lzma");
                commands.set("SetCompressorDictSize", LZMA_DICT_SIZE);
                defines.set("COMPRESS", "auto");
            }
        }

        if one_click {
            defines.flag("ONE_CLICK");
        }

        Ok((defines, commands))
    }

    fn version_keys(&self) -> Vec<String> {
        let app = self.settings.app_info();
        let mut keys = vec![
            format!("ProductName {}", utils::quote(&app.product_name)),
            format!("ProductVersion {}", utils::quote(&app.version)),
            format!("CompanyName {}", utils::quote(&app.company_name)),
            format!("LegalCopyright {}", utils::quote(&app.copyright())),
            format!("FileDescription {}", utils::quote(&app.description)),
            format!("FileVersion {}", utils::quote(&app.build_version())),
        ];
        if let Some(trademarks) = &self.settings.windows_settings().legal_trademarks {
            keys.push(format!("LegalTrademarks {}", utils::quote(trademarks)));
        }
        keys
    }
}

//! NSIS installer script synthesis.
//!
//! The script handed to makensis is the base template (or the user's
//! replacement script) with the optional include fragment and the file
//! association macros prepended.

use super::resources::ResourceResolver;
use crate::bundler::{
    error::{ErrorExt, Result},
    settings::Settings,
};
use std::path::{Path, PathBuf};

/// File name of the base template and of the conventional replacement script.
pub const INSTALLER_SCRIPT: &str = "installer.nsi";

/// Conventional include fragment in the build resources directory.
pub const INSTALLER_INCLUDE: &str = "installer.nsh";

/// Library providing `APP_ASSOCIATE` / `APP_UNASSOCIATE`.
pub const FILE_ASSOCIATION_INCLUDE: &str = "FileAssociation.nsh";

/// Original script text for both compiler invocations.
#[derive(Clone, Debug)]
pub struct BaseScript {
    /// Script text.
    pub text: String,
    /// Path of the user's replacement script, when one is used.
    pub custom_path: Option<PathBuf>,
}

impl BaseScript {
    /// Loads the user's replacement script if one resolves, else the template.
    ///
    /// The template is not read at all when a replacement exists.
    pub async fn load(settings: &Settings, resolver: &ResourceResolver) -> Result<Self> {
        let custom_path = resolver.resolve(&settings.nsis_settings().script, INSTALLER_SCRIPT);
        let path = match &custom_path {
            Some(path) => path.clone(),
            None => settings.nsis_templates_dir().join(INSTALLER_SCRIPT),
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .fs_context("reading NSIS script", &path)?;

        Ok(Self { text, custom_path })
    }

    /// Whether the user supplied the full script.
    pub fn is_custom(&self) -> bool {
        self.custom_path.is_some()
    }
}

/// Merges script fragments in a fixed order.
pub struct ScriptAssembler<'a> {
    include: Option<&'a Path>,
    build_resources_dir: &'a Path,
}

impl<'a> ScriptAssembler<'a> {
    /// Creates an assembler; `include` is the resolved include fragment.
    pub fn new(include: Option<&'a Path>, build_resources_dir: &'a Path) -> Self {
        Self {
            include,
            build_resources_dir,
        }
    }

    /// Produces the final script.
    ///
    /// Prepends, in order: the include fragment with an `!addincludedir` for
    /// the build resources directory, then `!include FileAssociation.nsh` and
    /// the association macro block. Nothing association related is emitted
    /// when `association_macros` is `None`.
    pub fn assemble(&self, base: &str, association_macros: Option<&str>) -> String {
        let mut script = base.to_string();

        if let Some(include) = self.include {
            script = format!(
                "!include \"{}\"\n!addincludedir \"{}\"\n{script}",
                include.display(),
                self.build_resources_dir.display()
            );
        }

        if let Some(macros) = association_macros {
            script = format!("!include {FILE_ASSOCIATION_INCLUDE}\n{script}");
            script = format!("{macros}{script}");
        }

        script
    }
}

//! File association macros.
//!
//! Generates the `registerFileAssociations` / `unregisterFileAssociations`
//! macro blocks that the installer template expands. The `APP_ASSOCIATE`
//! and `APP_UNASSOCIATE` macros come from `FileAssociation.nsh`.

use super::resources::ResourceResolver;
use crate::bundler::settings::FileAssociation;
use std::fmt::Write;

/// Name of the macro expanded by the installer.
pub const REGISTER_MACRO: &str = "registerFileAssociations";

/// Name of the macro expanded by the uninstaller.
pub const UNREGISTER_MACRO: &str = "unregisterFileAssociations";

/// Install-relative directory for packaged association icons.
const ICON_DIR: &str = "resources";

/// Which macro a compiler invocation needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MacroVariant {
    /// Installer build: associations are registered.
    Register,
    /// Uninstaller build: associations are removed.
    Unregister,
}

/// Turns file association descriptors into macro blocks.
pub struct FileAssociationScriptGenerator<'a> {
    resolver: &'a ResourceResolver,
    product_name: &'a str,
}

impl<'a> FileAssociationScriptGenerator<'a> {
    /// Creates a generator; `product_name` labels the "Open with" verb.
    pub fn new(resolver: &'a ResourceResolver, product_name: &'a str) -> Self {
        Self {
            resolver,
            product_name,
        }
    }

    /// Generates the block for `variant`, or `None` for an empty list.
    pub fn generate(
        &self,
        variant: MacroVariant,
        associations: &[FileAssociation],
    ) -> Option<String> {
        match variant {
            MacroVariant::Register => self.generate_register(associations),
            MacroVariant::Unregister => self.generate_unregister(associations),
        }
    }

    /// `registerFileAssociations` block.
    ///
    /// An icon found for an extension is packaged under `resources\` in the
    /// install directory; otherwise the executable's first icon is used.
    pub fn generate_register(&self, associations: &[FileAssociation]) -> Option<String> {
        if associations.is_empty() {
            return None;
        }

        let open_with = format!("\"Open with {}\"", self.product_name);
        let command = r#""$INSTDIR\${APP_EXECUTABLE_FILENAME} $\"%1$\"""#;

        let mut body = String::new();
        for item in associations {
            let ext = item.normalized_ext();
            let custom_icon = self.resolver.resolve(&item.icon, &format!("{ext}.ico"));

            let installed_icon = match &custom_icon {
                Some(icon) => {
                    let file_name = icon
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("{ext}.ico"));
                    let installed = format!("{ICON_DIR}\\{file_name}");
                    let _ = writeln!(
                        body,
                        "  File \"/oname={installed}\" \"{}\"",
                        icon.display()
                    );
                    installed
                }
                None => "${APP_EXECUTABLE_FILENAME},0".to_string(),
            };

            let _ = writeln!(
                body,
                "  !insertmacro APP_ASSOCIATE \"{ext}\" \"{}\" \"{}\" \"$INSTDIR\\{installed_icon}\" {open_with} {command}",
                item.name,
                item.description.as_deref().unwrap_or_default(),
            );
        }

        Some(wrap_macro(REGISTER_MACRO, &body))
    }

    /// `unregisterFileAssociations` block.
    pub fn generate_unregister(&self, associations: &[FileAssociation]) -> Option<String> {
        if associations.is_empty() {
            return None;
        }

        let mut body = String::new();
        for item in associations {
            let _ = writeln!(
                body,
                "  !insertmacro APP_UNASSOCIATE \"{}\" \"{}\"",
                item.normalized_ext(),
                item.name
            );
        }

        Some(wrap_macro(UNREGISTER_MACRO, &body))
    }
}

fn wrap_macro(name: &str, body: &str) -> String {
    format!("!macro {name}\n{body}!macroend\n")
}

//! System catalog access
//!
//! Both installation catalogs (the Store package repository and the classic
//! installer keys) live in the Windows registry. Access goes through the
//! [`SystemCatalog`] trait so the channel readers stay platform-independent and
//! testable; the Windows implementation wraps `winreg`, everything else sees an
//! empty catalog.
//!
//! All reads are soft: a missing key, a missing value, or a permissions problem
//! reads as "nothing there". Per-entry diagnostics happen in the channel
//! readers, which know what an absence means.

/// Read-only view over a nested key/value catalog.
///
/// Key paths are backslash-separated and start with a hive prefix
/// (`HKLM\...` or `HKCU\...`).
pub trait SystemCatalog: Send + Sync {
    /// Names of the direct subkeys of `path`, empty if the key is absent.
    fn subkeys(&self, path: &str) -> Vec<String>;

    /// String value `name` under `path`, `None` if absent or not a string.
    fn string_value(&self, path: &str, name: &str) -> Option<String>;
}

/// The catalog of the running system.
pub fn system_catalog() -> Box<dyn SystemCatalog> {
    #[cfg(windows)]
    {
        Box::new(RegistryCatalog)
    }
    #[cfg(not(windows))]
    {
        Box::new(EmptyCatalog)
    }
}

/// Registry-backed catalog (Windows only).
#[cfg(windows)]
pub struct RegistryCatalog;

#[cfg(windows)]
impl RegistryCatalog {
    fn open(path: &str) -> Option<winreg::RegKey> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};

        let (hive, rest) = path.split_once('\\')?;
        let root = match hive {
            "HKLM" => RegKey::predef(HKEY_LOCAL_MACHINE),
            "HKCU" => RegKey::predef(HKEY_CURRENT_USER),
            _ => return None,
        };
        root.open_subkey_with_flags(rest, KEY_READ).ok()
    }
}

#[cfg(windows)]
impl SystemCatalog for RegistryCatalog {
    fn subkeys(&self, path: &str) -> Vec<String> {
        match Self::open(path) {
            Some(key) => key.enum_keys().filter_map(|k| k.ok()).collect(),
            None => Vec::new(),
        }
    }

    fn string_value(&self, path: &str, name: &str) -> Option<String> {
        Self::open(path)?.get_value::<String, _>(name).ok()
    }
}

/// Catalog for platforms without a registry; always empty.
#[cfg(not(windows))]
pub struct EmptyCatalog;

#[cfg(not(windows))]
impl SystemCatalog for EmptyCatalog {
    fn subkeys(&self, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn string_value(&self, _path: &str, _name: &str) -> Option<String> {
        None
    }
}

/// In-memory catalog for tests: `(key path, value name) -> value`, with subkey
/// listings declared explicitly so tests control enumeration order.
#[cfg(test)]
pub struct MemoryCatalog {
    values: Vec<(String, String, String)>,
    children: Vec<(String, Vec<String>)>,
}

#[cfg(test)]
impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, path: &str, name: &str, value: &str) -> Self {
        self.values
            .push((path.to_string(), name.to_string(), value.to_string()));
        self
    }

    pub fn with_subkeys(mut self, path: &str, names: &[&str]) -> Self {
        self.children.push((
            path.to_string(),
            names.iter().map(|s| (*s).to_string()).collect(),
        ));
        self
    }
}

#[cfg(test)]
impl SystemCatalog for MemoryCatalog {
    fn subkeys(&self, path: &str) -> Vec<String> {
        self.children
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, names)| names.clone())
            .unwrap_or_default()
    }

    fn string_value(&self, path: &str, name: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(p, n, _)| p == path && n == name)
            .map(|(_, _, v)| v.clone())
    }
}

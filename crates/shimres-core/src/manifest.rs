//! Manifest metadata and override-field normalization.
//!
//! A package may redirect or disable module entries for the alternate target
//! through three manifest fields:
//!
//! - `browser`: string (replace the main entry) or map (multi-key overrides)
//! - `titanium`: same shapes; when present it takes precedence over `browser`,
//!   and its `useBrowser` key controls whether `browser` entries are merged in
//! - `browserify`: legacy string alias for `browser`, honored only when
//!   `browser` itself is absent
//!
//! Normalization collapses all of that into one [`OverrideMap`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use shimres_util::{absolutize, is_absolute_specifier, normalize};

/// Override field consulted when `titanium` is absent.
pub const BROWSER_FIELD: &str = "browser";
/// Override field that wins over `browser` when declared.
pub const TITANIUM_FIELD: &str = "titanium";
/// Legacy string alias for `browser`.
pub const BROWSERIFY_FIELD: &str = "browserify";
/// Control key on `titanium` enabling the browser merge.
const USE_BROWSER_KEY: &str = "useBrowser";

/// Parsed package metadata plus the location it was read from.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    data: Value,
}

impl Manifest {
    #[must_use]
    pub fn new(path: PathBuf, data: Value) -> Self {
        Self { path, data }
    }

    /// Path of the manifest file itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Declared package name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    /// Declared main entry.
    #[must_use]
    pub fn main(&self) -> Option<&str> {
        self.data.get("main").and_then(Value::as_str)
    }

    /// Raw parsed metadata.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Where a single override points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimTarget {
    /// Module is disabled; resolve to the built-in no-op stub.
    Empty,
    /// Fully resolved file path.
    Path(PathBuf),
    /// Re-route to another module identifier.
    Module(String),
}

/// Canonical override mapping built from one manifest.
///
/// Keys are bare module identifiers or absolute paths stored as strings;
/// which one a key is was decided during normalization, so lookups never
/// reinterpret them.
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    entries: HashMap<String, ShimTarget>,
}

impl OverrideMap {
    /// Look up an override by module identifier (or raw key).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ShimTarget> {
        self.entries.get(key)
    }

    /// Look up an override keyed by a fully resolved path.
    #[must_use]
    pub fn get_path(&self, path: &Path) -> Option<&ShimTarget> {
        self.entries.get(path.to_string_lossy().as_ref())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, key: String, target: ShimTarget) {
        self.entries.insert(key, target);
    }
}

/// Shape of one override field as declared in the manifest.
#[derive(Debug, Clone)]
enum OverrideField {
    Absent,
    /// Bare string: replaces the package's main entry.
    Single(String),
    /// Map from original specifier or path to replacement.
    Entries(Map<String, Value>),
}

impl OverrideField {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(s)) => Self::Single(s.clone()),
            Some(Value::Object(map)) => Self::Entries(map.clone()),
            // Declared but unusable (bool, number, array): counts as present
            // so the shim search still stops here, but contributes nothing.
            Some(_) => Self::Entries(Map::new()),
        }
    }

    fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// String-to-map coercion: a bare string stands for "replace the declared
    /// main entry" (default `index.js`).
    fn into_entries(self, main: Option<&str>) -> Map<String, Value> {
        match self {
            Self::Absent => Map::new(),
            Self::Single(target) => {
                let mut map = Map::new();
                map.insert(main.unwrap_or("index.js").to_string(), Value::String(target));
                map
            }
            Self::Entries(map) => map,
        }
    }
}

/// JavaScript truthiness, which is what the `useBrowser` flag follows.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `browser` (with the legacy `browserify` string folded in) and `titanium`.
fn declared_fields(data: &Value) -> (OverrideField, OverrideField) {
    let mut browser = OverrideField::from_value(data.get(BROWSER_FIELD));
    if browser.is_absent() {
        if let OverrideField::Single(alias) = OverrideField::from_value(data.get(BROWSERIFY_FIELD))
        {
            browser = OverrideField::Single(alias);
        }
    }

    (browser, OverrideField::from_value(data.get(TITANIUM_FIELD)))
}

fn use_browser_flag(data: &Value) -> bool {
    data.get(TITANIUM_FIELD)
        .and_then(|t| t.get(USE_BROWSER_KEY))
        .is_some_and(is_truthy)
}

/// Build the canonical override map from a manifest.
///
/// Returns `None` when the manifest declares neither override field; the shim
/// loader treats that as a definitive "no overrides" for this subtree.
///
/// Targets of `false` become the empty stub; `.`-relative targets and all
/// path-shaped keys are absolutized against the manifest's directory; keys
/// that don't look like paths and differ from the declared main entry stay
/// bare module identifiers.
#[must_use]
pub fn override_map(manifest: &Manifest) -> Option<OverrideMap> {
    let (browser, titanium) = declared_fields(manifest.data());
    let has_browser = !browser.is_absent();
    let has_titanium = !titanium.is_absent();
    if !has_browser && !has_titanium {
        return None;
    }

    let use_browser = has_browser && (!has_titanium || use_browser_flag(manifest.data()));

    let main: Option<String> = manifest.main().map(str::to_string);
    let browser_entries = browser.into_entries(main.as_deref());

    let mut effective = if has_titanium {
        let mut entries = titanium.into_entries(main.as_deref());
        if use_browser {
            // Merge: titanium entries win on conflict.
            for (key, value) in browser_entries {
                if !entries.contains_key(&key) {
                    entries.insert(key, value);
                }
            }
        }
        entries
    } else {
        browser_entries
    };
    effective.remove(USE_BROWSER_KEY);

    let dir = manifest.dir();
    let mut shims = OverrideMap::default();
    for (key, value) in effective {
        let target = match value {
            Value::Bool(false) => ShimTarget::Empty,
            Value::String(s) if s.starts_with('.') => ShimTarget::Path(absolutize(dir, &s)),
            Value::String(s) if is_absolute_specifier(&s) => ShimTarget::Path(PathBuf::from(s)),
            Value::String(s) => ShimTarget::Module(s),
            // Any other value is a malformed declaration; skip it.
            _ => continue,
        };

        let bare_module_key = !key.starts_with('/')
            && !key.starts_with('.')
            && main.as_deref() != Some(key.as_str());
        if bare_module_key {
            shims.insert(key, target);
        } else {
            let resolved = absolutize(dir, &key);
            shims.insert(resolved.to_string_lossy().into_owned(), target);
        }
    }

    Some(shims)
}

fn set_main(data: &mut Value, target: &str) {
    if let Value::Object(map) = data {
        map.insert("main".to_string(), Value::String(target.to_string()));
    }
}

/// Manifest-rewrite hook applied to every candidate package during path
/// resolution: swaps the declared `main` according to the override fields.
///
/// Unlike [`override_map`], no browser/titanium merge happens here and only
/// the main-entry key matters. Separator-normalized copies of every entry are
/// added to the effective map (originals retained), but the main-entry lookup
/// itself uses the *raw* declared string (default `./index.js`). That
/// asymmetry is kept for compatibility; see DESIGN.md.
#[must_use]
pub fn rewrite_main(mut data: Value, _pkg_dir: &Path) -> Value {
    let (browser, titanium) = declared_fields(&data);
    let has_browser = !browser.is_absent();
    let has_titanium = !titanium.is_absent();
    if !has_browser && !has_titanium {
        return data;
    }

    let use_browser = has_browser && (!has_titanium || use_browser_flag(&data));

    if let OverrideField::Single(target) = titanium {
        set_main(&mut data, &target);
        return data;
    }
    if use_browser {
        if let OverrideField::Single(target) = browser {
            set_main(&mut data, &target);
            return data;
        }
    }

    let (field_name, substitute) = if has_titanium {
        (TITANIUM_FIELD, titanium)
    } else {
        (BROWSER_FIELD, browser)
    };
    let OverrideField::Entries(mut table) = substitute else {
        return data;
    };

    let pairs: Vec<(String, String)> = table
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect();
    for (key, value) in pairs {
        table.insert(normalize(&key), Value::String(normalize(&value)));
    }

    let main_key = data
        .get("main")
        .and_then(Value::as_str)
        .unwrap_or("./index.js")
        .to_string();
    let replacement = table
        .get(&main_key)
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Value::Object(map) = &mut data {
        map.insert(field_name.to_string(), Value::Object(table));
    }
    if let Some(replacement) = replacement {
        set_main(&mut data, &replacement);
    }

    data
}

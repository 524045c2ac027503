use std::{
    any::Any,
    collections::HashMap,
    env::consts::{DLL_PREFIX, DLL_SUFFIX},
    ffi::c_void,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use libloading::{Library, Symbol};
use tempo_model::{RateControlSpec, RoundContext};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    controller::{ControlError, RateController, pace},
    error::CoreError,
    plugin::abi::{
        TEMPO_CONTROLLER_ABI_VERSION, TEMPO_CONTROLLER_ENTRY_SYMBOL, TempoControllerEntry,
        TempoControllerVTable, TempoRoundInfo, TempoStatsSnapshot,
    },
    registry::{ControllerFactory, ControllerLoader, ControllerRegistry, LoaderError},
    stats::StatsHandle,
};

/// Whatever keeps a plugin's code mapped: the [`Library`] in production.
type KeepAlive = Arc<dyn Any + Send + Sync>;

/// Loads rate controllers from shared libraries in a fixed directory.
///
/// A type name `my-rate` maps to `<dir>/libmy-rate.so` (platform prefix and suffix).
/// Loaded libraries are cached by name and stay mapped until the process exits.
pub struct LibraryLoader {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<LibraryFactory>>>,
}

impl LibraryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Library path a type name maps to.
    pub fn library_path(&self, type_name: &str) -> PathBuf {
        self.dir.join(format!("{DLL_PREFIX}{type_name}{DLL_SUFFIX}"))
    }

    fn open(&self, type_name: &str, path: &Path) -> Result<LibraryFactory, LoaderError> {
        let shown = path.display().to_string();

        // SAFETY: loading a library runs its initializers; plugins are trusted by configuration.
        let lib = unsafe { Library::new(path) }.map_err(|e| LoaderError::Load {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

        // SAFETY: the symbol type matches the ABI contract in `plugin::abi`.
        let vtable = unsafe {
            let entry: Symbol<TempoControllerEntry> = lib
                .get(TEMPO_CONTROLLER_ENTRY_SYMBOL.as_bytes())
                .map_err(|_| LoaderError::MissingSymbol {
                    symbol: TEMPO_CONTROLLER_ENTRY_SYMBOL.to_string(),
                    path: shown.clone(),
                })?;
            read_vtable(*entry, &shown)?
        };

        Ok(LibraryFactory::new(type_name, vtable, Arc::new(lib)))
    }
}

/// Calls a plugin entry point and checks the table it returns.
///
/// # Safety
/// `entry` must follow the contract of [`TempoControllerEntry`].
unsafe fn read_vtable(
    entry: TempoControllerEntry,
    path: &str,
) -> Result<TempoControllerVTable, LoaderError> {
    // SAFETY: guaranteed by the caller.
    let ptr = unsafe { entry() };
    if ptr.is_null() {
        return Err(LoaderError::Load {
            path: path.to_string(),
            reason: "entry point returned a null vtable".into(),
        });
    }
    // SAFETY: non-null and valid while the library is loaded.
    let vtable = unsafe { *ptr };

    if vtable.abi_version != TEMPO_CONTROLLER_ABI_VERSION {
        return Err(LoaderError::AbiMismatch {
            plugin: vtable.abi_version,
            host: TEMPO_CONTROLLER_ABI_VERSION,
        });
    }
    Ok(vtable)
}

impl ControllerLoader for LibraryLoader {
    fn name(&self) -> &str {
        "dylib"
    }

    fn load(&self, type_name: &str) -> Result<Option<Arc<dyn ControllerFactory>>, LoaderError> {
        if type_name.contains(['/', '\\']) || type_name.contains("..") {
            return Err(LoaderError::InvalidName(type_name.to_string()));
        }

        let mut cache = self.cache.lock().map_err(|_| LoaderError::Load {
            path: self.dir.display().to_string(),
            reason: "library cache poisoned".into(),
        })?;
        if let Some(factory) = cache.get(type_name) {
            trace!(controller = type_name, "plugin served from cache");
            return Ok(Some(Arc::clone(factory) as Arc<dyn ControllerFactory>));
        }

        let path = self.library_path(type_name);
        if !path.exists() {
            debug!(controller = type_name, path = %path.display(), "no plugin library");
            return Ok(None);
        }

        let factory = Arc::new(self.open(type_name, &path)?);
        info!(controller = type_name, path = %path.display(), "loaded rate controller plugin");
        cache.insert(type_name.to_string(), Arc::clone(&factory));
        Ok(Some(factory as Arc<dyn ControllerFactory>))
    }
}

struct LibraryFactory {
    name: String,
    vtable: TempoControllerVTable,
    lib: KeepAlive,
}

impl LibraryFactory {
    fn new(name: &str, vtable: TempoControllerVTable, lib: KeepAlive) -> Self {
        Self {
            name: name.to_string(),
            vtable,
            lib,
        }
    }
}

impl ControllerFactory for LibraryFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts = serde_json::to_vec(&spec.opts).map_err(|e| CoreError::invalid_opts(&self.name, e))?;
        let info = TempoRoundInfo::from(round);

        // SAFETY: pointers are valid for the duration of the call; the library is kept alive by `self.lib`.
        let state = unsafe { (self.vtable.create)(opts.as_ptr(), opts.len(), &info) };
        if state.is_null() {
            return Err(CoreError::invalid_opts(&self.name, "plugin rejected the options"));
        }

        Ok(Box::new(LibraryController {
            name: self.name.clone(),
            vtable: self.vtable,
            state,
            attempt: 0,
            stats: Arc::clone(registry.ctx().stats()),
            cancel: registry.ctx().cancel().clone(),
            _lib: Arc::clone(&self.lib),
        }))
    }
}

/// Controller instance living inside a plugin.
struct LibraryController {
    name: String,
    vtable: TempoControllerVTable,
    state: *mut c_void,
    attempt: u64,
    stats: StatsHandle,
    cancel: CancellationToken,
    // Declared last: dropped after `state` is destroyed.
    _lib: KeepAlive,
}

// SAFETY: the plugin state is only touched through `&mut self`, never concurrently.
unsafe impl Send for LibraryController {}

#[async_trait]
impl RateController for LibraryController {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let snapshot = TempoStatsSnapshot::capture(self.stats.as_ref());
        // SAFETY: `state` came from `create` and has not been destroyed.
        let delay_ms = unsafe { (self.vtable.next_delay_ms)(self.state, self.attempt, &snapshot) };
        self.attempt += 1;
        pace(std::time::Duration::from_millis(delay_ms), &self.cancel).await
    }
}

impl Drop for LibraryController {
    fn drop(&mut self) {
        // SAFETY: `state` came from `create` and is destroyed exactly once.
        unsafe { (self.vtable.destroy)(self.state) };
    }
}

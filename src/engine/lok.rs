use super::{ffi, Engine, LoadedDocument};
use crate::error::EngineError;
use libloading::Library;
use std::ffi::{CStr, CString};
use std::mem::offset_of;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use tracing::{debug, info};

/// Library names tried inside the install directory, in order. Builds made
/// with `--enable-mergelibs` (Ubuntu, among others) only ship the merged one.
pub const DEFAULT_CANDIDATE_LIBRARIES: &[&str] = &["libsofficeapp.so", "libmergedlo.so"];

/// Returns the first candidate that exists inside `install_dir`.
pub fn find_library<S: AsRef<str>>(install_dir: &Path, candidates: &[S]) -> Result<PathBuf, EngineError> {
    for name in candidates {
        let path = install_dir.join(name.as_ref());
        if path.exists() {
            debug!("found engine library {}", path.display());
            return Ok(path);
        }
        debug!("engine library not present: {}", path.display());
    }
    let tried = candidates
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    Err(EngineError::Initialization(format!(
        "no target library found in {} (tried: {tried})",
        install_dir.display()
    )))
}

fn to_cstring(s: &str, what: &'static str) -> Result<CString, EngineError> {
    CString::new(s).map_err(|source| EngineError::InvalidString { what, source })
}

fn to_cstring_opt(s: Option<&str>, what: &'static str) -> Result<Option<CString>, EngineError> {
    s.map(|s| to_cstring(s, what)).transpose()
}

/// `None` maps to the native null sentinel, never to `""`.
fn opt_ptr(s: &Option<CString>) -> *const c_char {
    s.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

/// A live LibreOfficeKit instance.
///
/// The engine is not reentrant. `Office` holds raw pointers, so it is neither
/// `Send` nor `Sync`, and every conversion runs on the thread that created it.
pub struct Office {
    raw: NonNull<ffi::LibreOfficeKit>,
    install_dir: PathBuf,
    library: Option<Library>,
}

impl Office {
    /// Loads the first available engine library from `install_dir` and calls
    /// its hook with that directory.
    pub fn initialize<S: AsRef<str>>(install_dir: &Path, candidates: &[S]) -> Result<Self, EngineError> {
        let lib_path = find_library(install_dir, candidates)?;
        let c_dir = CString::new(install_dir.as_os_str().as_encoded_bytes()).map_err(|source| {
            EngineError::InvalidString {
                what: "install directory",
                source,
            }
        })?;

        info!("loading {}", lib_path.display());
        let library = unsafe { Library::new(&lib_path) }.map_err(|e| {
            EngineError::Initialization(format!("failed to open library '{}': {e}", lib_path.display()))
        })?;

        let hook: ffi::HookFn = unsafe {
            *library.get::<ffi::HookFn>(ffi::HOOK_SYMBOL).map_err(|e| {
                EngineError::Initialization(format!(
                    "failed to find libreofficekit_hook in library '{}': {e}",
                    lib_path.display()
                ))
            })?
        };

        let raw = unsafe { hook(c_dir.as_ptr()) };
        match unsafe { Self::from_raw(raw, install_dir) } {
            Ok(mut office) => {
                office.library = Some(library);
                Ok(office)
            }
            Err(err) => {
                // The hook may have started engine threads; never unmap it.
                std::mem::forget(library);
                Err(err)
            }
        }
    }

    /// Wraps a handle returned by `libreofficekit_hook`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to a `LibreOfficeKit` whose function table
    /// follows the LibreOfficeKit ABI and stays valid until `destroy` is called.
    /// Ownership of the handle passes to the returned `Office`.
    pub unsafe fn from_raw(raw: *mut ffi::LibreOfficeKit, install_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let raw = NonNull::new(raw)
            .ok_or_else(|| EngineError::Initialization("libreofficekit_hook returned null".into()))?;
        let class = unsafe { raw.as_ref().class };
        if class.is_null() {
            return Err(EngineError::Initialization("engine handle has no function table".into()));
        }
        if unsafe { (*class).size } == 0 {
            return Err(EngineError::Initialization("engine function table is empty".into()));
        }
        Ok(Self {
            raw,
            install_dir: install_dir.into(),
            library: None,
        })
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    fn class(&self) -> &ffi::LibreOfficeKitClass {
        unsafe { &*self.raw.as_ref().class }
    }

    fn has_load_with_options(&self) -> bool {
        ffi::table_has(
            self.class().size,
            offset_of!(ffi::LibreOfficeKitClass, document_load_with_options),
        )
    }

    fn has_free_error(&self) -> bool {
        ffi::table_has(self.class().size, offset_of!(ffi::LibreOfficeKitClass, free_error))
    }

    /// Loads `url`. `options` only reaches engines that support load options.
    pub fn document_load(&self, url: &str, options: Option<&str>) -> Result<Document<'_>, EngineError> {
        let c_url = to_cstring(url, "document URL")?;
        let c_options = to_cstring_opt(options, "load options")?;
        let class = self.class();
        let this = self.raw.as_ptr();

        let doc = match class.document_load_with_options {
            Some(load) if self.has_load_with_options() => unsafe { load(this, c_url.as_ptr(), opt_ptr(&c_options)) },
            _ => match class.document_load {
                Some(load) => unsafe { load(this, c_url.as_ptr()) },
                None => return Err(EngineError::Import("engine does not provide documentLoad".into())),
            },
        };

        let Some(doc) = NonNull::new(doc) else {
            return Err(EngineError::Import(self.last_error()));
        };
        if unsafe { doc.as_ref().class }.is_null() {
            return Err(EngineError::Import("loaded document has no function table".into()));
        }
        debug!("loaded {url}");
        Ok(Document {
            raw: doc,
            office: self,
        })
    }

    /// The engine's most recent error message, or an empty string.
    pub fn last_error(&self) -> String {
        let class = self.class();
        let Some(get_error) = class.get_error else {
            return String::new();
        };
        let msg = unsafe { get_error(self.raw.as_ptr()) };
        if msg.is_null() {
            return String::new();
        }
        let text = unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned();
        if let Some(free_error) = class.free_error.filter(|_| self.has_free_error()) {
            unsafe { free_error(msg) };
        }
        text
    }
}

impl Drop for Office {
    fn drop(&mut self) {
        if let Some(destroy) = self.class().destroy {
            debug!("destroying LibreOfficeKit instance");
            unsafe { destroy(self.raw.as_ptr()) };
        }
        // LibreOffice cannot be unloaded from a running process.
        if let Some(library) = self.library.take() {
            std::mem::forget(library);
        }
    }
}

/// A document loaded by an [`Office`]. Borrowing the office keeps the engine
/// alive for as long as the document is.
pub struct Document<'a> {
    raw: NonNull<ffi::LibreOfficeKitDocument>,
    office: &'a Office,
}

impl Document<'_> {
    fn class(&self) -> &ffi::LibreOfficeKitDocumentClass {
        unsafe { &*self.raw.as_ref().class }
    }

    /// Saves to `url`. A non-zero native result is success whatever its value.
    pub fn save_as(&self, url: &str, format: Option<&str>, options: Option<&str>) -> Result<(), EngineError> {
        let c_url = to_cstring(url, "output URL")?;
        let c_format = to_cstring_opt(format, "format")?;
        let c_options = to_cstring_opt(options, "filter options")?;

        let class = self.class();
        let save_as = class
            .save_as
            .filter(|_| ffi::table_has(class.size, offset_of!(ffi::LibreOfficeKitDocumentClass, save_as)))
            .ok_or_else(|| EngineError::Export("engine document does not provide saveAs".into()))?;

        let rc = unsafe {
            save_as(
                self.raw.as_ptr(),
                c_url.as_ptr(),
                opt_ptr(&c_format),
                opt_ptr(&c_options),
            )
        };
        if rc == 0 {
            return Err(EngineError::Export(self.office.last_error()));
        }
        debug!("saved {url} (rc={rc})");
        Ok(())
    }
}

impl Drop for Document<'_> {
    fn drop(&mut self) {
        if let Some(destroy) = self.class().destroy {
            unsafe { destroy(self.raw.as_ptr()) };
        }
    }
}

impl Engine for Office {
    type Document<'a> = Document<'a>;

    fn load_document(&self, url: &str, options: Option<&str>) -> Result<Document<'_>, EngineError> {
        self.document_load(url, options)
    }

    fn last_error(&self) -> String {
        Office::last_error(self)
    }
}

impl LoadedDocument for Document<'_> {
    fn save_as(&self, url: &str, format: Option<&str>, options: Option<&str>) -> Result<(), EngineError> {
        Document::save_as(self, url, format, options)
    }
}

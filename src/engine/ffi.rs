//! `#[repr(C)]` mirrors of the LibreOfficeKit function tables.
//!
//! Only the leading entries the converter needs are declared. Newer engines
//! append entries after these and grow `size` accordingly, so the layout of the
//! prefix is stable.

use std::os::raw::{c_char, c_int};

/// Symbol exported by `libsofficeapp.so` / `libmergedlo.so`.
pub const HOOK_SYMBOL: &[u8] = b"libreofficekit_hook\0";

pub type HookFn = unsafe extern "C" fn(install_path: *const c_char) -> *mut LibreOfficeKit;

#[repr(C)]
pub struct LibreOfficeKit {
    pub class: *mut LibreOfficeKitClass,
}

#[repr(C)]
pub struct LibreOfficeKitClass {
    pub size: usize,
    pub destroy: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit)>,
    pub document_load: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKit, url: *const c_char) -> *mut LibreOfficeKitDocument,
    >,
    pub get_error: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit) -> *mut c_char>,
    pub document_load_with_options: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKit,
            url: *const c_char,
            options: *const c_char,
        ) -> *mut LibreOfficeKitDocument,
    >,
    pub free_error: Option<unsafe extern "C" fn(message: *mut c_char)>,
}

#[repr(C)]
pub struct LibreOfficeKitDocument {
    pub class: *mut LibreOfficeKitDocumentClass,
}

#[repr(C)]
pub struct LibreOfficeKitDocumentClass {
    pub size: usize,
    pub destroy: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument)>,
    pub save_as: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            url: *const c_char,
            format: *const c_char,
            filter_options: *const c_char,
        ) -> c_int,
    >,
}

/// True when an entry at `offset` lies inside a table advertising `size` bytes.
pub fn table_has(size: usize, offset: usize) -> bool {
    offset < size
}

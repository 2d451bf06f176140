//! In-process stand-in for the LibreOfficeKit function tables.
#![allow(dead_code)]

use lloconv::engine::ffi::{LibreOfficeKit, LibreOfficeKitClass, LibreOfficeKitDocument, LibreOfficeKitDocumentClass};
use lloconv::engine::Office;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::mem::{offset_of, size_of};
use std::os::raw::{c_char, c_int};
use std::ptr;

pub type Save = (String, Option<String>, Option<String>);

pub struct FakeState {
    pub error: Option<String>,
    pub loads: Vec<(String, Option<String>)>,
    pub saves: Vec<Save>,
    pub save_rc: c_int,
    pub save_error: String,
    pub office_destroyed: u32,
    pub docs_destroyed: u32,
    pub errors_freed: u32,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            error: None,
            loads: Vec::new(),
            saves: Vec::new(),
            save_rc: 1,
            save_error: "Export filter failed".into(),
            office_destroyed: 0,
            docs_destroyed: 0,
            errors_freed: 0,
        }
    }
}

thread_local! {
    static STATE: RefCell<FakeState> = RefCell::new(FakeState::default());
}

pub fn state<R>(f: impl FnOnce(&mut FakeState) -> R) -> R {
    STATE.with(|s| f(&mut s.borrow_mut()))
}

unsafe fn opt_string(p: *const c_char) -> Option<String> {
    if p.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned())
    }
}

unsafe extern "C" fn office_destroy(this: *mut LibreOfficeKit) {
    state(|s| s.office_destroyed += 1);
    drop(unsafe { Box::from_raw(this) });
}

unsafe extern "C" fn document_load(this: *mut LibreOfficeKit, url: *const c_char) -> *mut LibreOfficeKitDocument {
    unsafe { document_load_with_options(this, url, ptr::null()) }
}

unsafe extern "C" fn document_load_with_options(
    _this: *mut LibreOfficeKit,
    url: *const c_char,
    options: *const c_char,
) -> *mut LibreOfficeKitDocument {
    let url = unsafe { opt_string(url) }.unwrap_or_default();
    let options = unsafe { opt_string(options) };
    state(|s| s.loads.push((url.clone(), options)));
    if url.contains("missing") {
        state(|s| s.error = Some(format!("Unsupported URL <{url}>: \"type detection failed\"")));
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(LibreOfficeKitDocument {
        class: &DOCUMENT_CLASS as *const LibreOfficeKitDocumentClass as *mut LibreOfficeKitDocumentClass,
    }))
}

unsafe extern "C" fn get_error(_this: *mut LibreOfficeKit) -> *mut c_char {
    match state(|s| s.error.clone()) {
        Some(e) => CString::new(e).map(CString::into_raw).unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

unsafe extern "C" fn free_error(msg: *mut c_char) {
    state(|s| s.errors_freed += 1);
    drop(unsafe { CString::from_raw(msg) });
}

unsafe extern "C" fn document_destroy(this: *mut LibreOfficeKitDocument) {
    state(|s| s.docs_destroyed += 1);
    drop(unsafe { Box::from_raw(this) });
}

unsafe extern "C" fn save_as(
    _this: *mut LibreOfficeKitDocument,
    url: *const c_char,
    format: *const c_char,
    filter_options: *const c_char,
) -> c_int {
    let save = unsafe {
        (
            opt_string(url).unwrap_or_default(),
            opt_string(format),
            opt_string(filter_options),
        )
    };
    state(|s| {
        s.saves.push(save);
        if s.save_rc == 0 {
            s.error = Some(s.save_error.clone());
        }
        s.save_rc
    })
}

pub static OFFICE_CLASS: LibreOfficeKitClass = LibreOfficeKitClass {
    size: size_of::<LibreOfficeKitClass>(),
    destroy: Some(office_destroy),
    document_load: Some(document_load),
    get_error: Some(get_error),
    document_load_with_options: Some(document_load_with_options),
    free_error: Some(free_error),
};

/// A table from an engine predating load options and `freeError`.
pub static LEGACY_OFFICE_CLASS: LibreOfficeKitClass = LibreOfficeKitClass {
    size: offset_of!(LibreOfficeKitClass, document_load_with_options),
    destroy: Some(office_destroy),
    document_load: Some(document_load),
    get_error: Some(get_error),
    document_load_with_options: Some(document_load_with_options),
    free_error: Some(free_error),
};

pub static EMPTY_OFFICE_CLASS: LibreOfficeKitClass = LibreOfficeKitClass {
    size: 0,
    destroy: None,
    document_load: None,
    get_error: None,
    document_load_with_options: None,
    free_error: None,
};

pub static DOCUMENT_CLASS: LibreOfficeKitDocumentClass = LibreOfficeKitDocumentClass {
    size: size_of::<LibreOfficeKitDocumentClass>(),
    destroy: Some(document_destroy),
    save_as: Some(save_as),
};

/// A heap handle as `libreofficekit_hook` would return it.
pub fn raw_handle(class: &'static LibreOfficeKitClass) -> *mut LibreOfficeKit {
    Box::into_raw(Box::new(LibreOfficeKit {
        class: class as *const LibreOfficeKitClass as *mut LibreOfficeKitClass,
    }))
}

fn office_with(class: &'static LibreOfficeKitClass) -> Office {
    state(|s| *s = FakeState::default());
    match unsafe { Office::from_raw(raw_handle(class), "/opt/fake/program") } {
        Ok(office) => office,
        Err(e) => panic!("fake handle rejected: {e}"),
    }
}

pub fn office() -> Office {
    office_with(&OFFICE_CLASS)
}

pub fn legacy_office() -> Office {
    office_with(&LEGACY_OFFICE_CLASS)
}

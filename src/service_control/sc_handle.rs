use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use windows_sys::Win32::Security::SC_HANDLE;
use windows_sys::Win32::System::Services::{CloseServiceHandle, OpenSCManagerW, OpenServiceW};

/// Owns a raw SCM handle and closes it when dropped.
pub(crate) struct ScHandle(SC_HANDLE);

impl ScHandle {
    pub(crate) fn open_manager(machine: Option<&str>, access: u32) -> io::Result<Self> {
        let machine = machine.map(to_wide);
        let machine_ptr = machine.as_ref().map_or(ptr::null(), |wide| wide.as_ptr());
        let handle = unsafe { OpenSCManagerW(machine_ptr, ptr::null(), access) };
        Self::from_raw(handle)
    }

    pub(crate) fn open_service(&self, name: &str, access: u32) -> io::Result<Self> {
        let name = to_wide(name);
        let handle = unsafe { OpenServiceW(self.0, name.as_ptr(), access) };
        Self::from_raw(handle)
    }

    fn from_raw(handle: SC_HANDLE) -> io::Result<Self> {
        if handle == 0 as SC_HANDLE {
            Err(io::Error::last_os_error())
        } else {
            Ok(ScHandle(handle))
        }
    }

    pub(crate) fn raw_handle(&self) -> SC_HANDLE {
        self.0
    }
}

impl Drop for ScHandle {
    fn drop(&mut self) {
        unsafe { CloseServiceHandle(self.0) };
    }
}

// Nul-terminated UTF-16
pub(crate) fn to_wide(value: &str) -> Vec<u16> {
    OsStr::new(value).encode_wide().chain(once(0)).collect()
}

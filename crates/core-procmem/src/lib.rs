//! Cross-process memory writes.
//!
//! One operation: put a byte sequence at an address inside another live
//! process. The write either lands in full or the call fails; there is no
//! partial-write recovery, and ordering against the target's own threads
//! is the caller's problem. The process handle (where the platform has
//! one) is scoped to the single call and released on every exit path.
//!
//! Backends: `process_vm_writev` on Linux, `OpenProcess` +
//! `WriteProcessMemory` on Windows. Anything else reports `Unsupported`.

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MemWriteError {
    #[error("opening process {pid} failed")]
    OpenFailed { pid: u32 },
    #[error("write to process {pid} failed ({written} of {requested} bytes)")]
    WriteFailed {
        pid: u32,
        written: usize,
        requested: usize,
    },
    #[error("cross-process writes are not supported on this platform")]
    Unsupported,
}

/// Write `bytes` at `address` in process `pid`. Succeeds iff the full
/// sequence was written.
pub fn write_process_memory(pid: u32, address: u64, bytes: &[u8]) -> Result<(), MemWriteError> {
    if bytes.is_empty() {
        return Ok(());
    }
    let result = imp::write(pid, address, bytes);
    match &result {
        Ok(()) => debug!(
            target: "procmem",
            pid,
            address = format_args!("0x{address:x}"),
            len = bytes.len(),
            "mem_write_ok"
        ),
        Err(e) => warn!(target: "procmem", pid, %e, "mem_write_failed"),
    }
    result
}

#[cfg(target_os = "linux")]
mod imp {
    use super::MemWriteError;

    pub fn write(pid: u32, address: u64, bytes: &[u8]) -> Result<(), MemWriteError> {
        let local = libc::iovec {
            iov_base: bytes.as_ptr() as *mut libc::c_void,
            iov_len: bytes.len(),
        };
        let remote = libc::iovec {
            iov_base: address as *mut libc::c_void,
            iov_len: bytes.len(),
        };
        // Safety: the local iovec describes our own live slice; the remote
        // iovec is interpreted by the kernel against the target's address
        // space, so a bad address surfaces as a failed or short write, not
        // a fault here.
        let written =
            unsafe { libc::process_vm_writev(pid as libc::pid_t, &local, 1, &remote, 1, 0) };
        if written == bytes.len() as isize {
            Ok(())
        } else {
            Err(MemWriteError::WriteFailed {
                pid,
                written: written.max(0) as usize,
                requested: bytes.len(),
            })
        }
    }
}

#[cfg(windows)]
mod imp {
    use super::MemWriteError;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::System::Diagnostics::Debug::WriteProcessMemory;
    use windows_sys::Win32::System::Threading::{
        OpenProcess, PROCESS_VM_OPERATION, PROCESS_VM_READ, PROCESS_VM_WRITE,
    };

    /// Closes the process handle on every exit path.
    struct HandleGuard(HANDLE);

    impl Drop for HandleGuard {
        fn drop(&mut self) {
            // Safety: the guard owns a handle OpenProcess returned.
            unsafe {
                CloseHandle(self.0);
            }
        }
    }

    pub fn write(pid: u32, address: u64, bytes: &[u8]) -> Result<(), MemWriteError> {
        // Safety: OpenProcess has no pointer arguments; a bad pid yields a
        // null handle checked below.
        let handle = unsafe {
            OpenProcess(PROCESS_VM_OPERATION | PROCESS_VM_WRITE | PROCESS_VM_READ, 0, pid)
        };
        if handle.is_null() {
            return Err(MemWriteError::OpenFailed { pid });
        }
        let guard = HandleGuard(handle);
        let mut written = 0usize;
        // Safety: buffer pointer/length describe our live slice; the target
        // address is validated by the kernel against the opened process.
        let ok = unsafe {
            WriteProcessMemory(
                guard.0,
                address as usize as *const core::ffi::c_void,
                bytes.as_ptr().cast(),
                bytes.len(),
                &mut written,
            )
        };
        if ok != 0 && written == bytes.len() {
            Ok(())
        } else {
            Err(MemWriteError::WriteFailed {
                pid,
                written,
                requested: bytes.len(),
            })
        }
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
mod imp {
    use super::MemWriteError;

    pub fn write(_pid: u32, _address: u64, _bytes: &[u8]) -> Result<(), MemWriteError> {
        Err(MemWriteError::Unsupported)
    }
}

//! Windows platform implementation
//!
//! This module provides Windows-specific implementations for memory access
//! and module enumeration of another process using Win32 APIs.

use super::{MemoryReader, MemoryRegion, ModuleInfo, Platform, PlatformError};
use std::ffi::c_void;
use windows::Win32::Foundation::{CloseHandle, BOOL, HANDLE, HMODULE};
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows::Win32::System::Memory::{
    VirtualQueryEx, MEMORY_BASIC_INFORMATION, MEM_COMMIT, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_READONLY, PAGE_READWRITE,
    PAGE_WRITECOPY,
};
use windows::Win32::System::ProcessStatus::{
    EnumProcessModules, GetModuleBaseNameW, GetModuleFileNameExW, GetModuleInformation,
    MODULEINFO,
};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcess, PROCESS_ALL_ACCESS};

/// Windows platform implementation
///
/// Holds one process handle opened with full access for the lifetime of the
/// session. The handle is closed on drop.
pub struct WindowsPlatform {
    process_handle: HANDLE,
    owns_handle: bool,
}

impl WindowsPlatform {
    /// Create a platform instance for the current process
    pub fn current() -> Self {
        Self {
            process_handle: unsafe { GetCurrentProcess() },
            owns_handle: false,
        }
    }

    /// Open a handle to a specific process
    pub fn attach(process_id: u32) -> Result<Self, PlatformError> {
        let process_handle =
            unsafe { OpenProcess(PROCESS_ALL_ACCESS, BOOL::from(false), process_id) }.map_err(
                |e| PlatformError::AccessDenied(format!("Failed to open process {}: {}", process_id, e)),
            )?;

        tracing::info!(pid = process_id, "Attached to process");

        Ok(Self {
            process_handle,
            owns_handle: true,
        })
    }

    /// Query all committed memory regions of the target
    fn query_all_memory_regions(&self) -> Vec<MemoryRegion> {
        let mut regions = Vec::new();
        let mut address = 0usize;

        loop {
            let mut mbi = MEMORY_BASIC_INFORMATION::default();

            let result = unsafe {
                VirtualQueryEx(
                    self.process_handle,
                    Some(address as *const c_void),
                    &mut mbi,
                    std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };

            if result == 0 {
                break;
            }

            if mbi.State == MEM_COMMIT {
                let protect = mbi.Protect;

                regions.push(MemoryRegion {
                    start: mbi.BaseAddress as usize,
                    end: (mbi.BaseAddress as usize) + mbi.RegionSize,
                    readable: matches!(
                        protect,
                        PAGE_READONLY
                            | PAGE_READWRITE
                            | PAGE_WRITECOPY
                            | PAGE_EXECUTE_READ
                            | PAGE_EXECUTE_READWRITE
                            | PAGE_EXECUTE_WRITECOPY
                    ),
                    writable: matches!(
                        protect,
                        PAGE_READWRITE
                            | PAGE_WRITECOPY
                            | PAGE_EXECUTE_READWRITE
                            | PAGE_EXECUTE_WRITECOPY
                    ),
                    executable: matches!(
                        protect,
                        PAGE_EXECUTE
                            | PAGE_EXECUTE_READ
                            | PAGE_EXECUTE_READWRITE
                            | PAGE_EXECUTE_WRITECOPY
                    ),
                });
            }

            let next = (mbi.BaseAddress as usize).wrapping_add(mbi.RegionSize);

            // Wrapped around the top of the address space
            if next <= address {
                break;
            }
            address = next;
        }

        regions
    }
}

impl Drop for WindowsPlatform {
    fn drop(&mut self) {
        if self.owns_handle {
            unsafe {
                let _ = CloseHandle(self.process_handle);
            }
        }
    }
}

impl MemoryReader for WindowsPlatform {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        if address < 0x10000 {
            return Err(PlatformError::InvalidAddress(address));
        }

        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0usize;

        unsafe {
            ReadProcessMemory(
                self.process_handle,
                address as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                size,
                Some(&mut bytes_read),
            )
        }
        .map_err(|e| PlatformError::MemoryReadFailed {
            address,
            size,
            reason: format!("ReadProcessMemory failed: {}", e),
        })?;

        if bytes_read != size {
            return Err(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: format!("Expected to read {} bytes, got {}", size, bytes_read),
            });
        }

        Ok(buffer)
    }

    fn write_bytes(&self, address: usize, data: &[u8]) -> Result<(), PlatformError> {
        if data.is_empty() {
            return Ok(());
        }

        if address < 0x10000 {
            return Err(PlatformError::InvalidAddress(address));
        }

        let mut bytes_written = 0usize;

        unsafe {
            WriteProcessMemory(
                self.process_handle,
                address as *const c_void,
                data.as_ptr() as *const c_void,
                data.len(),
                Some(&mut bytes_written),
            )
        }
        .map_err(|e| PlatformError::MemoryWriteFailed {
            address,
            size: data.len(),
            reason: format!("WriteProcessMemory failed: {}", e),
        })?;

        if bytes_written != data.len() {
            return Err(PlatformError::MemoryWriteFailed {
                address,
                size: data.len(),
                reason: format!("Expected to write {} bytes, wrote {}", data.len(), bytes_written),
            });
        }

        Ok(())
    }
}

impl Platform for WindowsPlatform {
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError> {
        let mut modules = vec![HMODULE::default(); 1024];
        let mut bytes_needed = 0u32;

        unsafe {
            EnumProcessModules(
                self.process_handle,
                modules.as_mut_ptr(),
                (modules.len() * std::mem::size_of::<HMODULE>()) as u32,
                &mut bytes_needed,
            )
        }
        .map_err(|e| PlatformError::Other(format!("EnumProcessModules failed: {}", e)))?;

        let module_count = (bytes_needed as usize) / std::mem::size_of::<HMODULE>();
        modules.truncate(module_count);

        let mut result = Vec::with_capacity(modules.len());

        for hmodule in modules {
            let mut module_info = MODULEINFO::default();

            unsafe {
                GetModuleInformation(
                    self.process_handle,
                    hmodule,
                    &mut module_info,
                    std::mem::size_of::<MODULEINFO>() as u32,
                )
            }
            .map_err(|e| PlatformError::Other(format!("GetModuleInformation failed: {}", e)))?;

            let mut name_buf = [0u16; 260];
            let name_len =
                unsafe { GetModuleBaseNameW(self.process_handle, hmodule, &mut name_buf) };

            let mut path_buf = [0u16; 260];
            let path_len =
                unsafe { GetModuleFileNameExW(self.process_handle, hmodule, &mut path_buf) };

            result.push(ModuleInfo {
                base_address: module_info.lpBaseOfDll as usize,
                size: module_info.SizeOfImage as usize,
                name: String::from_utf16_lossy(&name_buf[..name_len as usize]),
                path: String::from_utf16_lossy(&path_buf[..path_len as usize]),
            });
        }

        Ok(result)
    }

    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        Ok(self.query_all_memory_regions())
    }
}

// SAFETY: process HANDLEs are process-wide and usable from any thread.
unsafe impl Send for WindowsPlatform {}
unsafe impl Sync for WindowsPlatform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_memory() {
        let platform = WindowsPlatform::current();

        let test_value: u64 = 0x1234567890ABCDEF;
        let address = &test_value as *const u64 as usize;

        let result: u64 = platform.read(address).unwrap();
        assert_eq!(result, test_value);
    }

    #[test]
    fn test_write_memory() {
        let platform = WindowsPlatform::current();

        let target = Box::new(0u32);
        let address = &*target as *const u32 as usize;

        platform.write(address, &0xDEADBEEFu32).unwrap();
        let result: u32 = platform.read(address).unwrap();
        assert_eq!(result, 0xDEADBEEF);
    }

    #[test]
    fn test_low_addresses_rejected() {
        let platform = WindowsPlatform::current();

        assert!(platform.read_bytes(0, 4).is_err());
        assert!(platform.read_bytes(0x1000, 4).is_err());
    }

    #[test]
    fn test_get_modules() {
        let platform = WindowsPlatform::current();
        let modules = platform.get_modules().unwrap();

        assert!(!modules.is_empty());
        assert!(modules.iter().any(|m| m.name.ends_with(".exe")));
    }

    #[test]
    fn test_get_memory_regions() {
        let platform = WindowsPlatform::current();
        let regions = platform.get_memory_regions().unwrap();

        assert!(regions.iter().all(|r| r.end > r.start));

        let value = Box::new(7u64);
        let address = &*value as *const u64 as usize;
        assert!(regions.iter().any(|r| r.readable && r.contains(address)));
    }
}

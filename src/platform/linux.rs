//! Linux platform implementation
//!
//! This module provides Linux-specific implementations using
//! `process_vm_readv`/`process_vm_writev` and /proc/[pid]/maps

use super::{MemoryReader, MemoryRegion, ModuleInfo, Platform, PlatformError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Linux platform implementation
pub struct LinuxPlatform {
    /// Process ID we're reading from
    pid: i32,
}

impl LinuxPlatform {
    /// Create a platform instance for the current process
    pub fn current() -> Self {
        Self {
            pid: std::process::id() as i32,
        }
    }

    /// Attach to a specific process
    ///
    /// No ptrace stop is involved; the caller needs `CAP_SYS_PTRACE` or a
    /// permissive `ptrace_scope` for the reads to succeed.
    pub fn attach(pid: u32) -> Result<Self, PlatformError> {
        let maps_path = format!("/proc/{}/maps", pid);

        File::open(&maps_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlatformError::ProcessNotFound(pid.to_string()),
            _ => PlatformError::AccessDenied(format!(
                "Failed to open {}: {}",
                maps_path, e
            )),
        })?;

        tracing::info!(pid, "Attached to process");

        Ok(Self { pid: pid as i32 })
    }

    /// Process ID this platform reads from
    pub fn pid(&self) -> u32 {
        self.pid as u32
    }

    /// Read all lines of /proc/[pid]/maps
    fn maps_lines(&self) -> Result<Vec<String>, PlatformError> {
        let maps_path = format!("/proc/{}/maps", self.pid);
        let file = File::open(&maps_path)
            .map_err(|e| PlatformError::Other(format!("Failed to open {}: {}", maps_path, e)))?;

        BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PlatformError::Other(format!("Failed to read maps: {}", e)))
    }

    /// Parse /proc/[pid]/maps to get memory regions
    fn parse_maps(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        let regions = self
            .maps_lines()?
            .iter()
            .filter_map(|line| parse_maps_line(line))
            .map(|(region, _)| region)
            .collect();

        Ok(regions)
    }
}

/// Parse one maps line into a region and its backing path, if any
///
/// Line format: "address permissions offset dev inode pathname", e.g.
/// "7f1234567000-7f123456a000 r-xp 00000000 08:01 123456 /usr/lib/libc.so.6"
fn parse_maps_line(line: &str) -> Option<(MemoryRegion, Option<&str>)> {
    let mut parts = line.split_whitespace();
    let (start, end) = parts.next()?.split_once('-')?;
    let perms = parts.next()?.as_bytes();
    let path = parts.nth(3);

    let region = MemoryRegion {
        start: usize::from_str_radix(start, 16).ok()?,
        end: usize::from_str_radix(end, 16).ok()?,
        readable: perms.first() == Some(&b'r'),
        writable: perms.get(1) == Some(&b'w'),
        executable: perms.get(2) == Some(&b'x'),
    };

    Some((region, path))
}

fn iovec(ptr: *mut libc::c_void, len: usize) -> libc::iovec {
    libc::iovec {
        iov_base: ptr,
        iov_len: len,
    }
}

impl MemoryReader for LinuxPlatform {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        if address == 0 {
            return Err(PlatformError::InvalidAddress(address));
        }

        let mut buffer = vec![0u8; size];
        let local = iovec(buffer.as_mut_ptr().cast(), size);
        let remote = iovec(address as *mut libc::c_void, size);

        // SAFETY: `local` covers exactly `buffer`, which outlives the call.
        // The remote range is validated by the kernel, not dereferenced here.
        let read = unsafe { libc::process_vm_readv(self.pid, &local, 1, &remote, 1, 0) };

        if read < 0 {
            return Err(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: std::io::Error::last_os_error().to_string(),
            });
        }

        if read as usize != size {
            return Err(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: format!("Expected {} bytes, got {}", size, read),
            });
        }

        Ok(buffer)
    }

    fn write_bytes(&self, address: usize, data: &[u8]) -> Result<(), PlatformError> {
        if data.is_empty() {
            return Ok(());
        }

        if address == 0 {
            return Err(PlatformError::InvalidAddress(address));
        }

        let local = iovec(data.as_ptr() as *mut libc::c_void, data.len());
        let remote = iovec(address as *mut libc::c_void, data.len());

        // SAFETY: the kernel only reads from `local`, which borrows `data`.
        let written = unsafe { libc::process_vm_writev(self.pid, &local, 1, &remote, 1, 0) };

        if written < 0 || written as usize != data.len() {
            return Err(PlatformError::MemoryWriteFailed {
                address,
                size: data.len(),
                reason: std::io::Error::last_os_error().to_string(),
            });
        }

        Ok(())
    }
}

impl Platform for LinuxPlatform {
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError> {
        // Every file-backed mapping contributes to its module's span, so the
        // base is the lowest mapping of that file and the size runs to the
        // end of the highest one.
        let mut order: Vec<String> = Vec::new();
        let mut spans: HashMap<String, (usize, usize)> = HashMap::new();

        for line in self.maps_lines()? {
            let Some((region, Some(path))) = parse_maps_line(&line) else {
                continue;
            };

            if path.starts_with('[') {
                continue;
            }

            match spans.get_mut(path) {
                Some(span) => {
                    span.0 = span.0.min(region.start);
                    span.1 = span.1.max(region.end);
                }
                None => {
                    order.push(path.to_string());
                    spans.insert(path.to_string(), (region.start, region.end));
                }
            }
        }

        let modules = order
            .into_iter()
            .map(|path| {
                let (start, end) = spans[&path];
                let name = std::path::Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();

                ModuleInfo {
                    base_address: start,
                    size: end - start,
                    name,
                    path,
                }
            })
            .collect();

        Ok(modules)
    }

    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        self.parse_maps()
    }
}

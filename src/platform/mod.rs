//! Platform abstraction layer
//!
//! This module provides platform-independent interfaces for:
//! - Reading and writing memory of a target process
//! - Module enumeration
//! - Locating a target process by executable name

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsPlatform;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxPlatform;

#[cfg(test)]
pub mod mock;

/// Platform-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Failed to read memory at address
    #[error("Memory read failed at 0x{address:X} (size: {size}): {reason}")]
    MemoryReadFailed {
        /// Start of the failed read
        address: usize,
        /// Bytes requested
        size: usize,
        /// Backend-specific cause
        reason: String,
    },

    /// Failed to write memory at address
    #[error("Memory write failed at 0x{address:X} (size: {size}): {reason}")]
    MemoryWriteFailed {
        /// Start of the failed write
        address: usize,
        /// Bytes requested
        size: usize,
        /// Backend-specific cause
        reason: String,
    },

    /// Invalid address
    #[error("Invalid memory address: 0x{0:X}")]
    InvalidAddress(usize),

    /// No running process matched the requested name
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    /// Module not found
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Access denied
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Platform-specific error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Information about a loaded module
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Base address of the module
    pub base_address: usize,
    /// Size of the module in bytes
    pub size: usize,
    /// Name of the module
    pub name: String,
    /// Full path to the module
    pub path: String,
}

/// Memory region information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// Start address of the region
    pub start: usize,
    /// End address of the region (exclusive)
    pub end: usize,
    /// Whether the region is readable
    pub readable: bool,
    /// Whether the region is writable
    pub writable: bool,
    /// Whether the region is executable
    pub executable: bool,
}

impl MemoryRegion {
    /// Get the size of this memory region
    #[inline]
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if an address is within this region
    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end
    }
}

/// Core trait for accessing the memory of a target process
///
/// Implementations are strict: every failure is reported as a
/// [`PlatformError`]. The fail-soft policy used by the per-frame readers
/// lives one layer up, in [`crate::Session`].
pub trait MemoryReader: Send + Sync {
    /// Read raw bytes from memory
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError>;

    /// Write raw bytes to memory
    fn write_bytes(&self, address: usize, data: &[u8]) -> Result<(), PlatformError>;

    /// Read a POD (Plain Old Data) type from memory
    ///
    /// The bytes are decoded unaligned, so `address` does not need to honour
    /// `T`'s alignment.
    fn read<T: bytemuck::Pod>(&self, address: usize) -> Result<T, PlatformError>
    where
        Self: Sized,
    {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(address, size)?;

        if bytes.len() != size {
            return Err(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: format!("Expected {} bytes, got {}", size, bytes.len()),
            });
        }

        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Write a POD type to memory
    fn write<T: bytemuck::Pod>(&self, address: usize, value: &T) -> Result<(), PlatformError>
    where
        Self: Sized,
    {
        self.write_bytes(address, bytemuck::bytes_of(value))
    }
}

/// Extended platform operations
pub trait Platform: MemoryReader {
    /// Get all loaded modules in the target process
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError>;

    /// Get a specific module by name
    fn get_module(&self, name: &str) -> Result<ModuleInfo, PlatformError> {
        self.get_modules()?
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PlatformError::ModuleNotFound(name.to_string()))
    }

    /// Committed memory regions of the target, freshly queried
    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError>;
}

/// Find the id of a running process by executable name
///
/// Matching is case-insensitive. When several processes share the name the
/// one with the largest resident set wins, which picks the game over its
/// launcher or crash reporter.
pub fn find_process(name: &str) -> Result<u32, PlatformError> {
    let mut system = sysinfo::System::new_all();
    system.refresh_all();

    let mut candidates: Vec<(u32, u64)> = system
        .processes()
        .values()
        .filter(|p| p.name().to_string_lossy().eq_ignore_ascii_case(name))
        .map(|p| (p.pid().as_u32(), p.memory()))
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    match candidates.first() {
        Some(&(pid, memory)) => {
            tracing::info!(pid, memory_mb = memory / 1_000_000, "Found process {}", name);
            Ok(pid)
        }
        None => Err(PlatformError::ProcessNotFound(name.to_string())),
    }
}

/// Default platform implementation for the current OS
#[cfg(windows)]
pub type DefaultPlatform = WindowsPlatform;

/// Default platform implementation for the current OS
#[cfg(target_os = "linux")]
pub type DefaultPlatform = LinuxPlatform;

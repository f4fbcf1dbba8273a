//! Mock platform for testing
//!
//! This module provides a mock implementation of the platform traits
//! that can be used for testing without requiring real memory access.
//! Every read is recorded so tests can assert on the exact access pattern.

use super::{MemoryReader, MemoryRegion, ModuleInfo, Platform, PlatformError};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mock memory storage
#[derive(Default, Clone)]
struct MockMemory {
    /// Mapped blocks keyed by base address
    blocks: BTreeMap<usize, Vec<u8>>,
}

impl MockMemory {
    /// Find the block containing `address`, returning its base
    fn containing(&self, address: usize) -> Option<usize> {
        let (&base, data) = self.blocks.range(..=address).next_back()?;
        (address < base + data.len()).then_some(base)
    }

    fn map(&mut self, address: usize, data: &[u8]) {
        self.blocks.insert(address, data.to_vec());
    }

    fn read(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let base = self.containing(address)?;
        let data = &self.blocks[&base];
        let offset = address - base;

        (data.len() - offset >= size).then(|| data[offset..offset + size].to_vec())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> bool {
        let Some(base) = self.containing(address) else {
            return false;
        };

        let data = self.blocks.get_mut(&base).expect("block exists");
        let offset = address - base;

        if data.len() - offset < bytes.len() {
            return false;
        }

        data[offset..offset + bytes.len()].copy_from_slice(bytes);
        true
    }
}

/// Mock platform implementation for testing
#[derive(Clone, Default)]
pub struct MockPlatform {
    memory: Arc<RwLock<MockMemory>>,
    modules: Arc<RwLock<Vec<ModuleInfo>>>,
    reads: Arc<RwLock<Vec<(usize, usize)>>>,
}

impl MockPlatform {
    /// Create a new mock platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a block of memory at `address`
    pub fn write_memory(&self, address: usize, data: &[u8]) {
        self.memory.write().map(address, data);
    }

    /// Map a POD value at `address`
    pub fn write_value<T: bytemuck::Pod>(&self, address: usize, value: &T) {
        self.write_memory(address, bytemuck::bytes_of(value));
    }

    /// Map a contiguous slice of POD values starting at `address`
    pub fn write_slice<T: bytemuck::Pod>(&self, address: usize, values: &[T]) {
        self.write_memory(address, bytemuck::cast_slice(values));
    }

    /// Add a mock module
    pub fn add_module(&self, name: &str, base_address: usize, size: usize) {
        self.modules.write().push(ModuleInfo {
            base_address,
            size,
            name: name.to_string(),
            path: format!("C:\\Game\\{}", name),
        });
    }

    /// Every `(address, size)` read issued so far, in order
    pub fn read_log(&self) -> Vec<(usize, usize)> {
        self.reads.read().clone()
    }

    /// Forget previously recorded reads
    pub fn clear_read_log(&self) {
        self.reads.write().clear();
    }
}

impl MemoryReader for MockPlatform {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError> {
        self.reads.write().push((address, size));

        self.memory
            .read()
            .read(address, size)
            .ok_or(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: "Address not mapped in mock memory".to_string(),
            })
    }

    fn write_bytes(&self, address: usize, data: &[u8]) -> Result<(), PlatformError> {
        if self.memory.write().write(address, data) {
            Ok(())
        } else {
            Err(PlatformError::MemoryWriteFailed {
                address,
                size: data.len(),
                reason: "Address not mapped in mock memory".to_string(),
            })
        }
    }
}

impl Platform for MockPlatform {
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError> {
        Ok(self.modules.read().clone())
    }

    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        let regions = self
            .memory
            .read()
            .blocks
            .iter()
            .map(|(&start, data)| MemoryRegion {
                start,
                end: start + data.len(),
                readable: true,
                writable: true,
                executable: false,
            })
            .collect();

        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_platform() {
        let platform = MockPlatform::new();

        let test_data = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        platform.write_memory(0x1000, &test_data);

        let result = platform.read_bytes(0x1000, 5).unwrap();
        assert_eq!(result, test_data);

        let result = platform.read_bytes(0x1002, 2).unwrap();
        assert_eq!(result, vec![0x03, 0x04]);

        assert!(platform.read_bytes(0x1003, 4).is_err());
    }

    #[test]
    fn test_mock_platform_write_value() {
        let platform = MockPlatform::new();

        let test_value: u64 = 0x1234567890ABCDEF;
        platform.write_value(0x2000, &test_value);

        let result: u64 = platform.read(0x2000).unwrap();
        assert_eq!(result, test_value);
    }

    #[test]
    fn test_mock_write_bytes_in_place() {
        let platform = MockPlatform::new();
        platform.write_memory(0x3000, &[0u8; 16]);

        platform.write(0x3004, &0xAABBCCDDu32).unwrap();
        let result: u32 = platform.read(0x3004).unwrap();
        assert_eq!(result, 0xAABBCCDD);

        assert!(platform.write(0x9000, &1u32).is_err());
        assert!(platform.write(0x300E, &1u32).is_err());
    }

    #[test]
    fn test_read_log() {
        let platform = MockPlatform::new();
        platform.write_value(0x1000, &7u32);

        let _: u32 = platform.read(0x1000).unwrap();
        let _ = platform.read_bytes(0x5000, 2);

        assert_eq!(platform.read_log(), vec![(0x1000, 4), (0x5000, 2)]);

        platform.clear_read_log();
        assert!(platform.read_log().is_empty());
    }

    #[test]
    fn test_memory_regions() {
        let platform = MockPlatform::new();
        platform.write_memory(0x1000, &[0x01, 0x02, 0x03]);
        platform.write_memory(0x4000, &[0u8; 0x10]);

        let regions = platform.get_memory_regions().unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions[0].contains(0x1002));
        assert!(!regions[0].contains(0x1003));
        assert_eq!(regions[1].size(), 0x10);
    }

    #[test]
    fn test_get_module() {
        let platform = MockPlatform::new();
        platform.add_module("Game-Win64-Shipping.exe", 0x140000000, 0x8000000);

        let module = platform.get_module("game-win64-shipping.exe").unwrap();
        assert_eq!(module.base_address, 0x140000000);
        assert!(platform.get_module("missing.dll").is_err());
    }
}

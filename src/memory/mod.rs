//! Fail-soft remote memory access
//!
//! [`Session`] is the context every core operation receives: the process
//! handle, the main module base and the offset table for the target build.
//! It never changes after construction.
//!
//! Reads through a session never fail. Objects are freed and pages unmapped
//! between frames all the time, so a failed read yields the all-zero value
//! of the requested type and callers treat zero as "absent".

mod array;

pub use array::RemoteArrayView;

use crate::config::OffsetTable;
use crate::engine::RawArray;
use crate::platform::{Platform, PlatformError};
use bytemuck::Pod;

/// Session context for one attached target process
pub struct Session<P> {
    platform: P,
    module_base: usize,
    offsets: OffsetTable,
}

impl<P: Platform> Session<P> {
    /// Session over an attached platform with a known module base
    pub fn new(platform: P, module_base: usize, offsets: OffsetTable) -> Self {
        Self {
            platform,
            module_base,
            offsets,
        }
    }

    /// Build a session over an already attached platform, resolving the
    /// base of `module_name`
    ///
    /// A missing module is not fatal: the base is 0 and every module-relative
    /// read will come back empty.
    pub fn with_module(platform: P, module_name: &str, offsets: OffsetTable) -> Self {
        let module_base = match platform.get_module(module_name) {
            Ok(module) => {
                tracing::info!("Resolved {} at {:#x}", module.name, module.base_address);
                module.base_address
            }
            Err(e) => {
                tracing::warn!("{}", e);
                0
            }
        };

        Self::new(platform, module_base, offsets)
    }

    /// The backend reads go through
    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Base address of the target's main module, 0 if it was not found
    #[inline]
    pub fn module_base(&self) -> usize {
        self.module_base
    }

    /// Offsets for the target build
    #[inline]
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Read a `T` at `address`, or `T::zeroed()` if the read fails
    pub fn read<T: Pod>(&self, address: usize) -> T {
        self.try_read(address).unwrap_or_else(T::zeroed)
    }

    /// Read a `T` at `address`, or `None` if the read fails
    ///
    /// Null addresses short-circuit without touching the target.
    pub fn try_read<T: Pod>(&self, address: usize) -> Option<T> {
        if address == 0 {
            return None;
        }

        match self.platform.read::<T>(address) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::trace!("{}", e);
                None
            }
        }
    }

    /// Read a 64-bit pointer
    #[inline]
    pub fn read_ptr(&self, address: usize) -> usize {
        self.read::<u64>(address) as usize
    }

    /// Write `value` at `address`
    ///
    /// Returns whether the write landed. Failures are logged, never raised.
    pub fn write<T: Pod>(&self, address: usize, value: T) -> bool {
        let result = if address == 0 {
            Err(PlatformError::InvalidAddress(address))
        } else {
            self.platform.write(address, &value)
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        }
    }

    /// Read the array header at `address` and open a view over it
    pub fn open_remote_array<T: Pod>(&self, address: usize) -> RemoteArrayView<T> {
        let header: RawArray = self.read(address);
        RemoteArrayView::from_raw(header.data as usize, header.count, header.capacity)
    }
}

#[cfg(any(windows, target_os = "linux"))]
impl Session<crate::platform::DefaultPlatform> {
    /// Locate `process_name`, open it and resolve `module_name`
    ///
    /// This is the only fatal path: a missing process or a denied handle
    /// ends the session before it starts.
    pub fn attach(
        process_name: &str,
        module_name: &str,
        offsets: OffsetTable,
    ) -> crate::Result<Self> {
        let pid = crate::platform::find_process(process_name)?;
        let platform = crate::platform::DefaultPlatform::attach(pid)?;

        Ok(Self::with_module(platform, module_name, offsets))
    }
}

/// Address of the field `offset` bytes into the object at `base`
///
/// Object pointers come straight out of the target and may be garbage. A
/// null base or a sum past the top of the address space yields 0, which
/// every read treats as absent.
#[inline]
pub fn field_address(base: usize, offset: usize) -> usize {
    if base == 0 {
        return 0;
    }

    base.checked_add(offset).unwrap_or(0)
}

/// True when every byte of `value` is zero, the fail-soft "absent" marker
pub fn is_zeroed<T: Pod>(value: &T) -> bool {
    bytemuck::bytes_of(value).iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Transform;
    use crate::math::Vector3;
    use crate::platform::mock::MockPlatform;

    fn session() -> (MockPlatform, Session<MockPlatform>) {
        let platform = MockPlatform::new();
        let session = Session::new(platform.clone(), 0x140000000, OffsetTable::default());
        (platform, session)
    }

    #[test]
    fn test_read_inaccessible_returns_zero() {
        let (_, session) = session();

        let value: u64 = session.read(0xDEAD0000);
        assert_eq!(value, 0);

        let transform: Transform = session.read(0xDEAD0000);
        assert!(is_zeroed(&transform));
        assert!(session.try_read::<u32>(0xDEAD0000).is_none());
    }

    #[test]
    fn test_read_mapped_value() {
        let (platform, session) = session();
        let transform = Transform::from_translation(Vector3::new(1.0, 2.0, 3.0));
        platform.write_value(0x5000, &transform);

        assert_eq!(session.read::<Transform>(0x5000), transform);
        assert_eq!(session.try_read::<Transform>(0x5000), Some(transform));
    }

    #[test]
    fn test_null_address_skips_read() {
        let (platform, session) = session();

        assert_eq!(session.read::<u64>(0), 0);
        assert!(platform.read_log().is_empty());
    }

    #[test]
    fn test_read_ptr() {
        let (platform, session) = session();
        platform.write_value(0x6000, &0x7FF612340000u64);

        assert_eq!(session.read_ptr(0x6000), 0x7FF612340000);
    }

    #[test]
    fn test_write_reports_failure() {
        let (platform, session) = session();
        platform.write_memory(0x7000, &[0u8; 8]);

        assert!(session.write(0x7000, 42u32));
        assert_eq!(session.read::<u32>(0x7000), 42);

        assert!(!session.write(0xBAD000, 42u32));
        assert!(!session.write(0, 42u32));
    }

    #[test]
    fn test_with_module_resolves_base() {
        let platform = MockPlatform::new();
        platform.add_module("Target-Win64-Shipping.exe", 0x7FF600000000, 0x1000);

        let found = Session::with_module(
            platform.clone(),
            "Target-Win64-Shipping.exe",
            OffsetTable::default(),
        );
        assert_eq!(found.module_base(), 0x7FF600000000);

        let missing = Session::with_module(platform, "Other.exe", OffsetTable::default());
        assert_eq!(missing.module_base(), 0);
    }

    #[test]
    fn test_field_address() {
        assert_eq!(field_address(0x10000, 0x1C0), 0x101C0);
        assert_eq!(field_address(0, 0x1C0), 0);
        assert_eq!(field_address(0xFFFF_FFFF_FFFF_FF00, 0x320), 0);
        assert_eq!(field_address(usize::MAX, 0), usize::MAX);
    }

    #[test]
    fn test_is_zeroed() {
        assert!(is_zeroed(&0u64));
        assert!(!is_zeroed(&Vector3::new(0.0, 0.0, 1.0)));
    }
}

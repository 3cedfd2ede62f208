// Device backings for the host traits: in-memory registers and resource files

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

use cspmu_raw::arch::coresight::{regs, Pmiidr};
use cspmu_raw::{FileWindow, RegisterLayout, RegisterWindow};

use super::CspmuDevice;
use crate::common::CpuMask;
use crate::error::Result;

/// PMU whose register page lives in memory
///
/// Reads of registers never written return zero, like a freshly reset page.
pub struct MemoryDevice {
    name: String,
    cpus: CpuMask,
    regs: Mutex<BTreeMap<u32, u32>>,
}

impl MemoryDevice {
    pub fn new(name: impl Into<String>, pmiidr: u32, cpus: CpuMask) -> Self {
        let mut page = BTreeMap::new();
        page.insert(regs::PMIIDR, pmiidr);

        Self {
            name: name.into(),
            cpus,
            regs: Mutex::new(page),
        }
    }

    /// Device reporting NVIDIA as implementer with the given product id
    pub fn nvidia(name: impl Into<String>, product_id: u32, cpus: CpuMask) -> Self {
        let pmiidr = Pmiidr {
            implementer: cspmu_raw::vendor::IMPLEMENTER_ID as u16,
            product_id: product_id as u16,
            ..Default::default()
        };
        Self::new(name, pmiidr.to_reg_value(), cpus)
    }

    /// Current value of a register
    pub fn register(&self, offset: u32) -> u32 {
        self.regs.lock().get(&offset).copied().unwrap_or(0)
    }
}

impl RegisterWindow for MemoryDevice {
    fn read32(&self, offset: u32) -> cspmu_raw::Result<u32> {
        Ok(self.register(offset))
    }

    fn write32(&self, offset: u32, value: u32) -> cspmu_raw::Result<()> {
        if offset % 4 != 0 {
            return Err(cspmu_raw::MmioError::Unaligned { offset });
        }
        self.regs.lock().insert(offset, value);
        Ok(())
    }
}

impl CspmuDevice for MemoryDevice {
    fn dev_name(&self) -> &str {
        &self.name
    }

    fn pmiidr(&self) -> Result<u32> {
        Ok(self.register(regs::PMIIDR))
    }

    fn associated_cpus(&self) -> &CpuMask {
        &self.cpus
    }

    fn write32(&self, offset: u32, value: u32) -> Result<()> {
        RegisterWindow::write32(self, offset, value)?;
        Ok(())
    }
}

/// PMU reached through a resource file of a real (or captured) device
pub struct PlatformDevice {
    name: String,
    window: FileWindow,
    cpus: CpuMask,
}

impl PlatformDevice {
    pub fn new(name: impl Into<String>, resource: impl Into<PathBuf>, cpus: CpuMask) -> Self {
        Self {
            name: name.into(),
            window: FileWindow::new(resource),
            cpus,
        }
    }

    pub fn window(&self) -> &FileWindow {
        &self.window
    }
}

impl CspmuDevice for PlatformDevice {
    fn dev_name(&self) -> &str {
        &self.name
    }

    fn pmiidr(&self) -> Result<u32> {
        Ok(self.window.read32(regs::PMIIDR)?)
    }

    fn associated_cpus(&self) -> &CpuMask {
        &self.cpus
    }

    fn write32(&self, offset: u32, value: u32) -> Result<()> {
        tracing::trace!(
            "{}: write 0x{:08x} to register 0x{:03x}",
            self.name,
            value,
            offset
        );
        Ok(self.window.write32(offset, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_device_identity() {
        let dev = MemoryDevice::nvidia("pcie0", 0x103, CpuMask::parse("0-3").unwrap());
        let pmiidr = Pmiidr::from_reg_value(dev.pmiidr().unwrap());

        assert_eq!(pmiidr.implementer, 0x36B);
        assert_eq!(pmiidr.product_id, 0x103);
        assert_eq!(dev.associated_cpus().first(), Some(0));
    }

    #[test]
    fn test_memory_device_registers() {
        let dev = MemoryDevice::new("raw", 0, CpuMask::new());
        assert_eq!(dev.register(0xA00), 0);

        CspmuDevice::write32(&dev, 0xA04, 0x3).unwrap();
        assert_eq!(dev.register(0xA04), 0x3);
        assert!(CspmuDevice::write32(&dev, 0xA05, 0x3).is_err());
    }

    #[test]
    fn test_platform_device_reads_pmiidr() {
        let mut resource = tempfile::NamedTempFile::new().unwrap();
        let mut page = vec![0u8; 0x1000];
        let pmiidr: u32 = (0x2CF << 20) | 0x36B;
        page[regs::PMIIDR as usize..regs::PMIIDR as usize + 4].copy_from_slice(&pmiidr.to_le_bytes());
        resource.write_all(&page).unwrap();
        resource.flush().unwrap();

        let dev = PlatformDevice::new("scf0", resource.path(), CpuMask::parse("0").unwrap());
        assert_eq!(dev.pmiidr().unwrap(), pmiidr);

        dev.write32(regs::PMCCFILTR, 0x1).unwrap();
        assert_eq!(dev.window().read32(regs::PMCCFILTR).unwrap(), 0x1);
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use hauth_core::DeviceInfoProvider;

const DMI_VENDOR: &str = "sys/class/dmi/id/sys_vendor";
const DMI_PRODUCT: &str = "sys/class/dmi/id/product_name";
const DMI_SERIAL: &str = "sys/class/dmi/id/product_serial";
const DT_MODEL: &str = "sys/firmware/devicetree/base/model";
const DT_SERIAL: &str = "sys/firmware/devicetree/base/serial-number";
const DT_COMPATIBLE: &str = "sys/firmware/devicetree/base/compatible";
const MACHINE_ID: &str = "etc/machine-id";

/// Device-tree vendor prefixes and the names DMI would report for them
const DT_VENDORS: &[(&str, &str)] = &[
    ("fsl", "Freescale"),
    ("nxp", "NXP"),
    ("ti", "Texas Instruments"),
    ("brcm", "Broadcom"),
    ("rockchip", "Rockchip"),
    ("allwinner", "Allwinner"),
    ("qcom", "Qualcomm"),
    ("raspberrypi", "Raspberry Pi"),
];

/// [`DeviceInfoProvider`] over DMI, the device tree and `machine-id`
#[derive(Debug, Clone)]
pub struct SysfsDeviceInfo {
    root: PathBuf,
}

impl SysfsDeviceInfo {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn read_first(&self, candidates: &[&str]) -> Option<String> {
        candidates.iter().find_map(|relative| read_attribute(&self.root.join(relative)))
    }

    /// Vendor named by the first `compatible` entry (`fsl,imx6q` -> `Freescale`).
    fn device_tree_vendor(&self) -> Option<String> {
        let compatible = self.read_first(&[DT_COMPATIBLE])?;
        let first = compatible.split('\0').next()?;
        let (prefix, _) = first.split_once(',')?;
        let vendor = DT_VENDORS
            .iter()
            .find(|(known, _)| *known == prefix)
            .map_or(prefix, |(_, name)| *name);
        (!vendor.is_empty()).then(|| vendor.to_string())
    }
}

/// Read a sysfs attribute, dropping trailing NULs and whitespace.
fn read_attribute(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let value = text.trim_end_matches('\0').trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        Err(err) => {
            tracing::trace!(path = %path.display(), error = %err, "platform.attribute_unreadable");
            None
        }
    }
}

impl DeviceInfoProvider for SysfsDeviceInfo {
    fn manufacturer(&self) -> Option<String> {
        self.read_first(&[DMI_VENDOR]).or_else(|| self.device_tree_vendor())
    }

    fn model(&self) -> Option<String> {
        self.read_first(&[DMI_PRODUCT, DT_MODEL])
    }

    fn os_serial(&self) -> Option<String> {
        self.read_first(&[DMI_SERIAL, DT_SERIAL])
    }

    fn secure_id(&self) -> Option<String> {
        self.read_first(&[MACHINE_ID])
    }
}

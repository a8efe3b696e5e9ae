//! Device classification
//!
//! Maps a viewport width in CSS pixels onto one of three device types and
//! the dashboard variant each one mounts.

use serde::{Deserialize, Serialize};

/// Widths below this are mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Widths at or above this are desktop.
pub const DESKTOP_BREAKPOINT: u32 = 1024;

/// Runtime device classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Narrow viewport (phones)
    Mobile,
    /// Mid-size viewport (tablets, small windows)
    Tablet,
    /// Wide viewport
    Desktop,
}

impl DeviceType {
    /// Classify a viewport width.
    ///
    /// ```
    /// use workforce_device::DeviceType;
    ///
    /// assert_eq!(DeviceType::classify(767), DeviceType::Mobile);
    /// assert_eq!(DeviceType::classify(768), DeviceType::Tablet);
    /// assert_eq!(DeviceType::classify(1024), DeviceType::Desktop);
    /// ```
    pub const fn classify(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            DeviceType::Mobile
        } else if width < DESKTOP_BREAKPOINT {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }

    /// Get string representation of the device type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
        }
    }

    /// Narrower than [`MOBILE_BREAKPOINT`].
    pub fn is_mobile(&self) -> bool {
        matches!(self, DeviceType::Mobile)
    }

    /// Between the two breakpoints.
    pub fn is_tablet(&self) -> bool {
        matches!(self, DeviceType::Tablet)
    }

    /// Anything but desktop; layouts that collapse the sidebar use this.
    pub fn is_mobile_or_tablet(&self) -> bool {
        !self.is_desktop()
    }

    /// At least [`DESKTOP_BREAKPOINT`] wide.
    pub fn is_desktop(&self) -> bool {
        matches!(self, DeviceType::Desktop)
    }

    /// Dashboard variant mounted for this device type.
    pub fn dashboard(&self) -> DashboardVariant {
        match self {
            DeviceType::Mobile => DashboardVariant::Mobile,
            DeviceType::Tablet => DashboardVariant::Tablet,
            DeviceType::Desktop => DashboardVariant::Desktop,
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard layout chosen by the device type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DashboardVariant {
    /// Single column with a bottom navigation bar
    Mobile,
    /// Two columns with a collapsible sidebar
    Tablet,
    /// Full sidebar with widget grid
    Desktop,
}

impl DashboardVariant {
    /// Route key of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardVariant::Mobile => "mobile_dashboard",
            DashboardVariant::Tablet => "tablet_dashboard",
            DashboardVariant::Desktop => "desktop_dashboard",
        }
    }
}

impl std::fmt::Display for DashboardVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

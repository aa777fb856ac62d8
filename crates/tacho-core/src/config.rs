use serde::{Deserialize, Serialize};

/// Number of RPM samples held by the rolling window.
pub const RPM_WINDOW_SLOTS: usize = 5;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub wheel: WheelConfig,
    pub log: LogConfig<'a>,
}

/// Wheel geometry used to turn shaft RPM into linear speed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WheelConfig {
    /// Rolling circumference of the tyre, in metres.
    pub circumference_m: f32,
    /// Magnet revolutions per wheel revolution (gearing between the
    /// sensor shaft and the axle).
    pub gear_scale: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            circumference_m: 1.6,
            gear_scale: 1.0,
        }
    }
}

/// Naming and formatting of the log files on the storage volume.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct LogConfig<'a> {
    /// Directory under the mount root holding the log files.
    pub directory: &'a str,
    /// Base of the file name; full names are `<base>_<nnnn>.<ext>`.
    pub base_name: &'a str,
    /// Three-character file extension, without the dot.
    pub extension: &'a str,
    /// Field delimiter. The original logger wrote `" , "`; a plain comma
    /// keeps the files readable by ordinary CSV tooling.
    pub delimiter: &'a str,
    /// Optional header line written once when a session starts.
    pub header: Option<&'a str>,
}

impl Default for LogConfig<'_> {
    fn default() -> Self {
        Self {
            directory: "logs",
            base_name: "log",
            extension: "csv",
            delimiter: ",",
            header: None,
        }
    }
}

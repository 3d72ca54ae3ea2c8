use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::ReportError;

/// Placeholder for optional header fields that are absent.
const UNKNOWN: &str = "unknown";

/// The metadata line at the top of an IPS report.
///
/// Only the fields needed to render a legacy crash header are lifted out. Everything else in the
/// JSON object is kept in [`extra`](Self::extra).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrashHeader {
    /// The name of the crashed application.
    pub app_name: String,
    /// The bundle identifier, such as `com.example.app`.
    pub bundle_id: String,
    /// The build number (`CFBundleVersion`).
    pub build_version: String,
    /// The marketing version (`CFBundleShortVersionString`).
    pub app_version: String,
    /// Time of the crash, e.g. `2024-03-05 14:22:31.00 +0800`.
    pub timestamp: String,
    /// The full OS version string, e.g. `iPhone OS 17.2.1 (21C66)`.
    pub os_version: String,
    /// The UUID of the crashed binary slice.
    pub slice_uuid: String,
    /// The anonymized device key of the crash reporter.
    pub crashreporter_key: Option<String>,
    /// The device model identifier, e.g. `iPhone15,2`.
    pub hardware_model: Option<String>,
    /// The process id, which may be given as a number or a string.
    pub pid: Option<String>,
    /// Path of the executable on the device.
    pub path: Option<String>,
    /// The process role at the time of the crash.
    pub role: Option<String>,
    /// Time the process was launched.
    pub launch_time: Option<String>,
    /// All header fields not covered above.
    pub extra: BTreeMap<String, Value>,
}

impl CrashHeader {
    /// Parses the header from the first line of an IPS report.
    pub fn from_line(line: &str) -> Result<Self, ReportError> {
        let mut fields: Map<String, Value> =
            serde_json::from_str(line.trim()).map_err(ReportError::InvalidHeader)?;

        Ok(CrashHeader {
            app_name: required(&mut fields, "app_name")?,
            bundle_id: required(&mut fields, "bundleID")?,
            build_version: required(&mut fields, "build_version")?,
            app_version: required(&mut fields, "app_version")?,
            timestamp: required(&mut fields, "timestamp")?,
            os_version: required(&mut fields, "os_version")?,
            slice_uuid: required(&mut fields, "slice_uuid")?,
            crashreporter_key: optional(&mut fields, "crashreporter_key")?,
            hardware_model: optional(&mut fields, "hardware_model")?,
            pid: optional(&mut fields, "pid")?,
            path: optional(&mut fields, "path")?,
            role: optional(&mut fields, "role")?,
            launch_time: optional(&mut fields, "launch_time")?,
            extra: fields.into_iter().collect(),
        })
    }

    /// Parses the crash time from the `timestamp` field.
    ///
    /// Only the date and time of day are considered, a trailing UTC offset is ignored.
    pub fn parsed_timestamp(&self) -> Result<NaiveDateTime, ReportError> {
        let invalid = || ReportError::InvalidTimestamp(self.timestamp.clone());

        let mut parts = self.timestamp.split_whitespace();
        let (Some(date), Some(time)) = (parts.next(), parts.next()) else {
            return Err(invalid());
        };

        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|_| invalid())
    }

    /// The file name used for a converted report when none is given explicitly.
    ///
    /// This looks like `MyApp_2024-03-05_14-22-31.crash`.
    pub fn default_crash_file_name(&self) -> Result<String, ReportError> {
        let timestamp = self.parsed_timestamp()?;
        Ok(format!(
            "{}_{}.crash",
            self.app_name,
            timestamp.format("%Y-%m-%d_%H-%M-%S")
        ))
    }

    /// The crash reporter key, or `unknown`.
    pub fn crashreporter_key(&self) -> &str {
        self.crashreporter_key.as_deref().unwrap_or(UNKNOWN)
    }

    /// The hardware model, or `unknown`.
    pub fn hardware_model(&self) -> &str {
        self.hardware_model.as_deref().unwrap_or(UNKNOWN)
    }

    /// The process id, or `0`.
    pub fn pid(&self) -> &str {
        self.pid.as_deref().unwrap_or("0")
    }

    /// The executable path, or `unknown`.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(UNKNOWN)
    }

    /// The process role, `Foreground` unless stated otherwise.
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or("Foreground")
    }

    /// The launch time, or `unknown`.
    pub fn launch_time(&self) -> &str {
        self.launch_time.as_deref().unwrap_or(UNKNOWN)
    }
}

fn required(fields: &mut Map<String, Value>, key: &'static str) -> Result<String, ReportError> {
    optional(fields, key)?.ok_or(ReportError::MissingField(key))
}

/// Takes a scalar field out of the header, rendering numbers and booleans as text.
///
/// `null` is treated like an absent field.
pub(crate) fn optional(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ReportError> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(Value::Bool(value)) => Ok(Some(value.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(ReportError::InvalidField(key)),
    }
}

//! JNI interface versions

use std::fmt;
use std::str::FromStr;

use jni_sys::jint;
use serde::{Deserialize, Serialize};

/// JNI version requested in `JavaVMInitArgs.version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JniVersion {
    V1_1,
    V1_2,
    V1_4,
    V1_6,
    #[default]
    V1_8,
    V9,
    V10,
    V19,
    V20,
    V21,
}

impl JniVersion {
    /// All known versions, oldest first
    pub const ALL: [JniVersion; 10] = [
        JniVersion::V1_1,
        JniVersion::V1_2,
        JniVersion::V1_4,
        JniVersion::V1_6,
        JniVersion::V1_8,
        JniVersion::V9,
        JniVersion::V10,
        JniVersion::V19,
        JniVersion::V20,
        JniVersion::V21,
    ];

    /// Raw value as defined in `jni.h`
    pub fn raw(self) -> jint {
        match self {
            JniVersion::V1_1 => 0x0001_0001,
            JniVersion::V1_2 => 0x0001_0002,
            JniVersion::V1_4 => 0x0001_0004,
            JniVersion::V1_6 => 0x0001_0006,
            JniVersion::V1_8 => 0x0001_0008,
            JniVersion::V9 => 0x0009_0000,
            JniVersion::V10 => 0x000a_0000,
            JniVersion::V19 => 0x0013_0000,
            JniVersion::V20 => 0x0014_0000,
            JniVersion::V21 => 0x0015_0000,
        }
    }

    /// Inverse of [`JniVersion::raw`]
    pub fn from_raw(raw: jint) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.raw() == raw)
    }

    fn name(self) -> &'static str {
        match self {
            JniVersion::V1_1 => "1.1",
            JniVersion::V1_2 => "1.2",
            JniVersion::V1_4 => "1.4",
            JniVersion::V1_6 => "1.6",
            JniVersion::V1_8 => "1.8",
            JniVersion::V9 => "9",
            JniVersion::V10 => "10",
            JniVersion::V19 => "19",
            JniVersion::V20 => "20",
            JniVersion::V21 => "21",
        }
    }
}

impl fmt::Display for JniVersion {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JniVersion {
    type Err = String;

    /// Accepts `1.8` and `8` alike for the pre-9 releases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let normalized = match s {
            "1" => "1.1",
            "2" => "1.2",
            "4" => "1.4",
            "6" => "1.6",
            "8" => "1.8",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|v| v.name() == normalized)
            .ok_or_else(|| format!("unsupported JNI version: {}", s))
    }
}

impl TryFrom<String> for JniVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JniVersion> for String {
    fn from(version: JniVersion) -> Self {
        version.to_string()
    }
}

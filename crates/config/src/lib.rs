use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Packed operand pairs exercised when a configuration does not list its own.
/// High halfword is operand `a`, low halfword is operand `b`.
pub const DEFAULT_TEST_VECTORS: [u32; 11] = [
    0x0002_0003,
    0xFFFC_0003, // -,+
    0x0000_0000, // 0,0
    0x0000_0005, // 0,+
    0x0000_FFFC, // 0,-
    0xFFFD_0000, // -,0
    0x0002_0000, // +,0
    0x8000_8000, // -,-
    0xFFF3_FFE0, // -,-
    0x7FF3_8001, // +,-
    0x7FF1_7FF2, // +,+
];

pub const DEFAULT_MAX_PRINT_LEN: usize = 1000;
pub const MIN_MAX_PRINT_LEN: usize = 64;

fn enabled() -> bool {
    true
}

fn default_vectors() -> Vec<u32> {
    DEFAULT_TEST_VECTORS.to_vec()
}

fn default_test_period_ms() -> u64 {
    10
}

fn default_idle_period_ms() -> u64 {
    4096
}

fn default_idle_cycles() -> u64 {
    1
}

fn default_max_print_len() -> usize {
    DEFAULT_MAX_PRINT_LEN
}

fn default_student_name() -> String {
    "Student".to_string()
}

/// Which routine groups get exercised. Disabling one is meant for debugging
/// a single routine; the final report then flags the run as partial.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategoryFlags {
    #[serde(default = "enabled")]
    pub run_unpack: bool,
    #[serde(default = "enabled")]
    pub run_abs: bool,
    #[serde(default = "enabled")]
    pub run_multiply: bool,
    #[serde(default = "enabled")]
    pub run_fix_sign: bool,
    #[serde(default = "enabled")]
    pub run_composite: bool,
}

impl Default for CategoryFlags {
    fn default() -> Self {
        Self {
            run_unpack: true,
            run_abs: true,
            run_multiply: true,
            run_fix_sign: true,
            run_composite: true,
        }
    }
}

impl CategoryFlags {
    pub fn all_enabled(&self) -> bool {
        self.run_unpack && self.run_abs && self.run_multiply && self.run_fix_sign && self.run_composite
    }

    pub fn none_enabled(&self) -> bool {
        !(self.run_unpack || self.run_abs || self.run_multiply || self.run_fix_sign || self.run_composite)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Timing {
    /// Pacing between test vectors.
    #[serde(default = "default_test_period_ms")]
    pub test_period_ms: u64,
    /// Blink period once the post-test idle loop has started.
    #[serde(default = "default_idle_period_ms")]
    pub idle_period_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            test_period_ms: default_test_period_ms(),
            idle_period_ms: default_idle_period_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LabConfig {
    pub schema_version: String,
    #[serde(default = "default_student_name")]
    pub student_name: String,
    #[serde(default = "default_vectors")]
    pub test_vectors: Vec<u32>,
    #[serde(default)]
    pub categories: CategoryFlags,
    #[serde(default = "enabled")]
    pub only_print_fails: bool,
    #[serde(default)]
    pub timing: Timing,
    /// Number of post-test idle reports before the run ends. 0 repeats forever.
    #[serde(default = "default_idle_cycles")]
    pub idle_cycles: u64,
    #[serde(default = "default_max_print_len")]
    pub max_print_len: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            student_name: default_student_name(),
            test_vectors: default_vectors(),
            categories: CategoryFlags::default(),
            only_print_fails: true,
            timing: Timing::default(),
            idle_cycles: default_idle_cycles(),
            max_print_len: DEFAULT_MAX_PRINT_LEN,
        }
    }
}

impl LabConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open lab config at {:?}", path.as_ref()))?;
        let config: Self =
            serde_yaml::from_reader(f).context("Failed to parse Lab Config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse Lab Config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.test_vectors.is_empty() {
            anyhow::bail!("'test_vectors' must list at least one packed value");
        }

        if self.max_print_len < MIN_MAX_PRINT_LEN {
            anyhow::bail!(
                "'max_print_len' must be at least {} bytes, got {}",
                MIN_MAX_PRINT_LEN,
                self.max_print_len
            );
        }

        Ok(())
    }
}

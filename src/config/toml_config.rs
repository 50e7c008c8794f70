use crate::core::{Format, SchemaPolicy};
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{validate_delimiter, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conversion defaults loaded from a TOML file.
///
/// ```toml
/// [input]
/// format = "csv"
///
/// [csv]
/// delimiter = ";"
/// schema = "union"
///
/// [output]
/// path = "${OUT_DIR}/people.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub input: Option<InputSection>,
    pub csv: Option<CsvSection>,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
    pub format: Option<Format>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvSection {
    pub delimiter: Option<String>,
    pub schema: Option<SchemaPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub path: Option<String>,
}

impl ProfileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConvertError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ConvertError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUT_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn format(&self) -> Option<Format> {
        self.input.as_ref().and_then(|input| input.format)
    }

    pub fn delimiter(&self) -> Option<&str> {
        self.csv.as_ref().and_then(|csv| csv.delimiter.as_deref())
    }

    pub fn schema(&self) -> Option<SchemaPolicy> {
        self.csv.as_ref().and_then(|csv| csv.schema)
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.path.as_deref())
    }
}

impl Validate for ProfileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(delimiter) = self.delimiter() {
            validate_delimiter("csv.delimiter", delimiter)?;
        }
        if let Some(path) = self.output_path() {
            validate_path("output.path", path)?;
        }
        Ok(())
    }
}

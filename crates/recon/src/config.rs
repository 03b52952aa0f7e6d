use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column contract for one reconciliation run. Defaults match the
/// production Matera/Dock exports; a TOML file can override any field
/// when either side changes its export layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub matera: MateraConfig,
    #[serde(default)]
    pub dock: DockConfig,
    #[serde(default)]
    pub depara: DeparaConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            matera: MateraConfig::default(),
            dock: DockConfig::default(),
            depara: DeparaConfig::default(),
        }
    }
}

fn default_name() -> String {
    "matera-dock".into()
}

// ---------------------------------------------------------------------------
// Matera (settlement CSV)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MateraConfig {
    /// Raw identity column; values are normalized into the identity key.
    #[serde(default = "matera_identity")]
    pub identity_column: String,
    #[serde(default = "matera_amount")]
    pub amount_column: String,
    /// Transaction-type (history) code column.
    #[serde(default = "matera_kind")]
    pub kind_column: String,
    /// Codes whose amounts are sign-flipped (reversals).
    #[serde(default = "matera_reversals")]
    pub reversal_codes: Vec<String>,
}

impl Default for MateraConfig {
    fn default() -> Self {
        Self {
            identity_column: matera_identity(),
            amount_column: matera_amount(),
            kind_column: matera_kind(),
            reversal_codes: matera_reversals(),
        }
    }
}

fn matera_identity() -> String {
    "sCpf_Cnpj".into()
}
fn matera_amount() -> String {
    "nVlrLanc".into()
}
fn matera_kind() -> String {
    "nHistorico".into()
}
fn matera_reversals() -> Vec<String> {
    vec!["9001".into()]
}

// ---------------------------------------------------------------------------
// Dock (processor XLSX)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DockConfig {
    /// Zero-based column position scanned to find the real header row
    /// below the export's banner region.
    #[serde(default = "anchor_column")]
    pub anchor_column: usize,
    #[serde(default = "dock_account")]
    pub account_column: String,
    #[serde(default = "dock_amount")]
    pub amount_column: String,
    #[serde(default = "dock_kind")]
    pub kind_column: String,
    #[serde(default = "dock_reversals")]
    pub reversal_codes: Vec<String>,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            anchor_column: anchor_column(),
            account_column: dock_account(),
            amount_column: dock_amount(),
            kind_column: dock_kind(),
            reversal_codes: dock_reversals(),
        }
    }
}

fn anchor_column() -> usize {
    2
}
fn dock_account() -> String {
    "Id Conta".into()
}
fn dock_amount() -> String {
    "Valor".into()
}
fn dock_kind() -> String {
    "Id Tipo Transacao".into()
}
fn dock_reversals() -> Vec<String> {
    vec!["30224".into(), "30350".into()]
}

// ---------------------------------------------------------------------------
// Depara (cross-reference XLSX)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeparaConfig {
    #[serde(default = "anchor_column")]
    pub anchor_column: usize,
    #[serde(default = "dock_account")]
    pub account_column: String,
    #[serde(default = "depara_identity")]
    pub identity_column: String,
    #[serde(default = "depara_name")]
    pub name_column: String,
    #[serde(default = "depara_status")]
    pub status_column: String,
    #[serde(default = "depara_registered")]
    pub registered_column: String,
}

impl Default for DeparaConfig {
    fn default() -> Self {
        Self {
            anchor_column: anchor_column(),
            account_column: dock_account(),
            identity_column: depara_identity(),
            name_column: depara_name(),
            status_column: depara_status(),
            registered_column: depara_registered(),
        }
    }
}

fn depara_identity() -> String {
    "CPF".into()
}
fn depara_name() -> String {
    "Nome".into()
}
fn depara_status() -> String {
    "Status Conta".into()
}
fn depara_registered() -> String {
    "Data Cadastramento".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let columns = [
            ("matera.identity_column", &self.matera.identity_column),
            ("matera.amount_column", &self.matera.amount_column),
            ("matera.kind_column", &self.matera.kind_column),
            ("dock.account_column", &self.dock.account_column),
            ("dock.amount_column", &self.dock.amount_column),
            ("dock.kind_column", &self.dock.kind_column),
            ("depara.account_column", &self.depara.account_column),
            ("depara.identity_column", &self.depara.identity_column),
            ("depara.name_column", &self.depara.name_column),
            ("depara.status_column", &self.depara.status_column),
            ("depara.registered_column", &self.depara.registered_column),
        ];
        for (field, value) in columns {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{field} must not be blank"
                )));
            }
        }

        if self.matera.reversal_codes.is_empty() {
            return Err(ReconError::ConfigValidation(
                "matera.reversal_codes must not be empty".into(),
            ));
        }
        if self.dock.reversal_codes.is_empty() {
            return Err(ReconError::ConfigValidation(
                "dock.reversal_codes must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_contract() {
        let config = ReconConfig::default();
        assert_eq!(config.matera.identity_column, "sCpf_Cnpj");
        assert_eq!(config.matera.amount_column, "nVlrLanc");
        assert_eq!(config.matera.reversal_codes, vec!["9001"]);
        assert_eq!(config.dock.anchor_column, 2);
        assert_eq!(config.dock.reversal_codes, vec!["30224", "30350"]);
        assert_eq!(config.depara.registered_column, "Data Cadastramento");
        config.validate().unwrap();
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.name, "matera-dock");
        assert_eq!(config.dock.amount_column, "Valor");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ReconConfig::from_toml(
            r#"
name = "homolog"

[dock]
reversal_codes = ["30224"]
"#,
        )
        .unwrap();
        assert_eq!(config.name, "homolog");
        assert_eq!(config.dock.reversal_codes, vec!["30224"]);
        assert_eq!(config.dock.amount_column, "Valor");
        assert_eq!(config.matera.reversal_codes, vec!["9001"]);
    }

    #[test]
    fn reject_blank_column() {
        let err = ReconConfig::from_toml(
            r#"
[matera]
amount_column = ""
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("matera.amount_column"));
    }

    #[test]
    fn reject_empty_reversal_set() {
        let err = ReconConfig::from_toml(
            r#"
[dock]
reversal_codes = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dock.reversal_codes"));
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chain id, gas limit, fee ordering)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AuthorizerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AuthorizerConfig;
use crate::credential::signer::TRANSFER_GAS;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain.chain_id must be non-zero")]
    ZeroChainId,

    #[error("chain.gas_limit {0} is below the transfer minimum of 21000")]
    GasLimitTooLow(u64),

    #[error("chain.max_priority_fee_gwei {priority} exceeds chain.max_fee_per_gas_gwei {max_fee}")]
    PriorityFeeAboveCap { priority: u64, max_fee: u64 },

    #[error("keystore.passphrase_env must not be empty")]
    EmptyPassphraseEnv,

    #[error("logging.level '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &AuthorizerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.chain;

    if chain.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId);
    }

    if let Some(gas_limit) = chain.gas_limit {
        if gas_limit < TRANSFER_GAS {
            errors.push(ValidationError::GasLimitTooLow(gas_limit));
        }
    }

    if let (Some(priority), Some(max_fee)) = (chain.max_priority_fee_gwei, chain.max_fee_per_gas_gwei) {
        if priority > max_fee {
            errors.push(ValidationError::PriorityFeeAboveCap { priority, max_fee });
        }
    }

    if config.keystore.passphrase_env.trim().is_empty() {
        errors.push(ValidationError::EmptyPassphraseEnv);
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AuthorizerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AuthorizerConfig::default();
        config.chain.chain_id = 0;
        config.chain.gas_limit = Some(1_000);
        config.chain.max_fee_per_gas_gwei = Some(10);
        config.chain.max_priority_fee_gwei = Some(20);
        config.keystore.passphrase_env = " ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroChainId,
                ValidationError::GasLimitTooLow(1_000),
                ValidationError::PriorityFeeAboveCap {
                    priority: 20,
                    max_fee: 10
                },
                ValidationError::EmptyPassphraseEnv,
            ]
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AuthorizerConfig::default();
        config.logging.level = "eth_authorizer=notalevel".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidLogLevel(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::GasLimitTooLow(100);
        assert_eq!(
            err.to_string(),
            "chain.gas_limit 100 is below the transfer minimum of 21000"
        );
    }
}
